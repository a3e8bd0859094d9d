//! Buying, mortgaging, building and rent.
mod common;

use banker::ledger::{Endpoint, GameSettings, LedgerError};
use common::{cash, started_game, with_state};

#[test]
fn buying_boardwalk_pays_the_bank() {
    let (mut ledger, ids) = started_game(&["Alice", "Bob"], GameSettings::default());
    ledger
        .buy_property(&ids[0], "boardwalk", None, Endpoint::Bank)
        .expect("buy");

    assert_eq!(cash(&ledger, &ids[0]), 1100);
    let ps = ledger.property_state("boardwalk").expect("state");
    assert_eq!(ps.owner.as_ref(), Some(&ids[0]));
    assert!(!ps.mortgaged);
    assert_eq!(ps.level, 0);

    assert_eq!(ledger.transactions().len(), 2);
    let tx = &ledger.transactions()[0];
    assert_eq!(tx.amount, Some(400));
    assert_eq!(tx.from, Some(Endpoint::Player(ids[0].clone())));
    assert_eq!(tx.to, Some(Endpoint::Bank));
    assert_eq!(
        tx.description,
        "Alice bought Boardwalk for $400 (paid to The Bank)"
    );
}

#[test]
fn buying_from_another_player_pays_them() {
    let (mut ledger, ids) = started_game(&["Alice", "Bob"], GameSettings::default());
    ledger
        .buy_property(
            &ids[0],
            "park_place",
            Some(500),
            Endpoint::Player(ids[1].clone()),
        )
        .expect("buy");
    assert_eq!(cash(&ledger, &ids[0]), 1000);
    assert_eq!(cash(&ledger, &ids[1]), 2000);
}

#[test]
fn free_acquisition_moves_no_money() {
    let (mut ledger, ids) = started_game(&["Alice"], GameSettings::default());
    ledger
        .buy_property(&ids[0], "baltic", Some(0), Endpoint::Bank)
        .expect("buy");
    assert_eq!(cash(&ledger, &ids[0]), 1500);
    assert_eq!(
        ledger.property_state("baltic").and_then(|p| p.owner.clone()),
        Some(ids[0].clone())
    );
}

#[test]
fn owned_and_restricted_squares_are_declined() {
    let (mut ledger, ids) = started_game(&["Alice", "Bob"], GameSettings::default());
    ledger
        .buy_property(&ids[0], "boardwalk", None, Endpoint::Bank)
        .expect("buy");
    let before = ledger.state().clone();

    assert_eq!(
        ledger.buy_property(&ids[1], "boardwalk", None, Endpoint::Bank),
        Err(LedgerError::AlreadyOwned("boardwalk".to_string()))
    );
    assert_eq!(
        ledger.buy_property(&ids[1], "jail", None, Endpoint::Bank),
        Err(LedgerError::NotPurchasable("jail".to_string()))
    );
    assert!(ledger
        .buy_property(&ids[1], "atlantis", None, Endpoint::Bank)
        .unwrap_err()
        .is_not_found());
    assert!(ledger
        .buy_property(&ids[1], "baltic", None, Endpoint::Player(ids[1].clone()))
        .is_err());
    assert_eq!(ledger.state(), &before);
}

#[test]
fn buy_everything_opens_corner_squares() {
    let settings = GameSettings {
        buy_everything: true,
        ..GameSettings::default()
    };
    let (mut ledger, ids) = started_game(&["Alice"], settings);
    ledger
        .buy_property(&ids[0], "go_square", None, Endpoint::Bank)
        .expect("buy corner");
    assert_eq!(cash(&ledger, &ids[0]), 1375);
}

#[test]
fn mortgage_then_unmortgage_costs_ten_percent() {
    let (mut ledger, ids) = started_game(&["Alice"], GameSettings::default());
    ledger
        .buy_property(&ids[0], "reading_rr", None, Endpoint::Bank)
        .expect("buy");
    assert_eq!(cash(&ledger, &ids[0]), 1300);

    ledger.mortgage_property("reading_rr").expect("mortgage");
    assert_eq!(cash(&ledger, &ids[0]), 1400);
    assert!(ledger.property_state("reading_rr").unwrap().mortgaged);
    let tx = &ledger.transactions()[0];
    assert_eq!(tx.from, Some(Endpoint::Bank));
    assert_eq!(tx.description, "Alice mortgaged Reading Railroad for $100");

    ledger.unmortgage_property("reading_rr").expect("unmortgage");
    assert_eq!(cash(&ledger, &ids[0]), 1290);
    assert!(!ledger.property_state("reading_rr").unwrap().mortgaged);
    assert_eq!(ledger.transactions()[0].amount, Some(110));
    assert_eq!(ledger.transactions()[0].to, Some(Endpoint::Bank));
}

#[test]
fn mortgage_never_touches_finite_bank_cash() {
    let settings = GameSettings {
        bank_cash_mode: true,
        ..GameSettings::default()
    };
    let (mut ledger, ids) = started_game(&["Alice"], settings);
    ledger
        .buy_property(&ids[0], "reading_rr", None, Endpoint::Bank)
        .expect("buy");
    let reserve = ledger.bank().cash;
    ledger.mortgage_property("reading_rr").expect("mortgage");
    ledger.unmortgage_property("reading_rr").expect("unmortgage");
    assert_eq!(ledger.bank().cash, reserve);
}

#[test]
fn mortgage_state_guards() {
    let (mut ledger, ids) = started_game(&["Alice"], GameSettings::default());
    assert_eq!(
        ledger.mortgage_property("boardwalk"),
        Err(LedgerError::Unowned("boardwalk".to_string()))
    );
    ledger
        .buy_property(&ids[0], "boardwalk", None, Endpoint::Bank)
        .expect("buy");
    assert_eq!(
        ledger.unmortgage_property("boardwalk"),
        Err(LedgerError::NotMortgaged("boardwalk".to_string()))
    );
    ledger.mortgage_property("boardwalk").expect("mortgage");
    assert_eq!(
        ledger.mortgage_property("boardwalk"),
        Err(LedgerError::AlreadyMortgaged("boardwalk".to_string()))
    );
}

#[test]
fn fifth_improvement_swaps_houses_for_a_hotel() {
    let (mut ledger, ids) = started_game(&["Alice"], GameSettings::default());
    ledger
        .buy_property(&ids[0], "boardwalk", None, Endpoint::Bank)
        .expect("buy");
    let mut ledger = with_state(ledger, |state| {
        state.bank.houses = 10;
        state.bank.hotels = 5;
        if let Some(ps) = state.properties.get_mut("boardwalk") {
            ps.level = 4;
        }
    });

    ledger
        .build_house("boardwalk", Endpoint::Bank)
        .expect("hotel");
    let ps = ledger.property_state("boardwalk").unwrap();
    assert_eq!(ps.level, 5);
    assert!(ps.has_hotel());
    assert_eq!(ledger.bank().houses, 14);
    assert_eq!(ledger.bank().hotels, 4);
    assert_eq!(cash(&ledger, &ids[0]), 1100 - 200);
    assert_eq!(
        ledger.transactions()[0].description,
        "Alice built a Hotel on Boardwalk (paid to The Bank)"
    );

    assert_eq!(
        ledger.build_house("boardwalk", Endpoint::Bank),
        Err(LedgerError::FullyImproved("boardwalk".to_string()))
    );
}

#[test]
fn houses_draw_down_bank_inventory() {
    let (mut ledger, ids) = started_game(&["Alice"], GameSettings::default());
    ledger
        .buy_property(&ids[0], "baltic", None, Endpoint::Bank)
        .expect("buy");
    ledger.build_house("baltic", Endpoint::Bank).expect("house");
    ledger.build_house("baltic", Endpoint::Bank).expect("house");

    assert_eq!(ledger.bank().houses, 30);
    assert_eq!(ledger.property_state("baltic").unwrap().level, 2);
    assert_eq!(cash(&ledger, &ids[0]), 1500 - 60 - 100);
}

#[test]
fn building_is_declined_without_inventory_or_on_railroads() {
    let (mut ledger, ids) = started_game(&["Alice"], GameSettings::default());
    ledger
        .buy_property(&ids[0], "baltic", None, Endpoint::Bank)
        .expect("buy");
    ledger
        .buy_property(&ids[0], "short_line", None, Endpoint::Bank)
        .expect("buy");
    assert_eq!(
        ledger.build_house("short_line", Endpoint::Bank),
        Err(LedgerError::NotBuildable("short_line".to_string()))
    );

    let mut ledger = with_state(ledger, |state| state.bank.houses = 0);
    assert_eq!(
        ledger.build_house("baltic", Endpoint::Bank),
        Err(LedgerError::HousesExhausted)
    );
    assert_eq!(ledger.bank().houses, 0);
}

#[test]
fn free_build_charges_nothing() {
    let (mut ledger, ids) = started_game(&["Alice"], GameSettings::default());
    ledger
        .buy_property(&ids[0], "oriental", None, Endpoint::Bank)
        .expect("buy");
    ledger.build_house_free("oriental").expect("free house");

    assert_eq!(cash(&ledger, &ids[0]), 1400);
    assert_eq!(ledger.bank().houses, 31);
    let tx = &ledger.transactions()[0];
    assert_eq!(tx.amount, None);
    assert_eq!(tx.from, None);
    assert_eq!(tx.to, None);
    assert_eq!(tx.description, "Alice built a House on Oriental Ave (FREE)");
}

#[test]
fn rent_follows_board_rules() {
    let (mut ledger, ids) = started_game(&["Alice", "Bob"], GameSettings::default());
    let alice = &ids[0];

    assert_eq!(ledger.rent_due("mediterranean", None), Ok(None));

    ledger
        .buy_property(alice, "mediterranean", None, Endpoint::Bank)
        .expect("buy");
    assert_eq!(ledger.rent_due("mediterranean", None), Ok(Some(2)));

    ledger
        .buy_property(alice, "baltic", None, Endpoint::Bank)
        .expect("buy");
    assert_eq!(ledger.rent_due("mediterranean", None), Ok(Some(4)));

    ledger
        .build_house("mediterranean", Endpoint::Bank)
        .expect("house");
    assert_eq!(ledger.rent_due("mediterranean", None), Ok(Some(10)));

    ledger
        .buy_property(alice, "reading_rr", None, Endpoint::Bank)
        .expect("buy");
    assert_eq!(ledger.rent_due("reading_rr", None), Ok(Some(25)));
    ledger
        .buy_property(alice, "short_line", None, Endpoint::Bank)
        .expect("buy");
    assert_eq!(ledger.rent_due("reading_rr", None), Ok(Some(50)));

    ledger
        .buy_property(alice, "water_works", None, Endpoint::Bank)
        .expect("buy");
    assert_eq!(ledger.rent_due("water_works", None), Ok(None));
    assert_eq!(ledger.rent_due("water_works", Some(7)), Ok(Some(28)));
    ledger
        .buy_property(alice, "electric_co", None, Endpoint::Bank)
        .expect("buy");
    assert_eq!(ledger.rent_due("water_works", Some(7)), Ok(Some(70)));

    ledger.mortgage_property("short_line").expect("mortgage");
    assert_eq!(ledger.rent_due("short_line", None), Ok(None));
}

#[test]
fn paying_rent_moves_cash_to_the_owner() {
    let (mut ledger, ids) = started_game(&["Alice", "Bob"], GameSettings::default());
    ledger
        .buy_property(&ids[0], "boardwalk", None, Endpoint::Bank)
        .expect("buy");

    assert_eq!(ledger.pay_rent(&ids[1], "boardwalk", None), Ok(50));
    assert_eq!(cash(&ledger, &ids[0]), 1150);
    assert_eq!(cash(&ledger, &ids[1]), 1450);
    assert_eq!(
        ledger.transactions()[0].description,
        "Rent on Boardwalk: Bob paid $50 to Alice"
    );

    assert_eq!(
        ledger.pay_rent(&ids[0], "boardwalk", None),
        Err(LedgerError::NoRentDue("boardwalk".to_string()))
    );
    assert_eq!(
        ledger.pay_rent(&ids[1], "park_place", None),
        Err(LedgerError::Unowned("park_place".to_string()))
    );
}
