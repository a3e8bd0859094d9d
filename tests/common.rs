//! Shared fixtures for the ledger integration tests.

use banker::ledger::{
    GameLedger, GameSettings, GameState, PlayerId, PropertyCatalog, SequentialStamp,
};

/// Deterministic ledger over the standard board with no players.
pub fn new_ledger() -> GameLedger {
    GameLedger::with_stamp(
        PropertyCatalog::standard(),
        Box::new(SequentialStamp::new("test")),
    )
}

/// Ledger with the named players already added and the game started.
pub fn started_game(names: &[&str], settings: GameSettings) -> (GameLedger, Vec<PlayerId>) {
    let mut ledger = new_ledger();
    let ids = names
        .iter()
        .map(|name| ledger.add_player(name, "#ef4444").expect("add player"))
        .collect();
    ledger.start_game(settings).expect("start game");
    (ledger, ids)
}

/// Rebuild a ledger from an edited state, for fixtures the operations
/// cannot reach directly (depleted bank inventory, pre-built houses).
#[allow(dead_code)]
pub fn with_state(ledger: GameLedger, edit: impl FnOnce(&mut GameState)) -> GameLedger {
    let mut state = ledger.into_state();
    edit(&mut state);
    GameLedger::from_state(
        PropertyCatalog::standard(),
        state,
        Box::new(SequentialStamp::new("resumed")),
    )
}

#[allow(dead_code)]
pub fn cash(ledger: &GameLedger, id: &PlayerId) -> i64 {
    ledger.player(id).expect("player").cash
}

#[allow(dead_code)]
pub fn total_player_cash(ledger: &GameLedger) -> i64 {
    ledger.players().iter().map(|p| p.cash).sum()
}
