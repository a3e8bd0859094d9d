//! The game ledger engine: one owned [`GameState`] and every operation that
//! mutates it.
//!
//! Operations are total. A missing id or a rule that forbids the move returns
//! a [`LedgerError`] and leaves the state untouched: no balance moves, no undo
//! snapshot is pushed, nothing is logged and observers are not notified.
//! Successful operations append exactly one transaction (newest first) and
//! then notify every subscribed [`LedgerObserver`].

use std::collections::BTreeMap;

use log::{debug, info};

use crate::ledger::catalog::{ColorGroup, Property, PropertyCatalog};
use crate::ledger::errors::LedgerError;
use crate::ledger::history::History;
use crate::ledger::money::format_money;
use crate::ledger::stamp::{Stamp, SystemStamp};
use crate::ledger::types::{
    Bank, Endpoint, GameSettings, GameState, Player, PlayerId, PropertyState, Transaction,
    BANK_STARTING_CASH, GO_SALARY, HOTEL_LEVEL, HOUSES_PER_HOTEL, MAX_IMPROVEMENT,
};
use crate::logutil::escape_log;
use crate::validation::{
    validate_amount, validate_color, validate_player_name, validate_reason, MAX_AMOUNT,
};

/// Hook invoked with the new state after every successful mutation.
///
/// Observers are fire-and-forget: they cannot fail the operation that
/// triggered them.
pub trait LedgerObserver: Send {
    fn state_changed(&mut self, state: &GameState);
}

pub struct GameLedger {
    state: GameState,
    catalog: PropertyCatalog,
    stamp: Box<dyn Stamp>,
    observers: Vec<Box<dyn LedgerObserver>>,
}

fn fresh_properties(catalog: &PropertyCatalog) -> BTreeMap<String, PropertyState> {
    catalog
        .iter()
        .map(|p| (p.id.clone(), PropertyState::default()))
        .collect()
}

impl GameLedger {
    pub fn new(catalog: PropertyCatalog) -> Self {
        Self::with_stamp(catalog, Box::new(SystemStamp))
    }

    pub fn with_stamp(catalog: PropertyCatalog, stamp: Box<dyn Stamp>) -> Self {
        let state = GameState {
            players: Vec::new(),
            properties: fresh_properties(&catalog),
            bank: Bank::default(),
            settings: GameSettings::default(),
            transactions: Vec::new(),
            active_player: None,
            turn_count: 0,
            history: History::default(),
        };
        Self {
            state,
            catalog,
            stamp,
            observers: Vec::new(),
        }
    }

    /// Resume from a previously saved state. Property records are reconciled
    /// against the catalog: missing entries start fresh, unknown ones are dropped.
    pub fn from_state(catalog: PropertyCatalog, mut state: GameState, stamp: Box<dyn Stamp>) -> Self {
        let mut properties = fresh_properties(&catalog);
        for (id, ps) in std::mem::take(&mut state.properties) {
            if let Some(slot) = properties.get_mut(&id) {
                *slot = ps;
            } else {
                debug!("dropping saved state for unknown property {}", escape_log(&id));
            }
        }
        state.properties = properties;
        Self {
            state,
            catalog,
            stamp,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn LedgerObserver>) {
        self.observers.push(observer);
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn catalog(&self) -> &PropertyCatalog {
        &self.catalog
    }

    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.state.player(id)
    }

    /// Case-insensitive lookup by display name.
    pub fn find_player_by_name(&self, name: &str) -> Option<&Player> {
        let wanted = name.trim().to_lowercase();
        self.state
            .players
            .iter()
            .find(|p| p.name.to_lowercase() == wanted)
    }

    /// Resolve user input to an endpoint: `bank`, `free-parking`, a player id
    /// or a player name. Returns `None` for unknown players.
    pub fn resolve_endpoint(&self, input: &str) -> Option<Endpoint> {
        match input.parse::<Endpoint>().ok()? {
            Endpoint::Player(id) => {
                if self.state.player(&id).is_some() {
                    Some(Endpoint::Player(id))
                } else {
                    self.find_player_by_name(input)
                        .map(|p| Endpoint::Player(p.id.clone()))
                }
            }
            other => Some(other),
        }
    }

    pub fn property_state(&self, property_id: &str) -> Option<&PropertyState> {
        self.state.properties.get(property_id)
    }

    pub fn bank(&self) -> &Bank {
        &self.state.bank
    }

    pub fn settings(&self) -> &GameSettings {
        &self.state.settings
    }

    /// Newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    pub fn active_player(&self) -> Option<&Player> {
        self.state
            .active_player
            .as_ref()
            .and_then(|id| self.state.player(id))
    }

    pub fn turn_count(&self) -> u32 {
        self.state.turn_count
    }

    pub fn history_depth(&self) -> usize {
        self.state.history.len()
    }

    // ------------------------------------------------------------------
    // Game setup (not undoable)
    // ------------------------------------------------------------------

    /// Add a player holding the current settings' starting cash.
    pub fn add_player(&mut self, name: &str, color: &str) -> Result<PlayerId, LedgerError> {
        let name = validate_player_name(name)?;
        let color = validate_color(color)?;
        let id = PlayerId::new(self.stamp.next_id());
        info!("player {} joined as {}", escape_log(&name), id);
        self.state.players.push(Player {
            id: id.clone(),
            name,
            cash: self.state.settings.starting_cash,
            color,
            is_bankrupt: false,
        });
        self.notify();
        Ok(id)
    }

    /// Start a fresh game with the current players under `settings`.
    pub fn start_game(&mut self, settings: GameSettings) -> Result<(), LedgerError> {
        if settings.starting_cash < 0 {
            return Err(LedgerError::validation(
                "starting_cash",
                "cannot be negative",
            ));
        }
        if settings.starting_cash > MAX_AMOUNT {
            return Err(LedgerError::validation(
                "starting_cash",
                format!("cannot exceed {}", format_money(MAX_AMOUNT)),
            ));
        }

        let issued = settings
            .starting_cash
            .saturating_mul(self.state.players.len() as i64);
        let bank_cash = if settings.bank_cash_mode {
            (BANK_STARTING_CASH - issued).max(0)
        } else {
            BANK_STARTING_CASH
        };

        for player in &mut self.state.players {
            player.cash = settings.starting_cash;
            player.is_bankrupt = false;
        }
        self.state.properties = fresh_properties(&self.catalog);
        self.state.active_player = self.state.players.first().map(|p| p.id.clone());
        self.state.turn_count = 1;
        self.state.bank = Bank {
            cash: bank_cash,
            ..Bank::default()
        };
        self.state.history.clear();
        self.state.transactions.clear();
        self.state.settings = settings;

        info!(
            "game started with {} players, {} each",
            self.state.players.len(),
            format_money(self.state.settings.starting_cash)
        );
        self.log("Game Started".to_string(), None, None, None);
        self.notify();
        Ok(())
    }

    /// Clear players, properties, the ledger and the turn pointer before a new setup.
    pub fn reset_game(&mut self) {
        self.state.players.clear();
        self.state.properties = fresh_properties(&self.catalog);
        self.state.transactions.clear();
        self.state.active_player = None;
        self.state.turn_count = 0;
        self.state.history.clear();
        info!("game reset");
        self.notify();
    }

    /// Advance the active-player pointer by list position. Bankrupt players
    /// are not skipped.
    pub fn next_turn(&mut self) -> Result<PlayerId, LedgerError> {
        let count = self.state.players.len();
        if count == 0 {
            return Err(LedgerError::NoPlayers);
        }
        let next_index = self
            .state
            .active_player
            .as_ref()
            .and_then(|id| self.state.players.iter().position(|p| &p.id == id))
            .map_or(0, |idx| (idx + 1) % count);

        let next = &self.state.players[next_index];
        let (next_id, next_name) = (next.id.clone(), next.name.clone());
        self.state.active_player = Some(next_id.clone());
        self.state.turn_count += 1;
        debug!("turn {}: {}", self.state.turn_count, escape_log(&next_name));
        self.log(format!("Start of {}'s turn", next_name), None, None, None);
        self.notify();
        Ok(next_id)
    }

    // ------------------------------------------------------------------
    // Money movements
    // ------------------------------------------------------------------

    /// Move `amount` between two endpoints.
    ///
    /// Withdrawing from free parking always empties the whole pot; the
    /// recipient is credited `amount`. Bank cash only moves in finite-bank mode.
    pub fn transfer_money(
        &mut self,
        from: Endpoint,
        to: Endpoint,
        amount: i64,
        reason: &str,
    ) -> Result<(), LedgerError> {
        validate_amount(amount)?;
        let reason = validate_reason(reason)?;
        if from == to {
            return Err(LedgerError::validation(
                "to",
                "source and destination must differ",
            ));
        }
        self.require_endpoint(&from)?;
        self.require_endpoint(&to)?;

        self.checkpoint();
        self.debit(&from, amount);
        self.credit(&to, amount);

        let description = format!(
            "{}: {} paid {} to {}",
            reason,
            self.state.endpoint_name(&from),
            format_money(amount),
            self.state.endpoint_name(&to)
        );
        debug!("transfer {}", escape_log(&description));
        self.log(description, Some(amount), Some(from), Some(to));
        self.notify();
        Ok(())
    }

    /// Bank pays the player the GO salary.
    pub fn pass_go(&mut self, player: &PlayerId) -> Result<(), LedgerError> {
        self.transfer_money(
            Endpoint::Bank,
            Endpoint::Player(player.clone()),
            GO_SALARY,
            "Passed GO",
        )
    }

    /// Pay the whole free parking pot to the player. Returns the amount collected.
    pub fn collect_jackpot(&mut self, player: &PlayerId) -> Result<i64, LedgerError> {
        if !self.state.settings.free_parking_jackpot {
            return Err(LedgerError::JackpotDisabled);
        }
        self.require_player(player)?;
        let pot = self.state.bank.free_parking_pot;
        if pot <= 0 {
            return Err(LedgerError::JackpotEmpty);
        }
        self.transfer_money(
            Endpoint::FreeParking,
            Endpoint::Player(player.clone()),
            pot,
            "Jackpot",
        )?;
        Ok(pot)
    }

    /// Buy-everything house rule: pay the bank for a sale card.
    pub fn buy_sale_card(&mut self, player: &PlayerId, price: i64) -> Result<(), LedgerError> {
        if !self.state.settings.buy_everything {
            return Err(LedgerError::SaleCardsDisabled);
        }
        self.transfer_money(
            Endpoint::Player(player.clone()),
            Endpoint::Bank,
            price,
            "Bought Sale Card",
        )
    }

    /// Rent currently owed by a visitor landing on the property, if any.
    ///
    /// Utilities need the visitor's dice roll; without one no rent is computed.
    pub fn rent_due(
        &self,
        property_id: &str,
        dice_roll: Option<u32>,
    ) -> Result<Option<i64>, LedgerError> {
        let prop = self.lookup_property(property_id)?;
        let ps = self.lookup_property_state(property_id)?;
        let Some(owner) = ps.owner.as_ref() else {
            return Ok(None);
        };
        if ps.mortgaged {
            return Ok(None);
        }

        let owned_in_group = self
            .catalog
            .group(prop.color)
            .filter(|p| {
                self.state
                    .properties
                    .get(&p.id)
                    .is_some_and(|s| s.is_owned_by(owner))
            })
            .count();

        let rent = match prop.color {
            ColorGroup::Railroad => prop.rent.get(owned_in_group.saturating_sub(1)).copied(),
            ColorGroup::Utility => dice_roll.map(|roll| {
                let multiplier: i64 = if owned_in_group >= prop.group_size { 10 } else { 4 };
                multiplier.saturating_mul(i64::from(roll))
            }),
            color if !color.is_street() => prop.rent.first().copied(),
            _ if ps.level > 0 => prop.rent.get(ps.level as usize).copied(),
            _ => prop.rent.first().map(|base| {
                if owned_in_group >= prop.group_size {
                    base.saturating_mul(2)
                } else {
                    *base
                }
            }),
        };
        Ok(rent)
    }

    /// Charge the visitor the rent due on a property, paid to its owner.
    /// Returns the rent paid.
    pub fn pay_rent(
        &mut self,
        payer: &PlayerId,
        property_id: &str,
        dice_roll: Option<u32>,
    ) -> Result<i64, LedgerError> {
        self.require_player(payer)?;
        let name = self.lookup_property(property_id)?.name.clone();
        let owner = self
            .lookup_property_state(property_id)?
            .owner
            .clone()
            .ok_or_else(|| LedgerError::Unowned(property_id.to_string()))?;
        if &owner == payer {
            return Err(LedgerError::NoRentDue(property_id.to_string()));
        }
        let rent = self
            .rent_due(property_id, dice_roll)?
            .filter(|r| *r > 0)
            .ok_or_else(|| LedgerError::NoRentDue(property_id.to_string()))?;

        self.transfer_money(
            Endpoint::Player(payer.clone()),
            Endpoint::Player(owner),
            rent,
            &format!("Rent on {}", name),
        )?;
        Ok(rent)
    }

    // ------------------------------------------------------------------
    // Property operations
    // ------------------------------------------------------------------

    /// Buy an unowned property at catalog price, or `price_override` (0 for a
    /// free house-rule acquisition), paying `pay_to`.
    pub fn buy_property(
        &mut self,
        buyer: &PlayerId,
        property_id: &str,
        price_override: Option<i64>,
        pay_to: Endpoint,
    ) -> Result<(), LedgerError> {
        let prop = self.lookup_property(property_id)?.clone();
        let buyer_name = self.require_player(buyer)?.name.clone();
        self.require_endpoint(&pay_to)?;
        if pay_to.player_id() == Some(buyer) {
            return Err(LedgerError::validation("pay_to", "buyer cannot pay themselves"));
        }
        let price = price_override.unwrap_or(prop.price);
        if price < 0 {
            return Err(LedgerError::validation("price", "cannot be negative"));
        }
        if price > MAX_AMOUNT {
            return Err(LedgerError::validation(
                "price",
                format!("cannot exceed {}", format_money(MAX_AMOUNT)),
            ));
        }
        if prop.buy_everything_only && !self.state.settings.buy_everything {
            return Err(LedgerError::NotPurchasable(prop.id));
        }
        if self.lookup_property_state(property_id)?.owner.is_some() {
            return Err(LedgerError::AlreadyOwned(prop.id));
        }

        self.checkpoint();
        if let Some(player) = self.state.player_mut(buyer) {
            player.cash = player.cash.saturating_sub(price);
        }
        self.credit(&pay_to, price);
        if let Some(ps) = self.state.properties.get_mut(property_id) {
            ps.owner = Some(buyer.clone());
        }

        let description = format!(
            "{} bought {} for {} (paid to {})",
            buyer_name,
            prop.name,
            format_money(price),
            self.state.endpoint_name(&pay_to)
        );
        debug!("{}", escape_log(&description));
        self.log(
            description,
            Some(price),
            Some(Endpoint::Player(buyer.clone())),
            Some(pay_to),
        );
        self.notify();
        Ok(())
    }

    /// The bank lends the owner the mortgage value. Bank cash is never debited.
    pub fn mortgage_property(&mut self, property_id: &str) -> Result<(), LedgerError> {
        let (prop, owner) = self.owned_property(property_id)?;
        if self.lookup_property_state(property_id)?.mortgaged {
            return Err(LedgerError::AlreadyMortgaged(prop.id));
        }
        let owner_name = self.require_player(&owner)?.name.clone();

        self.checkpoint();
        if let Some(player) = self.state.player_mut(&owner) {
            player.cash = player.cash.saturating_add(prop.mortgage_value);
        }
        if let Some(ps) = self.state.properties.get_mut(property_id) {
            ps.mortgaged = true;
        }

        let description = format!(
            "{} mortgaged {} for {}",
            owner_name,
            prop.name,
            format_money(prop.mortgage_value)
        );
        debug!("{}", escape_log(&description));
        self.log(
            description,
            Some(prop.mortgage_value),
            Some(Endpoint::Bank),
            Some(Endpoint::Player(owner)),
        );
        self.notify();
        Ok(())
    }

    /// Repay the mortgage plus 10% interest, rounded up.
    pub fn unmortgage_property(&mut self, property_id: &str) -> Result<(), LedgerError> {
        let (prop, owner) = self.owned_property(property_id)?;
        if !self.lookup_property_state(property_id)?.mortgaged {
            return Err(LedgerError::NotMortgaged(prop.id));
        }
        let owner_name = self.require_player(&owner)?.name.clone();
        let cost = prop.unmortgage_cost();

        self.checkpoint();
        if let Some(player) = self.state.player_mut(&owner) {
            player.cash = player.cash.saturating_sub(cost);
        }
        if let Some(ps) = self.state.properties.get_mut(property_id) {
            ps.mortgaged = false;
        }

        let description = format!(
            "{} unmortgaged {} for {}",
            owner_name,
            prop.name,
            format_money(cost)
        );
        debug!("{}", escape_log(&description));
        self.log(
            description,
            Some(cost),
            Some(Endpoint::Player(owner)),
            Some(Endpoint::Bank),
        );
        self.notify();
        Ok(())
    }

    /// Add one improvement, the owner paying the build cost to `pay_to`.
    pub fn build_house(&mut self, property_id: &str, pay_to: Endpoint) -> Result<(), LedgerError> {
        self.build(property_id, Some(pay_to))
    }

    /// Add one improvement without charging the owner.
    pub fn build_house_free(&mut self, property_id: &str) -> Result<(), LedgerError> {
        self.build(property_id, None)
    }

    fn build(&mut self, property_id: &str, payment: Option<Endpoint>) -> Result<(), LedgerError> {
        let (prop, owner) = self.owned_property(property_id)?;
        if !prop.is_buildable() {
            return Err(LedgerError::NotBuildable(prop.id));
        }
        let level = self.lookup_property_state(property_id)?.level;
        if level >= MAX_IMPROVEMENT {
            return Err(LedgerError::FullyImproved(prop.id));
        }
        let is_hotel = level + 1 == HOTEL_LEVEL;
        if is_hotel && self.state.bank.hotels < 1 {
            return Err(LedgerError::HotelsExhausted);
        }
        if !is_hotel && self.state.bank.houses < 1 {
            return Err(LedgerError::HousesExhausted);
        }
        let owner_name = self.require_player(&owner)?.name.clone();
        if let Some(pay_to) = &payment {
            self.require_endpoint(pay_to)?;
            if pay_to.player_id() == Some(&owner) {
                return Err(LedgerError::validation("pay_to", "owner cannot pay themselves"));
            }
        }

        self.checkpoint();
        if is_hotel {
            self.state.bank.houses += HOUSES_PER_HOTEL;
            self.state.bank.hotels -= 1;
        } else {
            self.state.bank.houses -= 1;
        }
        if let Some(ps) = self.state.properties.get_mut(property_id) {
            ps.level += 1;
        }

        let building = if is_hotel { "Hotel" } else { "House" };
        match payment {
            Some(pay_to) => {
                if let Some(player) = self.state.player_mut(&owner) {
                    player.cash = player.cash.saturating_sub(prop.house_cost);
                }
                self.credit(&pay_to, prop.house_cost);
                let description = format!(
                    "{} built a {} on {} (paid to {})",
                    owner_name,
                    building,
                    prop.name,
                    self.state.endpoint_name(&pay_to)
                );
                debug!("{}", escape_log(&description));
                self.log(
                    description,
                    Some(prop.house_cost),
                    Some(Endpoint::Player(owner)),
                    Some(pay_to),
                );
            }
            None => {
                let description =
                    format!("{} built a {} on {} (FREE)", owner_name, building, prop.name);
                debug!("{}", escape_log(&description));
                self.log(description, None, None, None);
            }
        }
        self.notify();
        Ok(())
    }

    /// Settle a bankrupt player's estate with a creditor.
    ///
    /// A player creditor takes over every property as-is plus the debtor's
    /// whole cash balance. The bank as creditor returns the properties to a
    /// fresh unowned state and the cash simply leaves the game.
    pub fn declare_bankruptcy(
        &mut self,
        debtor: &PlayerId,
        creditor: Endpoint,
    ) -> Result<(), LedgerError> {
        let player = self.require_player(debtor)?;
        if player.is_bankrupt {
            return Err(LedgerError::AlreadyBankrupt(debtor.clone()));
        }
        let (debtor_name, forfeited) = (player.name.clone(), player.cash);
        match &creditor {
            Endpoint::FreeParking => {
                return Err(LedgerError::validation(
                    "creditor",
                    "free parking cannot take over assets",
                ));
            }
            Endpoint::Player(id) if id == debtor => {
                return Err(LedgerError::validation(
                    "creditor",
                    "a player cannot be their own creditor",
                ));
            }
            Endpoint::Player(id) => {
                self.require_player(id)?;
            }
            Endpoint::Bank => {}
        }

        self.checkpoint();
        let holdings = self.state.owned_by(debtor);
        match &creditor {
            Endpoint::Player(id) => {
                for property_id in &holdings {
                    if let Some(ps) = self.state.properties.get_mut(property_id) {
                        ps.owner = Some(id.clone());
                    }
                }
                if let Some(receiver) = self.state.player_mut(id) {
                    receiver.cash = receiver.cash.saturating_add(forfeited);
                }
            }
            _ => {
                for property_id in &holdings {
                    self.state
                        .properties
                        .insert(property_id.clone(), PropertyState::default());
                }
            }
        }
        if let Some(player) = self.state.player_mut(debtor) {
            player.is_bankrupt = true;
            player.cash = 0;
        }

        let description = format!(
            "{} declared bankruptcy! Assets to {}.",
            debtor_name,
            self.state.endpoint_name(&creditor)
        );
        info!(
            "{} ({} properties, {})",
            escape_log(&description),
            holdings.len(),
            format_money(forfeited)
        );
        self.log(
            description,
            Some(forfeited),
            Some(Endpoint::Player(debtor.clone())),
            Some(creditor),
        );
        self.notify();
        Ok(())
    }

    /// Restore players, properties, bank and ledger from the most recent snapshot.
    pub fn undo(&mut self) -> Result<(), LedgerError> {
        let snapshot = self.state.history.pop().ok_or(LedgerError::NothingToUndo)?;
        self.state.restore(snapshot);
        debug!("undo: {} snapshots left", self.state.history.len());
        self.notify();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lookup_property(&self, property_id: &str) -> Result<&Property, LedgerError> {
        self.catalog
            .get(property_id)
            .ok_or_else(|| LedgerError::PropertyNotFound(property_id.to_string()))
    }

    fn lookup_property_state(&self, property_id: &str) -> Result<&PropertyState, LedgerError> {
        self.state
            .properties
            .get(property_id)
            .ok_or_else(|| LedgerError::PropertyNotFound(property_id.to_string()))
    }

    /// Catalog entry plus current owner, for operations that need one.
    fn owned_property(&self, property_id: &str) -> Result<(Property, PlayerId), LedgerError> {
        let prop = self.lookup_property(property_id)?.clone();
        let owner = self
            .lookup_property_state(property_id)?
            .owner
            .clone()
            .ok_or_else(|| LedgerError::Unowned(property_id.to_string()))?;
        Ok((prop, owner))
    }

    fn require_player(&self, id: &PlayerId) -> Result<&Player, LedgerError> {
        self.state
            .player(id)
            .ok_or_else(|| LedgerError::PlayerNotFound(id.clone()))
    }

    fn require_endpoint(&self, endpoint: &Endpoint) -> Result<(), LedgerError> {
        if let Endpoint::Player(id) = endpoint {
            self.require_player(id)?;
        }
        Ok(())
    }

    fn debit(&mut self, endpoint: &Endpoint, amount: i64) {
        match endpoint {
            Endpoint::Player(id) => {
                if let Some(player) = self.state.player_mut(id) {
                    player.cash = player.cash.saturating_sub(amount);
                }
            }
            Endpoint::Bank => {
                if self.state.settings.bank_cash_mode {
                    self.state.bank.cash = self.state.bank.cash.saturating_sub(amount);
                }
            }
            // Jackpot collection always takes the whole pot.
            Endpoint::FreeParking => self.state.bank.free_parking_pot = 0,
        }
    }

    fn credit(&mut self, endpoint: &Endpoint, amount: i64) {
        match endpoint {
            Endpoint::Player(id) => {
                if let Some(player) = self.state.player_mut(id) {
                    player.cash = player.cash.saturating_add(amount);
                }
            }
            Endpoint::Bank => {
                if self.state.settings.bank_cash_mode {
                    self.state.bank.cash = self.state.bank.cash.saturating_add(amount);
                }
            }
            Endpoint::FreeParking => {
                self.state.bank.free_parking_pot =
                    self.state.bank.free_parking_pot.saturating_add(amount)
            }
        }
    }

    fn checkpoint(&mut self) {
        let snapshot = self.state.snapshot();
        self.state.history.push(snapshot);
    }

    fn log(
        &mut self,
        description: String,
        amount: Option<i64>,
        from: Option<Endpoint>,
        to: Option<Endpoint>,
    ) {
        let transaction = Transaction {
            id: self.stamp.next_id(),
            timestamp: self.stamp.now(),
            description,
            amount,
            from,
            to,
        };
        self.state.transactions.insert(0, transaction);
    }

    fn notify(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.state_changed(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::stamp::SequentialStamp;
    use std::sync::{Arc, Mutex};

    fn ledger() -> GameLedger {
        GameLedger::with_stamp(
            PropertyCatalog::standard(),
            Box::new(SequentialStamp::new("t")),
        )
    }

    struct Recorder(Arc<Mutex<Vec<usize>>>);

    impl LedgerObserver for Recorder {
        fn state_changed(&mut self, state: &GameState) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(state.transactions.len());
            }
        }
    }

    #[test]
    fn from_state_reconciles_properties_with_catalog() {
        let mut state = ledger().into_state();
        state.properties.remove("boardwalk");
        state
            .properties
            .insert("atlantis".to_string(), PropertyState::default());

        let resumed = GameLedger::from_state(
            PropertyCatalog::standard(),
            state,
            Box::new(SequentialStamp::default()),
        );
        assert!(resumed.property_state("boardwalk").is_some());
        assert!(resumed.property_state("atlantis").is_none());
        assert_eq!(resumed.state().properties.len(), resumed.catalog().len());
    }

    #[test]
    fn observers_fire_only_on_success() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ledger = ledger();
        ledger.subscribe(Box::new(Recorder(seen.clone())));

        let alice = ledger.add_player("Alice", "red").unwrap();
        ledger.start_game(GameSettings::default()).unwrap();
        assert!(ledger.mortgage_property("boardwalk").is_err());
        ledger.pass_go(&alice).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn resolve_endpoint_accepts_names_and_sentinels() {
        let mut ledger = ledger();
        let alice = ledger.add_player("Alice", "red").unwrap();
        assert_eq!(ledger.resolve_endpoint("bank"), Some(Endpoint::Bank));
        assert_eq!(
            ledger.resolve_endpoint("free-parking"),
            Some(Endpoint::FreeParking)
        );
        assert_eq!(
            ledger.resolve_endpoint("alice"),
            Some(Endpoint::Player(alice.clone()))
        );
        assert_eq!(
            ledger.resolve_endpoint(alice.as_str()),
            Some(Endpoint::Player(alice))
        );
        assert_eq!(ledger.resolve_endpoint("Mallory"), None);
    }
}
