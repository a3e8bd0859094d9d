use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::history::History;

pub const GAME_SCHEMA_VERSION: u8 = 1;

/// Cash the bank holds at the start of a standard game.
pub const BANK_STARTING_CASH: i64 = 20_580;
pub const BANK_STARTING_HOUSES: i32 = 32;
pub const BANK_STARTING_HOTELS: i32 = 12;
pub const DEFAULT_STARTING_CASH: i64 = 1_500;
/// Salary paid by the bank for passing GO.
pub const GO_SALARY: i64 = 200;

/// Improvement levels 1-4 are houses, 5 is a hotel.
pub const MAX_IMPROVEMENT: u8 = 5;
pub const HOTEL_LEVEL: u8 = MAX_IMPROVEMENT;
/// Houses handed back to the bank when four houses become a hotel.
pub const HOUSES_PER_HOTEL: i32 = 4;

pub const BANK_SENTINEL: &str = "BANK";
pub const FREE_PARKING_SENTINEL: &str = "FREE_PARKING";

/// Opaque player identifier (a v4 UUID in normal operation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One side of a money movement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    Player(PlayerId),
    Bank,
    FreeParking,
}

impl Endpoint {
    pub fn player(id: impl Into<PlayerId>) -> Self {
        Self::Player(id.into())
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Self::Player(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(id) => write!(f, "{}", id),
            Self::Bank => f.write_str(BANK_SENTINEL),
            Self::FreeParking => f.write_str(FREE_PARKING_SENTINEL),
        }
    }
}

/// Parses the wire sentinels (`BANK`, `FREE_PARKING`, case-insensitive, `-` or `_`);
/// anything else is taken as a player id.
impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Empty endpoint".to_string());
        }
        let normalized = trimmed.to_ascii_uppercase().replace('-', "_");
        Ok(match normalized.as_str() {
            BANK_SENTINEL => Self::Bank,
            FREE_PARKING_SENTINEL => Self::FreeParking,
            _ => Self::Player(PlayerId::new(trimmed)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// May go negative; solvency is never enforced.
    pub cash: i64,
    pub color: String,
    pub is_bankrupt: bool,
}

/// Per-game mutable record for one catalog property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyState {
    pub owner: Option<PlayerId>,
    pub mortgaged: bool,
    /// 0 = unimproved, 1-4 houses, 5 hotel.
    pub level: u8,
}

impl PropertyState {
    pub fn is_owned_by(&self, player: &PlayerId) -> bool {
        self.owner.as_ref() == Some(player)
    }

    pub fn has_hotel(&self) -> bool {
        self.level == HOTEL_LEVEL
    }

    pub fn houses(&self) -> u8 {
        if self.has_hotel() {
            0
        } else {
            self.level
        }
    }
}

/// Bank cash reserve, building inventory and the free parking pot.
///
/// Inventory counters are signed so a restored legacy snapshot with a
/// negative count still loads; the engine itself never builds past zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub cash: i64,
    pub houses: i32,
    pub hotels: i32,
    pub free_parking_pot: i64,
}

impl Default for Bank {
    fn default() -> Self {
        Self {
            cash: BANK_STARTING_CASH,
            houses: BANK_STARTING_HOUSES,
            hotels: BANK_STARTING_HOTELS,
            free_parking_pot: 0,
        }
    }
}

/// Immutable ledger entry. Never edited once logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub amount: Option<i64>,
    pub from: Option<Endpoint>,
    pub to: Option<Endpoint>,
}

/// House rules fixed when a game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub starting_cash: i64,
    /// Fines paid to free parking accumulate into a collectable jackpot.
    pub free_parking_jackpot: bool,
    /// Corner and tax squares can be bought, and sale cards are in play.
    pub buy_everything: bool,
    /// Track the bank's own cash as a finite reserve.
    pub bank_cash_mode: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            starting_cash: DEFAULT_STARTING_CASH,
            free_parking_jackpot: false,
            buy_everything: false,
            bank_cash_mode: false,
        }
    }
}

/// The undoable slice of the game: everything an undo restores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: Vec<Player>,
    pub properties: BTreeMap<String, PropertyState>,
    pub bank: Bank,
    pub transactions: Vec<Transaction>,
}

/// The full aggregate owned by a [`crate::ledger::GameLedger`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub properties: BTreeMap<String, PropertyState>,
    pub bank: Bank,
    pub settings: GameSettings,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    pub active_player: Option<PlayerId>,
    pub turn_count: u32,
    pub history: History,
}

impl GameState {
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.clone(),
            properties: self.properties.clone(),
            bank: self.bank.clone(),
            transactions: self.transactions.clone(),
        }
    }

    /// Roll money, properties, bank and ledger back to `snapshot`.
    ///
    /// Players who joined after the snapshot was taken stay in the game with
    /// their current record, and the active player is kept pointing at a
    /// listed player.
    pub(crate) fn restore(&mut self, snapshot: GameSnapshot) {
        let mut players = snapshot.players;
        let joined_since: Vec<Player> = self
            .players
            .drain(..)
            .filter(|current| !players.iter().any(|p| p.id == current.id))
            .collect();
        players.extend(joined_since);
        self.players = players;

        let active_listed = self
            .active_player
            .as_ref()
            .is_some_and(|id| self.player(id).is_some());
        if !active_listed {
            self.active_player = self.players.first().map(|p| p.id.clone());
        }
        self.properties = snapshot.properties;
        self.bank = snapshot.bank;
        self.transactions = snapshot.transactions;
    }

    /// Ids of every property the player owns, in catalog-key order.
    pub fn owned_by(&self, player: &PlayerId) -> Vec<String> {
        self.properties
            .iter()
            .filter(|(_, ps)| ps.is_owned_by(player))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Human-readable name for an endpoint as it appears in descriptions.
    pub fn endpoint_name(&self, endpoint: &Endpoint) -> String {
        match endpoint {
            Endpoint::Bank => "The Bank".to_string(),
            Endpoint::FreeParking => "Free Parking".to_string(),
            Endpoint::Player(id) => self
                .player(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}
