//! Persistent roster ledger: a lighter bookkeeping mode with numbered players
//! and a plain append-only transaction log, backed by sled.
//!
//! Unlike [`crate::ledger::GameLedger`] there are no properties, no free
//! parking and no undo. A missing endpoint on a transaction means the bank,
//! whose cash is never tracked here.

use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sled::transaction::{abort, TransactionError, TransactionResult};
use sled::{IVec, Transactional};
use thiserror::Error;

use crate::ledger::errors::StoreError;
use crate::ledger::types::DEFAULT_STARTING_CASH;
use crate::logutil::escape_log;
use crate::validation::{
    validate_amount, validate_color, validate_description, validate_player_name, ValidationError,
};

const TREE_PLAYERS: &str = "roster_players";
const TREE_TRANSACTIONS: &str = "roster_transactions";

/// How many transactions `list_transactions` returns.
pub const MAX_RECENT_TRANSACTIONS: usize = 50;
pub const DEFAULT_PLAYER_COLOR: &str = "#3b82f6";

const SEED_PLAYERS: [(&str, &str); 4] = [
    ("Player 1", "#ef4444"),
    ("Player 2", "#3b82f6"),
    ("Player 3", "#22c55e"),
    ("Player 4", "#eab308"),
];

/// Errors surfaced to roster clients, each with a fixed status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { message: String, field: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// JSON error body: `{"message": ..., "field": ...}` (field only for validation).
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Validation { message, field } => {
                serde_json::json!({ "message": message, "field": field })
            }
            other => serde_json::json!({ "message": other.to_string() }),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.field(), err.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<sled::Error> for ServiceError {
    fn from(err: sled::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<bincode::Error> for ServiceError {
    fn from(err: bincode::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Abort(inner) => inner,
            TransactionError::Storage(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    pub id: u64,
    pub name: String,
    pub balance: i64,
    pub color: String,
    pub is_bankrupt: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRosterPlayer {
    pub name: String,
    pub color: Option<String>,
    pub balance: Option<i64>,
}

/// Partial update; `None` fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub balance: Option<i64>,
    pub is_bankrupt: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterTransaction {
    pub id: u64,
    /// `None` is the bank.
    pub from_player_id: Option<u64>,
    /// `None` is the bank.
    pub to_player_id: Option<u64>,
    pub amount: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRosterTransaction {
    pub from_player_id: Option<u64>,
    pub to_player_id: Option<u64>,
    pub amount: i64,
    pub description: String,
}

pub struct RosterStore {
    db: sled::Db,
    players: sled::Tree,
    transactions: sled::Tree,
}

fn key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ServiceError> {
    Ok(bincode::serialize(value)?)
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &IVec) -> Result<T, ServiceError> {
    Ok(bincode::deserialize::<T>(bytes)?)
}

impl RosterStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let players = db.open_tree(TREE_PLAYERS)?;
        let transactions = db.open_tree(TREE_TRANSACTIONS)?;
        Ok(Self {
            db,
            players,
            transactions,
        })
    }

    /// Insert the four default players when the roster is empty.
    /// Returns how many were created.
    pub fn seed_defaults(&self) -> Result<usize, ServiceError> {
        if !self.players.is_empty() {
            return Ok(0);
        }
        for (name, color) in SEED_PLAYERS {
            self.create_player(NewRosterPlayer {
                name: name.to_string(),
                color: Some(color.to_string()),
                balance: None,
            })?;
        }
        info!("seeded roster with {} default players", SEED_PLAYERS.len());
        Ok(SEED_PLAYERS.len())
    }

    /// All players in id (creation) order.
    pub fn list_players(&self) -> Result<Vec<RosterPlayer>, ServiceError> {
        let mut players = Vec::new();
        for entry in self.players.iter() {
            let (_, bytes) = entry?;
            players.push(decode(&bytes)?);
        }
        Ok(players)
    }

    pub fn get_player(&self, id: u64) -> Result<RosterPlayer, ServiceError> {
        match self.players.get(key(id))? {
            Some(bytes) => decode(&bytes),
            None => Err(ServiceError::NotFound(format!("player {}", id))),
        }
    }

    pub fn create_player(&self, new: NewRosterPlayer) -> Result<RosterPlayer, ServiceError> {
        let name = validate_player_name(&new.name)?;
        let color = validate_color(new.color.as_deref().unwrap_or(DEFAULT_PLAYER_COLOR))?;
        let player = RosterPlayer {
            id: self.db.generate_id()?,
            name,
            balance: new.balance.unwrap_or(DEFAULT_STARTING_CASH),
            color,
            is_bankrupt: false,
            created_at: Utc::now(),
        };
        self.players.insert(key(player.id), encode(&player)?)?;
        self.players.flush()?;
        debug!("roster player {} created as {}", escape_log(&player.name), player.id);
        Ok(player)
    }

    pub fn update_player(&self, id: u64, patch: PlayerPatch) -> Result<RosterPlayer, ServiceError> {
        let mut player = self.get_player(id)?;
        if let Some(name) = patch.name {
            player.name = validate_player_name(&name)?;
        }
        if let Some(color) = patch.color {
            player.color = validate_color(&color)?;
        }
        if let Some(balance) = patch.balance {
            player.balance = balance;
        }
        if let Some(is_bankrupt) = patch.is_bankrupt {
            player.is_bankrupt = is_bankrupt;
        }
        self.players.insert(key(id), encode(&player)?)?;
        self.players.flush()?;
        Ok(player)
    }

    /// Remove a player. Logged transactions that reference them are kept.
    pub fn delete_player(&self, id: u64) -> Result<(), ServiceError> {
        match self.players.remove(key(id))? {
            Some(_) => {
                self.players.flush()?;
                Ok(())
            }
            None => Err(ServiceError::NotFound(format!("player {}", id))),
        }
    }

    /// Reset every balance to `start_balance`, clear bankrupt flags and wipe
    /// the transaction log in one atomic step.
    pub fn reset_game(&self, start_balance: i64) -> Result<Vec<RosterPlayer>, ServiceError> {
        if start_balance < 0 {
            return Err(ServiceError::validation(
                "startBalance",
                "Start balance cannot be negative",
            ));
        }

        let mut players = self.list_players()?;
        for player in &mut players {
            player.balance = start_balance;
            player.is_bankrupt = false;
        }
        let encoded = players
            .iter()
            .map(|p| Ok((key(p.id), encode(p)?)))
            .collect::<Result<Vec<_>, ServiceError>>()?;
        let logged = self
            .transactions
            .iter()
            .keys()
            .collect::<Result<Vec<_>, _>>()?;

        let outcome: TransactionResult<(), ServiceError> = (&self.players, &self.transactions)
            .transaction(|(players_tx, transactions_tx)| {
                for (k, bytes) in &encoded {
                    players_tx.insert(&k[..], bytes.as_slice())?;
                }
                for k in &logged {
                    transactions_tx.remove(k.clone())?;
                }
                Ok(())
            });
        outcome?;
        self.db.flush()?;

        info!(
            "roster reset: {} players at {}, {} transactions cleared",
            players.len(),
            start_balance,
            logged.len()
        );
        Ok(players)
    }

    /// The newest [`MAX_RECENT_TRANSACTIONS`] transactions, newest first.
    pub fn list_transactions(&self) -> Result<Vec<RosterTransaction>, ServiceError> {
        self.transactions
            .iter()
            .rev()
            .take(MAX_RECENT_TRANSACTIONS)
            .map(|entry| {
                let (_, bytes) = entry?;
                decode(&bytes)
            })
            .collect()
    }

    /// Log a payment and move the balances of the players involved, atomically.
    pub fn create_transaction(
        &self,
        new: NewRosterTransaction,
    ) -> Result<RosterTransaction, ServiceError> {
        let amount = validate_amount(new.amount)?;
        let description = validate_description(&new.description)?;
        match (new.from_player_id, new.to_player_id) {
            (None, None) => {
                return Err(ServiceError::validation(
                    "toPlayerId",
                    "A transaction needs at least one player",
                ));
            }
            (Some(a), Some(b)) if a == b => {
                return Err(ServiceError::validation(
                    "toPlayerId",
                    "A player cannot pay themselves",
                ));
            }
            _ => {}
        }

        let record = RosterTransaction {
            id: self.db.generate_id()?,
            from_player_id: new.from_player_id,
            to_player_id: new.to_player_id,
            amount,
            description,
            created_at: Utc::now(),
        };
        let record_bytes = encode(&record)?;

        let outcome: TransactionResult<(), ServiceError> = (&self.players, &self.transactions)
            .transaction(|(players_tx, transactions_tx)| {
                let legs = [(record.from_player_id, -amount), (record.to_player_id, amount)];
                for (player_id, delta) in legs {
                    let Some(id) = player_id else { continue };
                    let Some(bytes) = players_tx.get(key(id))? else {
                        return abort(ServiceError::NotFound(format!("player {}", id)));
                    };
                    let mut player: RosterPlayer = match decode(&bytes) {
                        Ok(p) => p,
                        Err(e) => return abort(e),
                    };
                    player.balance = match player.balance.checked_add(delta) {
                        Some(balance) => balance,
                        None => {
                            return abort(ServiceError::validation(
                                "amount",
                                "Payment would overflow the player's balance",
                            ))
                        }
                    };
                    let updated = match encode(&player) {
                        Ok(b) => b,
                        Err(e) => return abort(e),
                    };
                    players_tx.insert(&key(id)[..], updated)?;
                }
                transactions_tx.insert(&key(record.id)[..], record_bytes.as_slice())?;
                Ok(())
            });
        outcome?;
        self.db.flush()?;

        debug!(
            "roster transaction {}: {} ({})",
            record.id,
            escape_log(&record.description),
            record.amount
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(ServiceError::validation("amount", "bad").status_code(), 400);
        assert_eq!(ServiceError::NotFound("player 9".into()).status_code(), 404);
        assert_eq!(ServiceError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn validation_body_names_field() {
        let err: ServiceError = ValidationError::AmountTooSmall { min: 1 }.into();
        let body = err.body();
        assert_eq!(body["field"], "amount");
        assert_eq!(body["message"], "Amount must be at least 1");
        assert!(ServiceError::NotFound("player 3".into()).body().get("field").is_none());
    }

    #[test]
    fn seeding_only_fills_empty_roster() {
        let dir = TempDir::new().expect("tempdir");
        let store = RosterStore::open(dir.path()).expect("store");
        assert_eq!(store.seed_defaults().expect("seed"), 4);
        assert_eq!(store.seed_defaults().expect("seed again"), 0);
        let players = store.list_players().expect("list");
        assert_eq!(players.len(), 4);
        assert_eq!(players[0].name, "Player 1");
        assert_eq!(players[3].color, "#eab308");
    }
}
