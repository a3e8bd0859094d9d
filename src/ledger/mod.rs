//! Game ledger engine and its persistence.
//!
//! [`GameLedger`] owns the full in-memory game: players, property ownership
//! and improvements, the bank's cash and building inventory, the free parking
//! pot, a newest-first transaction log and a bounded undo history.
//! [`LedgerStore`] saves that aggregate to sled after every change, and
//! [`RosterStore`] is the simpler persistent roster with a flat payment log.

pub mod catalog;
pub mod engine;
pub mod errors;
pub mod history;
pub mod money;
pub mod roster;
pub mod stamp;
pub mod storage;
pub mod types;

pub use catalog::{ColorGroup, Property, PropertyCatalog};
pub use engine::{GameLedger, LedgerObserver};
pub use errors::{ErrorKind, LedgerError, StoreError};
pub use history::{History, HISTORY_LIMIT};
pub use money::{format_money, format_money_grouped, parse_money};
pub use roster::{
    NewRosterPlayer, NewRosterTransaction, PlayerPatch, RosterPlayer, RosterStore,
    RosterTransaction, ServiceError,
};
pub use stamp::{SequentialStamp, Stamp, SystemStamp};
pub use storage::{LedgerStore, LedgerStoreBuilder, StoredGame};
pub use types::{
    Bank, Endpoint, GameSettings, GameSnapshot, GameState, Player, PlayerId, PropertyState,
    Transaction,
};
