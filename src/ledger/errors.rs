use thiserror::Error;

use crate::ledger::types::PlayerId;

/// Coarse grouping of [`LedgerError`] variants so callers can decide how to
/// surface a declined operation without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced player or property does not exist.
    NotFound,
    /// The input itself is malformed (non-positive amount, empty name, ...).
    Validation,
    /// The input is well formed but the game rules refuse it right now.
    Declined,
}

/// Reasons a ledger operation declined to mutate the game.
///
/// Every variant means the state was left exactly as it was before the call:
/// no balance moved, no snapshot was pushed and no transaction was logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("property not found: {0}")]
    PropertyNotFound(String),

    /// Operations that act on an owner need the property to have one.
    #[error("property {0} has no owner")]
    Unowned(String),

    #[error("property {0} is already owned")]
    AlreadyOwned(String),

    #[error("property {0} is only purchasable when buy-everything is enabled")]
    NotPurchasable(String),

    #[error("property {0} is already mortgaged")]
    AlreadyMortgaged(String),

    #[error("property {0} is not mortgaged")]
    NotMortgaged(String),

    /// Railroads, utilities and corner squares carry no build cost.
    #[error("nothing can be built on {0}")]
    NotBuildable(String),

    #[error("property {0} already has a hotel")]
    FullyImproved(String),

    #[error("the bank has no houses left")]
    HousesExhausted,

    #[error("the bank has no hotels left")]
    HotelsExhausted,

    #[error("player {0} is already bankrupt")]
    AlreadyBankrupt(PlayerId),

    #[error("no players have joined the game")]
    NoPlayers,

    #[error("the free parking jackpot is disabled")]
    JackpotDisabled,

    #[error("the free parking pot is empty")]
    JackpotEmpty,

    #[error("sale cards are only available when buy-everything is enabled")]
    SaleCardsDisabled,

    #[error("no rent is due on {0}")]
    NoRentDue(String),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl LedgerError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlayerNotFound(_) | Self::PropertyNotFound(_) => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            _ => ErrorKind::Declined,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<crate::validation::ValidationError> for LedgerError {
    fn from(err: crate::validation::ValidationError) -> Self {
        Self::Validation {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

/// Errors that can arise while persisting snapshots or loading catalog data.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, catalog files).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog files are JSON.
    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Returned when a stored record carries an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// A catalog that loaded but breaks an invariant (duplicate ids, rent tiers).
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}
