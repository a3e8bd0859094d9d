use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sled::IVec;

use crate::ledger::engine::LedgerObserver;
use crate::ledger::errors::StoreError;
use crate::ledger::types::{GameState, GAME_SCHEMA_VERSION};

const TREE_LEDGER: &str = "ledger";
const KEY_STATE: &[u8] = b"state";

/// Envelope written to disk around the game aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGame {
    pub schema_version: u8,
    pub saved_at: DateTime<Utc>,
    pub state: GameState,
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct LedgerStoreBuilder {
    path: PathBuf,
    flush_on_save: bool,
}

impl LedgerStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flush_on_save: true,
        }
    }

    /// Skip the fsync after each save; sled still flushes in the background.
    pub fn without_flush(mut self) -> Self {
        self.flush_on_save = false;
        self
    }

    pub fn open(self) -> Result<LedgerStore, StoreError> {
        LedgerStore::open_with_options(self.path, self.flush_on_save)
    }
}

/// Sled-backed persistence for the current game, history included.
///
/// The store doubles as a [`LedgerObserver`]: subscribe a clone to a
/// [`crate::ledger::GameLedger`] and every successful operation is saved.
#[derive(Clone)]
pub struct LedgerStore {
    _db: sled::Db,
    ledger: sled::Tree,
    flush_on_save: bool,
}

impl LedgerStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_options(path, true)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, flush_on_save: bool) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let ledger = db.open_tree(TREE_LEDGER)?;
        debug!("ledger store opened at {}", path_ref.display());
        Ok(Self {
            _db: db,
            ledger,
            flush_on_save,
        })
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, StoreError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    /// Replace the saved game with `state`.
    pub fn save(&self, state: &GameState) -> Result<(), StoreError> {
        let record = StoredGame {
            schema_version: GAME_SCHEMA_VERSION,
            saved_at: Utc::now(),
            state: state.clone(),
        };
        let bytes = Self::serialize(&record)?;
        self.ledger.insert(KEY_STATE, bytes)?;
        if self.flush_on_save {
            self.ledger.flush()?;
        }
        Ok(())
    }

    /// Load the saved game, if one exists.
    pub fn load(&self) -> Result<Option<StoredGame>, StoreError> {
        let Some(bytes) = self.ledger.get(KEY_STATE)? else {
            return Ok(None);
        };
        let record: StoredGame = Self::deserialize(bytes)?;
        if record.schema_version != GAME_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "game",
                expected: GAME_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(Some(record))
    }

    /// Forget the saved game entirely.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.ledger.remove(KEY_STATE)?;
        self.ledger.flush()?;
        Ok(())
    }
}

impl LedgerObserver for LedgerStore {
    fn state_changed(&mut self, state: &GameState) {
        if let Err(e) = self.save(state) {
            warn!("failed to persist game state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::catalog::PropertyCatalog;
    use crate::ledger::engine::GameLedger;
    use crate::ledger::stamp::SequentialStamp;
    use tempfile::TempDir;

    #[test]
    fn empty_store_loads_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let store = LedgerStoreBuilder::new(dir.path()).open().expect("store");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn schema_mismatch_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        let store = LedgerStoreBuilder::new(dir.path()).open().expect("store");
        let ledger = GameLedger::with_stamp(
            PropertyCatalog::standard(),
            Box::new(SequentialStamp::default()),
        );
        let record = StoredGame {
            schema_version: GAME_SCHEMA_VERSION + 1,
            saved_at: Utc::now(),
            state: ledger.into_state(),
        };
        store
            .ledger
            .insert(KEY_STATE, LedgerStore::serialize(&record).expect("encode"))
            .expect("insert");

        match store.load() {
            Err(StoreError::SchemaMismatch { entity, found, .. }) => {
                assert_eq!(entity, "game");
                assert_eq!(found, GAME_SCHEMA_VERSION + 1);
            }
            other => panic!("expected schema mismatch, got {:?}", other.map(|r| r.is_some())),
        }
    }

    #[test]
    fn clear_removes_saved_game() {
        let dir = TempDir::new().expect("tempdir");
        let store = LedgerStoreBuilder::new(dir.path())
            .without_flush()
            .open()
            .expect("store");
        let ledger = GameLedger::with_stamp(
            PropertyCatalog::standard(),
            Box::new(SequentialStamp::default()),
        );
        store.save(ledger.state()).expect("save");
        assert!(store.load().expect("load").is_some());
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }
}
