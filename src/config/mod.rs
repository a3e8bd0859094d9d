//! # Configuration Management Module
//!
//! Banker reads a single TOML file describing the house rules for new games,
//! where game data lives on disk and how logging behaves.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - Default house rules applied by `banker start`
//! - [`StorageConfig`] - Data directory for the sled databases
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use banker::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Starting cash: {}", config.game.starting_cash);
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! starting_cash = 1500
//! free_parking_jackpot = false
//! buy_everything = false
//! bank_cash_mode = false
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "banker.log"
//! ```
//!
//! Missing sections fall back to their defaults, so an empty file is valid.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::ledger::catalog::PropertyCatalog;
use crate::ledger::errors::StoreError;
use crate::ledger::types::{GameSettings, DEFAULT_STARTING_CASH};
use crate::validation::MAX_AMOUNT;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_starting_cash() -> i64 {
    DEFAULT_STARTING_CASH
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// House rules used when a new game starts. Individual `banker start`
/// flags override these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_starting_cash")]
    pub starting_cash: i64,
    #[serde(default)]
    pub free_parking_jackpot: bool,
    #[serde(default)]
    pub buy_everything: bool,
    /// Track the bank's cash as a finite reserve.
    #[serde(default)]
    pub bank_cash_mode: bool,
    /// JSON property catalog replacing the built-in board.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_cash: default_starting_cash(),
            free_parking_jackpot: false,
            buy_everything: false,
            bank_cash_mode: false,
            catalog_path: None,
        }
    }
}

impl GameConfig {
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            starting_cash: self.starting_cash,
            free_parking_jackpot: self.free_parking_jackpot,
            buy_everything: self.buy_everything,
            bank_cash_mode: self.bank_cash_mode,
        }
    }

    /// The configured catalog, or the standard board when none is set.
    pub fn catalog(&self) -> Result<PropertyCatalog, StoreError> {
        match &self.catalog_path {
            Some(path) => PropertyCatalog::load_json(path),
            None => Ok(PropertyCatalog::standard()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// sled database holding the current game.
    pub fn game_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("game")
    }

    /// sled database holding the persistent roster.
    pub fn roster_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("roster")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: Some("banker.log".to_string()),
        }
    }
}

impl Config {
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.starting_cash < 0 {
            return Err(anyhow!(
                "game.starting_cash cannot be negative (got {})",
                self.game.starting_cash
            ));
        }
        if self.game.starting_cash > MAX_AMOUNT {
            return Err(anyhow!(
                "game.starting_cash cannot exceed {} (got {})",
                MAX_AMOUNT,
                self.game.starting_cash
            ));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir cannot be empty"));
        }
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(anyhow!(
                "logging.level must be one of {} (got '{}')",
                LOG_LEVELS.join(", "),
                self.logging.level
            ));
        }
        Ok(())
    }
}
