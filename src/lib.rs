//! # Banker - Digital Banker for Property-Trading Board Games
//!
//! Banker replaces paper money and the human banker in a Monopoly-style game.
//! It keeps every player's cash, property ownership, mortgages and buildings,
//! the bank's reserves and the free parking pot, and records every change in
//! an append-only ledger with a bounded undo history.
//!
//! ## Features
//!
//! - **Ledger Engine**: Transfers, purchases, mortgages, building and bankruptcy as total operations that never partially apply.
//! - **Undo**: Up to 20 snapshots of the undoable game slice.
//! - **House Rules**: Free parking jackpot, buy-everything squares and sale cards, and a finite bank reserve.
//! - **Rent Calculation**: Street, railroad, utility and monopoly rules from the property catalog.
//! - **Persistence**: The current game is saved to sled after every change; a separate roster ledger keeps numbered players and a flat payment log.
//!
//! ## Quick Start
//!
//! ```rust
//! use banker::ledger::{Endpoint, GameLedger, GameSettings, PropertyCatalog};
//!
//! let mut ledger = GameLedger::new(PropertyCatalog::standard());
//! let alice = ledger.add_player("Alice", "#ef4444").unwrap();
//! let bob = ledger.add_player("Bob", "#3b82f6").unwrap();
//! ledger.start_game(GameSettings::default()).unwrap();
//!
//! ledger.buy_property(&alice, "boardwalk", None, Endpoint::Bank).unwrap();
//! ledger
//!     .transfer_money(Endpoint::Player(bob), Endpoint::Player(alice.clone()), 50, "Rent")
//!     .unwrap();
//! assert_eq!(ledger.player(&alice).unwrap().cash, 1500 - 400 + 50);
//! ```
//!
//! ## Module Organization
//!
//! - [`ledger`] - Game state, the ledger engine, property catalog and persistence
//! - [`config`] - Configuration management and validation
//! - [`validation`] - Input validation for names, colors, amounts and text
//! - [`logutil`] - Single-line escaping for player-supplied strings in logs

pub mod config;
pub mod ledger;
pub mod logutil;
pub mod validation;
