//! Pantry Ledger
//!
//! Ingredient stock state for the kitchen: what is on hand, how much must stay on hand,
//! when it expires and whether staff have switched it off.
//!
//! # Architecture
//!
//! - **Boundary validation**: supplier records are checked once, in [`record`]
//! - **Immutable snapshots**: evaluators read a [`LedgerSnapshot`] through [`LedgerReader`]
//! - **Single Writer**: one actor task owns the mutable table for management flows
//! - **Journal**: every write is appended to an event log next to the stock file
//!
//! # Invariants
//!
//! - `quantity_on_hand >= 0` and `minimum_threshold >= 0` for every stored ingredient
//! - At most one ingredient is active (on the kitchen scale) at a time
//! - A write is durable before it is visible to readers

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod record;
pub mod reader;
pub mod snapshot;
pub mod storage;
pub mod ledger;
pub mod error;
pub mod actor;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::{Ingredient, IngredientId, StockEvent, StockEventKind};
pub use record::IngredientRecord;
pub use reader::LedgerReader;
pub use snapshot::LedgerSnapshot;
pub use storage::Storage;
pub use actor::StockHandle;
pub use ledger::Ledger;
pub use config::Config;
