//! Menu Engine
//!
//! Decides which dishes the kitchen can prepare right now and what each one costs today,
//! reading stock from a [`pantry_ledger`] snapshot.
//!
//! # Architecture
//!
//! - **Catalog boundary**: dish records are validated one by one in [`catalog`], which
//!   also holds the dish management writes
//! - **Pure evaluation**: [`RecipeEvaluator`] holds configuration only and reads stock
//!   through [`pantry_ledger::LedgerReader`]
//! - **Batch isolation**: one bad dish never hides the rest of the menu
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use menu_engine::{Dish, RecipeEvaluator};
//! use pantry_ledger::{Ingredient, LedgerSnapshot};
//! use rust_decimal::Decimal;
//!
//! let ledger = LedgerSnapshot::from_ingredients(vec![
//!     Ingredient::new("flour", Decimal::new(5, 0)),
//!     Ingredient::new("egg", Decimal::new(6, 0)),
//! ]).unwrap();
//! let dish = Dish::new("pancakes", ["flour", "egg"], Decimal::new(1000, 2));
//! let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
//!
//! let result = RecipeEvaluator::default().evaluate(&dish, &ledger, today).unwrap();
//! assert!(result.available);
//! assert_eq!(result.price, Decimal::new(1000, 2));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;
pub mod pricing;
pub mod evaluator;
pub mod catalog;
pub mod batch;
pub mod menu;
pub mod metrics;
pub mod config;

pub use error::{Error, Result};
pub use types::*;
pub use pricing::PricingRule;
pub use evaluator::{EvaluatorConfig, RecipeEvaluator};
pub use catalog::{CatalogEntry, CatalogShape, DishCatalog, DishRecord, RecipeLine, RecipeMapping};
pub use batch::{
    evaluate_catalog, evaluate_catalog_observed, evaluate_with_supplier, CatalogReport,
    DishOutcome,
};
pub use menu::{Menu, MenuItem};
pub use metrics::Metrics;
pub use config::Config;
