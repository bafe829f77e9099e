//! Error types for the menu engine

use thiserror::Error;

/// Result type for menu engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Menu engine errors
#[derive(Debug, Error)]
pub enum Error {
    /// Dish record has a non-numeric or out-of-range price or quantity
    #[error("Invalid dish data for '{dish_id}': {reason}")]
    InvalidDishData {
        /// Dish the data belongs to
        dish_id: String,
        /// What was wrong with it
        reason: String,
    },

    /// No catalog entry with this id
    #[error("Dish not found: {0}")]
    DishNotFound(String),

    /// Ledger supplier failed; nothing was evaluated
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// Dish references an ingredient the ledger does not know, under the failing policy
    #[error("Dish '{dish_id}' references unknown ingredient '{ingredient_id}'")]
    UnknownIngredient {
        /// Dish being evaluated
        dish_id: String,
        /// Ingredient missing from the ledger
        ingredient_id: String,
    },

    /// Catalog file could not be read or parsed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] pantry_ledger::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an [`Error::InvalidDishData`]
    pub fn invalid_dish(dish_id: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidDishData {
            dish_id: dish_id.to_string(),
            reason: reason.into(),
        }
    }
}
