//! Error types for the pantry ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// A supplied ingredient record failed boundary validation
    #[error("Invalid ingredient record '{ingredient_id}': {reason}")]
    InvalidRecord {
        /// Ingredient the record belongs to
        ingredient_id: String,
        /// What was wrong with it
        reason: String,
    },

    /// Ingredient not found
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(String),

    /// Storage error (stock files)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an [`Error::InvalidRecord`]
    pub fn invalid_record(ingredient_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidRecord {
            ingredient_id: ingredient_id.into(),
            reason: reason.into(),
        }
    }
}
