//! Core types for the pantry ledger
//!
//! All quantities use `Decimal` so stock thresholds compare exactly; expiry is a
//! calendar date with no time-of-day component.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use crate::record::IngredientRecord;
use std::fmt;
use uuid::Uuid;

/// Ingredient identifier
///
/// Stock files key ingredients by text while table-backed suppliers use integer keys;
/// both deserialize to the same identifier, so `7` and `"7"` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IngredientId(String);

impl IngredientId {
    /// Create new ingredient ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IngredientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for IngredientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for IngredientId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for IngredientId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_key(deserializer).map(Self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeyText {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

/// Deserialize a record key given either as a string or as an integer.
///
/// Shared by every identifier newtype that crosses the supplier boundary.
pub fn deserialize_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match KeyText::deserialize(deserializer)? {
        KeyText::Text(text) => text,
        KeyText::Signed(n) => n.to_string(),
        KeyText::Unsigned(n) => n.to_string(),
    })
}

/// Validated ingredient state
///
/// Deserialization goes through [`IngredientRecord`], so a decoded ingredient has already
/// passed the boundary checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IngredientRecord")]
pub struct Ingredient {
    /// Ingredient ID
    pub id: IngredientId,

    /// Display name
    pub name: String,

    /// Measurement unit ("g", "ml", "un")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Stock category ("dairy", "produce")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Quantity currently on hand (never negative)
    pub quantity_on_hand: Decimal,

    /// Quantity below which the ingredient cannot be used
    pub minimum_threshold: Decimal,

    /// Expiry date, if known
    pub expiry_date: Option<NaiveDate>,

    /// Availability flag set by kitchen staff
    pub available: bool,

    /// Currently on the kitchen scale
    pub active: bool,
}

impl TryFrom<IngredientRecord> for Ingredient {
    type Error = crate::Error;

    fn try_from(record: IngredientRecord) -> crate::Result<Self> {
        let id = record
            .id
            .clone()
            .ok_or_else(|| crate::Error::invalid_record("?", "missing id"))?;
        record.validate(&id, true)
    }
}

impl Ingredient {
    /// Create an available ingredient with no threshold and no expiry
    pub fn new(id: impl Into<IngredientId>, quantity_on_hand: Decimal) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            unit: None,
            category: None,
            quantity_on_hand,
            minimum_threshold: Decimal::ZERO,
            expiry_date: None,
            available: true,
            active: false,
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set minimum threshold
    pub fn with_minimum(mut self, minimum_threshold: Decimal) -> Self {
        self.minimum_threshold = minimum_threshold;
        self
    }

    /// Set expiry date
    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// Set availability flag
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Check the stored quantities are usable
    pub fn validate(&self) -> crate::Result<()> {
        if self.quantity_on_hand < Decimal::ZERO {
            return Err(crate::Error::invalid_record(
                self.id.as_str(),
                format!("quantity_on_hand must not be negative, got {}", self.quantity_on_hand),
            ));
        }
        if self.minimum_threshold < Decimal::ZERO {
            return Err(crate::Error::invalid_record(
                self.id.as_str(),
                format!("minimum_threshold must not be negative, got {}", self.minimum_threshold),
            ));
        }
        Ok(())
    }

    /// Quantity on hand is under the minimum threshold
    pub fn is_below_threshold(&self) -> bool {
        self.quantity_on_hand < self.minimum_threshold
    }

    /// Calendar days from `today` until expiry (negative once expired)
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date
            .map(|expiry| expiry.signed_duration_since(today).num_days())
    }
}

/// Journal entry for a stock management write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEvent {
    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Ingredient the write applied to
    pub ingredient_id: IngredientId,

    /// What changed
    pub kind: StockEventKind,

    /// When the write was applied
    pub recorded_at: DateTime<Utc>,
}

impl StockEvent {
    /// Create a new event stamped now
    pub fn new(ingredient_id: IngredientId, kind: StockEventKind) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            ingredient_id,
            kind,
            recorded_at: Utc::now(),
        }
    }
}

/// Kind of stock write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StockEventKind {
    /// Scale or sensor reading
    QuantityMeasured {
        /// Measured quantity
        quantity: Decimal,
    },
    /// Delivery booked on top of the current quantity
    StockAdded {
        /// Quantity added
        quantity: Decimal,
        /// Expiry of the delivered batch
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expiry_date: Option<NaiveDate>,
    },
    /// Availability flag flipped
    AvailabilityChanged {
        /// New flag value
        available: bool,
    },
    /// Ingredient placed on the kitchen scale
    Activated,
    /// Ingredient created by a management form
    Registered,
    /// Ingredient deleted by a management form
    Removed,
}
