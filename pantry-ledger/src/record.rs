//! Raw ingredient records as produced by external suppliers
//!
//! Stock files, scale readings and table rows are loosely typed: numbers arrive as JSON
//! numbers or numeric strings and dates as text with assorted placeholders. Records are
//! checked here, once, before anything reaches a [`LedgerSnapshot`](crate::LedgerSnapshot).

use crate::{
    types::{Ingredient, IngredientId},
    Error, Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Text values that legacy stock files use for "no expiry recorded"
const NO_EXPIRY_PLACEHOLDERS: &[&str] = &["", "-", "n/a", "na", "none", "null", "indefinido"];

/// Ingredient record before validation
///
/// Field names follow the English stock format; the Portuguese names written by the
/// kitchen tablets are accepted as aliases. Any other key is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngredientRecord {
    /// Ingredient ID (stock files may leave it to the map key)
    #[serde(default, alias = "ingrediente_id")]
    pub id: Option<IngredientId>,

    /// Display name
    #[serde(default, alias = "nome")]
    pub name: Option<String>,

    /// Measurement unit
    #[serde(default, alias = "unidade")]
    pub unit: Option<String>,

    /// Stock category
    #[serde(default, alias = "categoria")]
    pub category: Option<String>,

    /// Quantity on hand, number or numeric string
    #[serde(default, alias = "quantity", alias = "weight", alias = "peso", alias = "quantidade")]
    pub quantity_on_hand: Value,

    /// Minimum threshold, number or numeric string
    #[serde(default, alias = "minimum", alias = "minimum_stock", alias = "estoque_minimo")]
    pub minimum_threshold: Value,

    /// Expiry date text (`YYYY-MM-DD`)
    #[serde(default, alias = "expiry", alias = "validade")]
    pub expiry_date: Value,

    /// Availability flag
    #[serde(default, alias = "disponivel")]
    pub available: Option<bool>,

    /// On the kitchen scale
    #[serde(default, alias = "ativo")]
    pub active: Option<bool>,
}

impl IngredientRecord {
    /// Validate into an [`Ingredient`]
    ///
    /// `fallback_id` names the record when it carries no `id` of its own (the map key in
    /// a stock file). `default_available` is used when the record has no availability flag.
    pub fn validate(self, fallback_id: &IngredientId, default_available: bool) -> Result<Ingredient> {
        let id = self.id.unwrap_or_else(|| fallback_id.clone());

        let quantity_on_hand = match &self.quantity_on_hand {
            Value::Null => {
                return Err(Error::invalid_record(id.as_str(), "missing quantity_on_hand"))
            }
            value => parse_quantity(value)
                .ok_or_else(|| invalid_number(&id, "quantity_on_hand", value))?,
        };
        if quantity_on_hand < Decimal::ZERO {
            return Err(Error::invalid_record(
                id.as_str(),
                format!("quantity_on_hand must not be negative, got {quantity_on_hand}"),
            ));
        }

        let minimum_threshold = match &self.minimum_threshold {
            Value::Null => Decimal::ZERO,
            value => parse_quantity(value)
                .ok_or_else(|| invalid_number(&id, "minimum_threshold", value))?,
        };
        if minimum_threshold < Decimal::ZERO {
            return Err(Error::invalid_record(
                id.as_str(),
                format!("minimum_threshold must not be negative, got {minimum_threshold}"),
            ));
        }

        let expiry_date = parse_expiry(&self.expiry_date).map_err(|reason| {
            Error::invalid_record(id.as_str(), format!("expiry_date {reason}"))
        })?;

        Ok(Ingredient {
            name: self.name.unwrap_or_else(|| id.to_string()),
            id,
            unit: self.unit,
            category: self.category,
            quantity_on_hand,
            minimum_threshold,
            expiry_date,
            available: self.available.unwrap_or(default_available),
            active: self.active.unwrap_or(false),
        })
    }
}

impl From<Ingredient> for IngredientRecord {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: Some(ingredient.id),
            name: Some(ingredient.name),
            unit: ingredient.unit,
            category: ingredient.category,
            quantity_on_hand: Value::String(ingredient.quantity_on_hand.to_string()),
            minimum_threshold: Value::String(ingredient.minimum_threshold.to_string()),
            expiry_date: ingredient
                .expiry_date
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            available: Some(ingredient.available),
            active: Some(ingredient.active),
        }
    }
}

fn invalid_number(id: &IngredientId, field: &str, value: &Value) -> Error {
    Error::invalid_record(id.as_str(), format!("{field} is not numeric: {value}"))
}

/// Parse a quantity or price given as a JSON number or numeric string.
///
/// Returns `None` for anything else (booleans, arrays, free text). Never defaults to zero.
pub fn parse_quantity(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .ok()
        }
        _ => None,
    }
}

/// Parse an expiry date
///
/// `Ok(None)` for null and the legacy "no expiry" placeholders. A timestamp is cut to its
/// date part.
pub fn parse_expiry(value: &Value) -> std::result::Result<Option<NaiveDate>, String> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(text) => text.trim(),
        other => return Err(format!("is not a date: {other}")),
    };

    if NO_EXPIRY_PLACEHOLDERS.contains(&text.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }

    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("is not a YYYY-MM-DD date: {text:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn record(value: Value) -> IngredientRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_validate_numeric_strings() {
        let ingredient = record(json!({
            "quantity_on_hand": "12.5",
            "minimum_threshold": 2,
            "expiry_date": "2026-05-01"
        }))
        .validate(&IngredientId::new("flour"), true)
        .unwrap();

        assert_eq!(ingredient.id.as_str(), "flour");
        assert_eq!(ingredient.name, "flour");
        assert_eq!(ingredient.quantity_on_hand, dec!(12.5));
        assert_eq!(ingredient.minimum_threshold, dec!(2));
        assert_eq!(
            ingredient.expiry_date,
            NaiveDate::from_ymd_opt(2026, 5, 1)
        );
        assert!(ingredient.available);
    }

    #[test]
    fn test_non_numeric_quantity_rejected() {
        let err = record(json!({ "quantity_on_hand": "lots" }))
            .validate(&IngredientId::new("egg"), true)
            .unwrap_err();

        match err {
            Error::InvalidRecord { ingredient_id, reason } => {
                assert_eq!(ingredient_id, "egg");
                assert!(reason.contains("quantity_on_hand"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_quantity_rejected() {
        let result = record(json!({ "name": "Egg" })).validate(&IngredientId::new("egg"), true);
        assert!(matches!(result, Err(Error::InvalidRecord { .. })));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let result = record(json!({ "quantity_on_hand": -1 }))
            .validate(&IngredientId::new("egg"), true);
        assert!(matches!(result, Err(Error::InvalidRecord { .. })));
    }

    #[test]
    fn test_missing_threshold_defaults_to_zero() {
        let ingredient = record(json!({ "quantity_on_hand": 0 }))
            .validate(&IngredientId::new("egg"), false)
            .unwrap();
        assert_eq!(ingredient.minimum_threshold, Decimal::ZERO);
        assert!(!ingredient.available);
    }

    #[test]
    fn test_expiry_placeholders() {
        assert_eq!(parse_expiry(&json!("indefinido")), Ok(None));
        assert_eq!(parse_expiry(&json!("N/A")), Ok(None));
        assert_eq!(parse_expiry(&json!("")), Ok(None));
        assert_eq!(parse_expiry(&Value::Null), Ok(None));
        assert_eq!(
            parse_expiry(&json!("2026-01-02T00:00:00")),
            Ok(NaiveDate::from_ymd_opt(2026, 1, 2))
        );
        assert!(parse_expiry(&json!("tomorrow")).is_err());
        assert!(parse_expiry(&json!(20260102)).is_err());
    }

    #[test]
    fn test_parse_quantity_rejects_non_numbers() {
        assert_eq!(parse_quantity(&json!(true)), None);
        assert_eq!(parse_quantity(&json!("  ")), None);
        assert_eq!(parse_quantity(&json!([1])), None);
        assert_eq!(parse_quantity(&json!(" 3 ")), Some(dec!(3)));
        assert_eq!(parse_quantity(&json!(0.25)), Some(dec!(0.25)));
    }

    #[test]
    fn test_portuguese_keys_accepted() {
        let ingredient = record(json!({
            "nome": "Farinha",
            "unidade": "g",
            "categoria": "secos",
            "peso": "750",
            "estoque_minimo": 200,
            "validade": "2026-12-01",
            "disponivel": false,
            "ativo": true
        }))
        .validate(&IngredientId::new("farinha"), true)
        .unwrap();

        assert_eq!(ingredient.name, "Farinha");
        assert_eq!(ingredient.unit.as_deref(), Some("g"));
        assert_eq!(ingredient.category.as_deref(), Some("secos"));
        assert_eq!(ingredient.quantity_on_hand, dec!(750));
        assert_eq!(ingredient.minimum_threshold, dec!(200));
        assert_eq!(ingredient.expiry_date, NaiveDate::from_ymd_opt(2026, 12, 1));
        assert!(!ingredient.available);
        assert!(ingredient.active);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = serde_json::from_value::<IngredientRecord>(json!({
            "quantity_on_hand": 3,
            "quantiy_on_hand_typo": 4
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_roundtrips_through_ingredient() {
        let original = Ingredient::new("milk", dec!(1.5))
            .with_minimum(dec!(0.5))
            .with_expiry(NaiveDate::from_ymd_opt(2026, 2, 3).unwrap());
        let restored = IngredientRecord::from(original.clone())
            .validate(&IngredientId::new("ignored"), false)
            .unwrap();
        assert_eq!(restored, original);
    }
}
