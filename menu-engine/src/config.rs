//! Configuration for the menu engine

use crate::{evaluator::EvaluatorConfig, pricing::PricingRule, Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Dish catalog file
    pub catalog_path: PathBuf,

    /// Pantry ledger the dishes are evaluated against
    pub ledger: pantry_ledger::Config,

    /// Availability policy
    pub evaluator: EvaluatorConfig,

    /// Near-expiry pricing
    pub pricing: PricingRule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "menu-engine".to_string(),
            catalog_path: PathBuf::from("./data/dishes.json"),
            ledger: pantry_ledger::Config::default(),
            evaluator: EvaluatorConfig::default(),
            pricing: PricingRule::default(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.pricing.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config {
            ledger: pantry_ledger::Config::from_env()?,
            ..Default::default()
        };

        if let Some(path) = env_var("MENU_CATALOG_PATH") {
            config.catalog_path = PathBuf::from(path);
        }

        if let Some(value) = env_var("MENU_TREAT_MISSING_AS_UNAVAILABLE") {
            config.evaluator.treat_missing_as_unavailable =
                parse_flag("MENU_TREAT_MISSING_AS_UNAVAILABLE", &value)?;
        }

        if let Some(value) = env_var("MENU_FAIL_ON_UNKNOWN_INGREDIENT") {
            config.evaluator.fail_on_unknown_ingredient =
                parse_flag("MENU_FAIL_ON_UNKNOWN_INGREDIENT", &value)?;
        }

        if let Some(value) = env_var("MENU_NEAR_EXPIRY_DAYS") {
            config.pricing.near_expiry_days = value.trim().parse().map_err(|_| {
                Error::Config(format!("MENU_NEAR_EXPIRY_DAYS is not a whole number: {value}"))
            })?;
        }

        if let Some(value) = env_var("MENU_DISCOUNT_RATE") {
            config.pricing.discount_rate = Decimal::from_str(value.trim()).map_err(|_| {
                Error::Config(format!("MENU_DISCOUNT_RATE is not a decimal: {value}"))
            })?;
        }

        if let Some(value) = env_var("MENU_MISSING_EXPIRY_DEFAULT") {
            let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                Error::Config(format!(
                    "MENU_MISSING_EXPIRY_DEFAULT is not a YYYY-MM-DD date: {value}"
                ))
            })?;
            config.pricing.missing_expiry_default = Some(date);
        }

        config.pricing.validate()?;
        Ok(config)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{name} is not a boolean: {value}"))),
    }
}
