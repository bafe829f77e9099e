//! Configuration for the pantry ledger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `stock.json` and the event journal
    pub data_dir: PathBuf,

    /// Service name
    pub service_name: String,

    /// Stock actor mailbox capacity
    pub mailbox_capacity: usize,

    /// Availability assumed for records that carry no flag
    pub default_available: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/pantry"),
            service_name: "pantry-ledger".to_string(),
            mailbox_capacity: 256,
            default_available: true,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(data_dir) = std::env::var("PANTRY_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(capacity) = std::env::var("PANTRY_MAILBOX_CAPACITY") {
            config.mailbox_capacity = capacity.parse().map_err(|_| {
                crate::Error::Config(format!("PANTRY_MAILBOX_CAPACITY is not a number: {capacity}"))
            })?;
        }

        Ok(config)
    }
}
