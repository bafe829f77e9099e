//! Storage layer using JSON files
//!
//! # Files
//!
//! - `stock.json` - Ingredient table keyed by ingredient id (pretty-printed)
//! - `stock_events.jsonl` - Append-only journal of stock writes, one event per line

use crate::{
    error::{Error, Result},
    record::IngredientRecord,
    snapshot::LedgerSnapshot,
    types::{Ingredient, IngredientId, StockEvent},
    Config,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Ingredient table file name
const STOCK_FILE: &str = "stock.json";
/// Event journal file name
const EVENTS_FILE: &str = "stock_events.jsonl";

/// File-backed stock storage
#[derive(Debug)]
pub struct Storage {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl Storage {
    /// Open (and create if needed) the data directory
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;
        fs::create_dir_all(path).map_err(|e| {
            Error::Storage(format!("Failed to create data dir {}: {}", path.display(), e))
        })?;

        tracing::info!("Opened stock storage at {:?}", path);

        Ok(Self {
            data_dir: path.clone(),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the ingredient table
    pub fn stock_path(&self) -> PathBuf {
        self.data_dir.join(STOCK_FILE)
    }

    /// Path of the event journal
    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join(EVENTS_FILE)
    }

    /// Load raw ingredient records
    ///
    /// A missing file is an empty ledger. A file that exists but cannot be read or parsed
    /// is an error.
    pub fn load_records(&self) -> Result<Vec<(IngredientId, IngredientRecord)>> {
        let path = self.stock_path();
        let Some(content) = read_if_exists(&path)? else {
            tracing::info!("No stock file at {:?}, starting with an empty ledger", path);
            return Ok(Vec::new());
        };

        let records: BTreeMap<IngredientId, IngredientRecord> = serde_json::from_str(&content)?;
        tracing::debug!("Loaded {} ingredient records from {:?}", records.len(), path);
        Ok(records.into_iter().collect())
    }

    /// Load and validate the ingredient table
    pub fn load_snapshot(&self, default_available: bool) -> Result<LedgerSnapshot> {
        LedgerSnapshot::from_records(self.load_records()?, default_available)
    }

    /// Rewrite the ingredient table
    ///
    /// Written to a temporary file first and renamed into place.
    pub fn save_ingredients<'a>(
        &self,
        ingredients: impl IntoIterator<Item = &'a Ingredient>,
    ) -> Result<()> {
        let table: BTreeMap<&IngredientId, &Ingredient> = ingredients
            .into_iter()
            .map(|ingredient| (&ingredient.id, ingredient))
            .collect();
        let content = serde_json::to_string_pretty(&table)?;

        let _guard = self.write_lock.lock();
        let path = self.stock_path();
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| {
            Error::Storage(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            Error::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        tracing::debug!("Saved {} ingredients to {:?}", table.len(), path);
        Ok(())
    }

    /// Append an event to the journal
    pub fn append_event(&self, event: &StockEvent) -> Result<()> {
        let line = serde_json::to_string(event)?;

        let _guard = self.write_lock.lock();
        let path = self.events_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Read the whole journal in write order
    pub fn load_events(&self) -> Result<Vec<StockEvent>> {
        let path = self.events_path();
        let Some(content) = read_if_exists(&path)? else {
            return Ok(Vec::new());
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| {
                    Error::Storage(format!("{} line {}: {}", path.display(), index + 1, e))
                })
            })
            .collect()
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Storage(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}
