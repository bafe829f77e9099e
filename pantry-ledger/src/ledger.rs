//! Main ledger orchestration layer
//!
//! Ties storage and the stock actor together into one handle for management flows.
//!
//! # Example
//!
//! ```no_run
//! use pantry_ledger::{Config, IngredientId, Ledger};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> pantry_ledger::Result<()> {
//!     let ledger = Ledger::open(Config::default()).await?;
//!
//!     ledger
//!         .stock()
//!         .record_measurement(IngredientId::new("flour"), Decimal::new(1250, 0))
//!         .await?;
//!     let snapshot = ledger.snapshot().await?;
//!     println!("{} ingredients tracked", snapshot.len());
//!
//!     ledger.shutdown().await
//! }
//! ```

use crate::{
    actor::{spawn_stock_actor, StockHandle},
    snapshot::LedgerSnapshot,
    types::StockEvent,
    Config, Result, Storage,
};
use std::sync::Arc;

/// Main ledger interface
#[derive(Debug)]
pub struct Ledger {
    /// Actor handle for writes and consistent reads
    handle: StockHandle,

    /// Direct storage access (journal reads)
    storage: Arc<Storage>,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open ledger with configuration
    ///
    /// Fails if the stock file exists but does not validate; a broken ledger is never
    /// replaced by an empty one.
    pub async fn open(config: Config) -> Result<Self> {
        let storage = Arc::new(Storage::open(&config)?);
        let initial = storage.load_snapshot(config.default_available)?;

        tracing::info!(
            service = %config.service_name,
            ingredients = initial.len(),
            "Pantry ledger opened"
        );

        let handle = spawn_stock_actor(storage.clone(), initial, config.mailbox_capacity);

        Ok(Self {
            handle,
            storage,
            config,
        })
    }

    /// Handle for stock management writes
    pub fn stock(&self) -> &StockHandle {
        &self.handle
    }

    /// Current read-only snapshot
    pub async fn snapshot(&self) -> Result<Arc<LedgerSnapshot>> {
        self.handle.snapshot().await
    }

    /// Full journal of stock writes
    pub fn history(&self) -> Result<Vec<StockEvent>> {
        self.storage.load_events()
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shutdown the stock actor
    pub async fn shutdown(&self) -> Result<()> {
        self.handle.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::LedgerReader;
    use crate::types::{IngredientId, StockEventKind};
    use crate::Error;
    use rust_decimal_macros::dec;

    async fn create_test_ledger(dir: &tempfile::TempDir) -> Ledger {
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        Ledger::open(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = create_test_ledger(&dir).await;

        assert!(ledger.snapshot().await.unwrap().is_empty());
        assert!(ledger.history().unwrap().is_empty());

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_reopen_sees_writes() {
        let dir = tempfile::tempdir().unwrap();

        let ledger = create_test_ledger(&dir).await;
        ledger
            .stock()
            .record_measurement(IngredientId::new("flour"), dec!(750))
            .await
            .unwrap();
        ledger.shutdown().await.unwrap();

        let reopened = create_test_ledger(&dir).await;
        let snapshot = reopened.snapshot().await.unwrap();
        assert_eq!(
            snapshot.get(&IngredientId::new("flour")).unwrap().quantity_on_hand,
            dec!(750)
        );

        let history = reopened.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(
            history[0].kind,
            StockEventKind::QuantityMeasured { quantity: dec!(750) }
        );

        reopened.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_stock_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("stock.json"),
            r#"{ "egg": { "quantity_on_hand": "a dozen" } }"#,
        )
        .unwrap();

        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let result = Ledger::open(config).await;
        assert!(matches!(result, Err(Error::InvalidRecord { .. })));
    }
}
