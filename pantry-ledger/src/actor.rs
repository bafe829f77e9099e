//! Actor-based concurrency for stock management writes
//!
//! Kitchen scales, availability toggles and management forms all write the same
//! ingredient table. A single Tokio task owns that table; everything else talks to it
//! through a cloneable [`StockHandle`].
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │   Scale readings / kitchen forms / menu jobs  │
//! └──────────────────────┬────────────────────────┘
//!                        │ StockHandle (Clone)
//!                        ▼ mpsc::channel (bounded)
//! ┌───────────────────────────────────────────────┐
//! │             StockActor (single task)          │
//! │   table: HashMap<IngredientId, Ingredient>    │
//! │   write → Storage::save_ingredients()         │
//! │         → Storage::append_event()             │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! A write is persisted before it becomes visible; if persistence fails the in-memory
//! table is left untouched and the error goes back to the caller.

use crate::snapshot::LedgerSnapshot;
use crate::types::{Ingredient, IngredientId, StockEvent, StockEventKind};
use crate::{Error, Result, Storage};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Message sent to the stock actor
#[derive(Debug)]
pub enum StockMessage {
    /// Scale or sensor reading
    RecordMeasurement {
        /// Ingredient on the scale
        id: IngredientId,
        /// Measured quantity, replaces the stored one
        quantity: Decimal,
        /// Reply channel
        response: oneshot::Sender<Result<Ingredient>>,
    },

    /// Delivery added on top of the stored quantity
    AddStock {
        /// Ingredient being restocked
        id: IngredientId,
        /// Quantity delivered, must be positive
        quantity: Decimal,
        /// Expiry of the delivered batch
        expiry_date: Option<NaiveDate>,
        /// Reply channel
        response: oneshot::Sender<Result<Ingredient>>,
    },

    /// Flip the availability flag
    SetAvailability {
        /// Ingredient to toggle
        id: IngredientId,
        /// New flag value
        available: bool,
        /// Reply channel
        response: oneshot::Sender<Result<Ingredient>>,
    },

    /// Make one ingredient the active one
    Activate {
        /// Ingredient put on the scale
        id: IngredientId,
        /// Reply channel
        response: oneshot::Sender<Result<Ingredient>>,
    },

    /// Create an ingredient
    Register {
        /// Ingredient to add
        ingredient: Ingredient,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Delete an ingredient
    Remove {
        /// Ingredient to delete
        id: IngredientId,
        /// Reply channel, carries the removed ingredient
        response: oneshot::Sender<Result<Ingredient>>,
    },

    /// Look up one ingredient
    Get {
        /// Ingredient to look up
        id: IngredientId,
        /// Reply channel
        response: oneshot::Sender<Option<Ingredient>>,
    },

    /// Ingredient currently on the scale
    GetActive {
        /// Reply channel
        response: oneshot::Sender<Option<Ingredient>>,
    },

    /// Immutable copy of the table
    Snapshot {
        /// Reply channel
        response: oneshot::Sender<Arc<LedgerSnapshot>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns the ingredient table
#[derive(Debug)]
pub struct StockActor {
    /// Storage backend
    storage: Arc<Storage>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<StockMessage>,

    /// Current ingredient table
    table: HashMap<IngredientId, Ingredient>,

    /// Snapshot of `table`, dropped on every write
    cached_snapshot: Option<Arc<LedgerSnapshot>>,
}

impl StockActor {
    /// Create new actor
    pub fn new(
        storage: Arc<Storage>,
        mailbox: mpsc::Receiver<StockMessage>,
        initial: LedgerSnapshot,
    ) -> Self {
        Self {
            storage,
            mailbox,
            table: initial.into_inner(),
            cached_snapshot: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if let StockMessage::Shutdown = msg {
                tracing::debug!("Stock actor shutting down");
                break;
            }
            self.handle_message(msg);
        }
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: StockMessage) {
        match msg {
            StockMessage::RecordMeasurement {
                id,
                quantity,
                response,
            } => {
                let _ = response.send(self.record_measurement(id, quantity));
            }

            StockMessage::AddStock {
                id,
                quantity,
                expiry_date,
                response,
            } => {
                let _ = response.send(self.add_stock(id, quantity, expiry_date));
            }

            StockMessage::SetAvailability {
                id,
                available,
                response,
            } => {
                let _ = response.send(self.set_availability(id, available));
            }

            StockMessage::Activate { id, response } => {
                let _ = response.send(self.activate(id));
            }

            StockMessage::Register {
                ingredient,
                response,
            } => {
                let _ = response.send(self.register(ingredient));
            }

            StockMessage::Remove { id, response } => {
                let _ = response.send(self.remove(id));
            }

            StockMessage::Get { id, response } => {
                let _ = response.send(self.table.get(&id).cloned());
            }

            StockMessage::GetActive { response } => {
                let active = self.table.values().find(|i| i.active).cloned();
                let _ = response.send(active);
            }

            StockMessage::Snapshot { response } => {
                let _ = response.send(self.snapshot());
            }

            StockMessage::Shutdown => {
                // Handled in run loop
            }
        }
    }

    fn record_measurement(&mut self, id: IngredientId, quantity: Decimal) -> Result<Ingredient> {
        if quantity < Decimal::ZERO {
            return Err(Error::invalid_record(
                id.as_str(),
                format!("measured quantity must not be negative, got {quantity}"),
            ));
        }

        let mut next = self.table.clone();
        let ingredient = next.entry(id.clone()).or_insert_with(|| {
            tracing::info!(ingredient_id = %id, "Registering unknown ingredient from scale reading");
            Ingredient::new(id.clone(), Decimal::ZERO)
        });
        ingredient.quantity_on_hand = quantity;
        let updated = ingredient.clone();

        self.commit(next, StockEvent::new(id, StockEventKind::QuantityMeasured { quantity }))?;
        Ok(updated)
    }

    fn add_stock(
        &mut self,
        id: IngredientId,
        quantity: Decimal,
        expiry_date: Option<NaiveDate>,
    ) -> Result<Ingredient> {
        if quantity <= Decimal::ZERO {
            return Err(Error::invalid_record(
                id.as_str(),
                format!("added quantity must be positive, got {quantity}"),
            ));
        }

        let mut next = self.table.clone();
        let ingredient = next
            .get_mut(&id)
            .ok_or_else(|| Error::IngredientNotFound(id.to_string()))?;
        ingredient.quantity_on_hand += quantity;
        // The earliest batch decides the expiry of the pooled stock
        ingredient.expiry_date = match (ingredient.expiry_date, expiry_date) {
            (Some(current), Some(delivered)) => Some(current.min(delivered)),
            (current, delivered) => current.or(delivered),
        };
        let updated = ingredient.clone();

        self.commit(
            next,
            StockEvent::new(id, StockEventKind::StockAdded { quantity, expiry_date }),
        )?;
        Ok(updated)
    }

    fn set_availability(&mut self, id: IngredientId, available: bool) -> Result<Ingredient> {
        let mut next = self.table.clone();
        let ingredient = next
            .get_mut(&id)
            .ok_or_else(|| Error::IngredientNotFound(id.to_string()))?;
        ingredient.available = available;
        let updated = ingredient.clone();

        self.commit(next, StockEvent::new(id, StockEventKind::AvailabilityChanged { available }))?;
        Ok(updated)
    }

    fn activate(&mut self, id: IngredientId) -> Result<Ingredient> {
        if !self.table.contains_key(&id) {
            return Err(Error::IngredientNotFound(id.to_string()));
        }

        let mut next = self.table.clone();
        for ingredient in next.values_mut() {
            ingredient.active = ingredient.id == id;
        }
        let updated = next[&id].clone();

        self.commit(next, StockEvent::new(id, StockEventKind::Activated))?;
        Ok(updated)
    }

    fn register(&mut self, ingredient: Ingredient) -> Result<()> {
        if self.table.contains_key(&ingredient.id) {
            return Err(Error::invalid_record(
                ingredient.id.as_str(),
                "ingredient already registered",
            ));
        }
        ingredient.validate()?;

        let id = ingredient.id.clone();
        let mut next = self.table.clone();
        if ingredient.active {
            // Only one ingredient sits on the scale
            for other in next.values_mut() {
                other.active = false;
            }
        }
        next.insert(id.clone(), ingredient);
        self.commit(next, StockEvent::new(id, StockEventKind::Registered))
    }

    fn remove(&mut self, id: IngredientId) -> Result<Ingredient> {
        let mut next = self.table.clone();
        let removed = next
            .remove(&id)
            .ok_or_else(|| Error::IngredientNotFound(id.to_string()))?;

        self.commit(next, StockEvent::new(id, StockEventKind::Removed))?;
        Ok(removed)
    }

    /// Persist `next` and the journal entry, then swap it in
    ///
    /// If the journal append fails the previous table is written back, so the table file
    /// and the journal stay in step with memory.
    fn commit(&mut self, next: HashMap<IngredientId, Ingredient>, event: StockEvent) -> Result<()> {
        self.storage.save_ingredients(next.values())?;
        if let Err(e) = self.storage.append_event(&event) {
            tracing::error!("Failed to journal stock event {}: {}", event.event_id, e);
            if let Err(restore) = self.storage.save_ingredients(self.table.values()) {
                tracing::error!("Failed to restore stock table after journal failure: {}", restore);
            }
            return Err(e);
        }

        self.table = next;
        self.cached_snapshot = None;
        Ok(())
    }

    fn snapshot(&mut self) -> Arc<LedgerSnapshot> {
        let table = &self.table;
        self.cached_snapshot
            .get_or_insert_with(|| {
                Arc::new(LedgerSnapshot::from_validated(table.values().cloned()))
            })
            .clone()
    }
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct StockHandle {
    sender: mpsc::Sender<StockMessage>,
}

impl StockHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<StockMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> StockMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Record a scale reading
    pub async fn record_measurement(
        &self,
        id: IngredientId,
        quantity: Decimal,
    ) -> Result<Ingredient> {
        self.request(|response| StockMessage::RecordMeasurement {
            id,
            quantity,
            response,
        })
        .await?
    }

    /// Book a delivery on top of the stored quantity
    ///
    /// The ingredient must exist. Its expiry becomes the earlier of the stored date and
    /// `expiry_date`.
    pub async fn add_stock(
        &self,
        id: IngredientId,
        quantity: Decimal,
        expiry_date: Option<NaiveDate>,
    ) -> Result<Ingredient> {
        self.request(|response| StockMessage::AddStock {
            id,
            quantity,
            expiry_date,
            response,
        })
        .await?
    }

    /// Set the availability flag
    pub async fn set_availability(&self, id: IngredientId, available: bool) -> Result<Ingredient> {
        self.request(|response| StockMessage::SetAvailability {
            id,
            available,
            response,
        })
        .await?
    }

    /// Make `id` the only active ingredient
    pub async fn activate(&self, id: IngredientId) -> Result<Ingredient> {
        self.request(|response| StockMessage::Activate { id, response })
            .await?
    }

    /// Register a new ingredient
    pub async fn register(&self, ingredient: Ingredient) -> Result<()> {
        self.request(|response| StockMessage::Register {
            ingredient,
            response,
        })
        .await?
    }

    /// Remove an ingredient
    pub async fn remove(&self, id: IngredientId) -> Result<Ingredient> {
        self.request(|response| StockMessage::Remove { id, response })
            .await?
    }

    /// Look up an ingredient
    pub async fn get(&self, id: IngredientId) -> Result<Option<Ingredient>> {
        self.request(|response| StockMessage::Get { id, response })
            .await
    }

    /// Ingredient currently on the scale
    pub async fn active(&self) -> Result<Option<Ingredient>> {
        self.request(|response| StockMessage::GetActive { response })
            .await
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> Result<Arc<LedgerSnapshot>> {
        self.request(|response| StockMessage::Snapshot { response })
            .await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(StockMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the stock actor
pub fn spawn_stock_actor(
    storage: Arc<Storage>,
    initial: LedgerSnapshot,
    mailbox_capacity: usize,
) -> StockHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
    let actor = StockActor::new(storage, rx, initial);

    tokio::spawn(async move {
        actor.run().await;
    });

    StockHandle::new(tx)
}
