//! Whole-catalog evaluation
//!
//! Dishes are independent of each other: every catalog entry gets its own outcome and
//! one bad dish never stops the rest. Only a failing ledger supplier stops the batch,
//! since every dish would be evaluated against the wrong stock.

use crate::{
    catalog::DishCatalog,
    evaluator::RecipeEvaluator,
    metrics::Metrics,
    types::{DishId, EvaluationResult},
    Error, Result,
};
use chrono::NaiveDate;
use pantry_ledger::LedgerReader;
use std::fmt::Display;
use std::time::Instant;

/// Outcome for one catalog entry
#[derive(Debug)]
pub struct DishOutcome {
    /// Dish ID
    pub dish_id: DishId,

    /// Evaluation result or the reason there is none
    pub result: Result<EvaluationResult>,
}

/// Outcomes for a whole catalog, in catalog order
#[derive(Debug)]
pub struct CatalogReport {
    /// Date prices were computed for
    pub evaluated_on: NaiveDate,

    /// Per-dish outcomes
    pub outcomes: Vec<DishOutcome>,
}

impl CatalogReport {
    /// Successful evaluations
    pub fn results(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Dishes that could not be evaluated
    pub fn failures(&self) -> impl Iterator<Item = (&DishId, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.dish_id, e)))
    }

    /// Result for one dish
    pub fn get(&self, dish_id: &DishId) -> Option<&Result<EvaluationResult>> {
        self.outcomes
            .iter()
            .find(|o| &o.dish_id == dish_id)
            .map(|o| &o.result)
    }

    /// Dishes that can be prepared
    pub fn available_count(&self) -> usize {
        self.results().filter(|r| r.available).count()
    }

    /// Dishes that cannot be prepared
    pub fn unavailable_count(&self) -> usize {
        self.results().filter(|r| !r.available).count()
    }

    /// Dishes sold at the discounted price
    pub fn discounted_count(&self) -> usize {
        self.results().filter(|r| r.is_discounted()).count()
    }

    /// Dishes with no result
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Evaluate every catalog entry against one ledger snapshot
pub fn evaluate_catalog<L: LedgerReader + ?Sized>(
    evaluator: &RecipeEvaluator,
    catalog: &DishCatalog,
    ledger: &L,
    today: NaiveDate,
) -> CatalogReport {
    let outcomes = catalog
        .entries()
        .iter()
        .map(|entry| {
            let result = match &entry.dish {
                Ok(dish) => evaluator.evaluate(dish, ledger, today),
                Err(rejection) => Err(carry_rejection(&entry.id, rejection)),
            };
            if let Err(e) = &result {
                tracing::warn!(dish_id = %entry.id, "Dish not evaluated: {}", e);
            }
            DishOutcome {
                dish_id: entry.id.clone(),
                result,
            }
        })
        .collect();

    CatalogReport {
        evaluated_on: today,
        outcomes,
    }
}

/// Fetch the ledger from `supplier`, then evaluate the catalog
///
/// A supplier failure is [`Error::LedgerUnavailable`]; the catalog is never evaluated
/// against a stand-in empty ledger.
pub fn evaluate_with_supplier<F, L, E>(
    evaluator: &RecipeEvaluator,
    catalog: &DishCatalog,
    supplier: F,
    today: NaiveDate,
) -> Result<CatalogReport>
where
    F: FnOnce() -> std::result::Result<L, E>,
    L: LedgerReader,
    E: Display,
{
    let ledger = supplier().map_err(|e| Error::LedgerUnavailable(e.to_string()))?;
    Ok(evaluate_catalog(evaluator, catalog, &ledger, today))
}

/// [`evaluate_catalog`] with outcomes and timing recorded in `metrics`
pub fn evaluate_catalog_observed<L: LedgerReader + ?Sized>(
    evaluator: &RecipeEvaluator,
    catalog: &DishCatalog,
    ledger: &L,
    today: NaiveDate,
    metrics: &Metrics,
) -> CatalogReport {
    let started = Instant::now();
    let report = evaluate_catalog(evaluator, catalog, ledger, today);
    metrics.record_catalog_duration(started.elapsed().as_secs_f64());
    metrics.record_report(&report);
    report
}

/// Rebuild a catalog rejection as this dish's outcome
fn carry_rejection(dish_id: &DishId, rejection: &Error) -> Error {
    match rejection {
        Error::InvalidDishData { dish_id, reason } => Error::InvalidDishData {
            dish_id: dish_id.clone(),
            reason: reason.clone(),
        },
        other => Error::invalid_dish(dish_id, other.to_string()),
    }
}
