//! Recipe evaluator
//!
//! Decides whether a dish can be prepared from the current ledger snapshot and what it
//! should cost today.
//!
//! # Algorithm
//!
//! 1. A withdrawn dish is unavailable and the ledger is not read.
//! 2. Scan the required ingredients in recipe order. The first one that is absent (under
//!    the unavailable policy), switched off, under its minimum threshold, or under the
//!    per-portion requirement makes the dish unavailable, and the scan stops there.
//! 3. Scan the whole recipe, optional ingredients included, for the first near-expiry
//!    ingredient. That or a staff promotion discounts the base price once.
//! 4. Round the price half-up to cents.
//!
//! The evaluator holds only configuration, so evaluating the same dish against the same
//! snapshot always gives the same result.

use crate::{
    pricing::PricingRule,
    types::{Dish, EvaluationResult, Unavailability, UnavailableReason},
    Error, Result,
};
use chrono::NaiveDate;
use pantry_ledger::LedgerReader;
use serde::{Deserialize, Serialize};

/// What to do with ingredients the ledger does not know
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Absent ingredient makes the dish unavailable; otherwise it is skipped
    pub treat_missing_as_unavailable: bool,

    /// Absent ingredient fails the evaluation with [`Error::UnknownIngredient`]
    pub fail_on_unknown_ingredient: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            treat_missing_as_unavailable: true,
            fail_on_unknown_ingredient: false,
        }
    }
}

/// Recipe evaluator
#[derive(Debug, Clone, Default)]
pub struct RecipeEvaluator {
    config: EvaluatorConfig,
    pricing: PricingRule,
}

impl RecipeEvaluator {
    /// Create new evaluator
    ///
    /// Fails with [`Error::Config`] when the pricing rule is out of range.
    pub fn new(config: EvaluatorConfig, pricing: PricingRule) -> Result<Self> {
        pricing.validate()?;
        Ok(Self { config, pricing })
    }

    /// Availability policy
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Pricing rule
    pub fn pricing(&self) -> &PricingRule {
        &self.pricing
    }

    /// Evaluate `dish` against `ledger` as of `today`
    pub fn evaluate<L: LedgerReader + ?Sized>(
        &self,
        dish: &Dish,
        ledger: &L,
        today: NaiveDate,
    ) -> Result<EvaluationResult> {
        dish.validate()?;

        let withdrawn = dish.is_withdrawn();
        let (unavailable_because, discounted_by) = if withdrawn {
            (None, None)
        } else {
            (
                self.check_availability(dish, ledger)?,
                self.pricing.near_expiry_trigger(dish, ledger, today),
            )
        };
        let price = self
            .pricing
            .apply(dish.base_price, discounted_by.is_some() || dish.promotion);

        let result = EvaluationResult {
            dish_id: dish.id.clone(),
            available: !withdrawn && unavailable_because.is_none(),
            price,
            unavailable_because,
            discounted_by,
            promoted: dish.promotion,
            withdrawn,
        };

        tracing::debug!(
            dish_id = %result.dish_id,
            available = result.available,
            withdrawn = result.withdrawn,
            price = %result.price,
            discounted = result.is_discounted(),
            "Evaluated dish"
        );

        Ok(result)
    }

    /// Evaluate as of the local calendar date
    pub fn evaluate_today<L: LedgerReader + ?Sized>(
        &self,
        dish: &Dish,
        ledger: &L,
    ) -> Result<EvaluationResult> {
        self.evaluate(dish, ledger, chrono::Local::now().date_naive())
    }

    /// Find the first required ingredient that blocks `dish`
    ///
    /// Optional ingredients are never looked up. Stops querying the ledger at the blocking
    /// ingredient.
    pub fn check_availability<L: LedgerReader + ?Sized>(
        &self,
        dish: &Dish,
        ledger: &L,
    ) -> Result<Option<Unavailability>> {
        for id in dish.required_ingredients() {
            let reason = match ledger.get(id) {
                None if self.config.fail_on_unknown_ingredient => {
                    return Err(Error::UnknownIngredient {
                        dish_id: dish.id.to_string(),
                        ingredient_id: id.to_string(),
                    });
                }
                None if self.config.treat_missing_as_unavailable => UnavailableReason::Missing,
                None => continue,
                Some(ingredient) if !ingredient.available => UnavailableReason::Disabled,
                Some(ingredient) if ingredient.is_below_threshold() => {
                    UnavailableReason::BelowThreshold
                }
                Some(ingredient)
                    if dish
                        .required_quantities
                        .get(id)
                        .is_some_and(|required| ingredient.quantity_on_hand < *required) =>
                {
                    UnavailableReason::BelowRequired
                }
                Some(_) => continue,
            };

            return Ok(Some(Unavailability {
                ingredient_id: id.clone(),
                reason,
            }));
        }

        Ok(None)
    }
}
