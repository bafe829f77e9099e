//! Near-expiry discount rule
//!
//! A dish is discounted when any ingredient it uses expires soon. Only the first such
//! ingredient (in recipe order) matters; the discount never stacks.

use crate::types::Dish;
use chrono::NaiveDate;
use pantry_ledger::{IngredientId, LedgerReader};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places prices are rounded to
pub const PRICE_SCALE: u32 = 2;

/// Pricing rule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingRule {
    /// Ingredients with this many days left or fewer trigger the discount
    pub near_expiry_days: i64,

    /// Fraction taken off the base price (0.20 = 20%)
    pub discount_rate: Decimal,

    /// Expiry assumed for ingredients with none recorded; `None` means never
    pub missing_expiry_default: Option<NaiveDate>,
}

impl Default for PricingRule {
    fn default() -> Self {
        Self {
            near_expiry_days: 2,
            discount_rate: Decimal::new(20, 2), // 20%
            missing_expiry_default: None,
        }
    }
}

impl PricingRule {
    /// Check the rule is usable
    pub fn validate(&self) -> crate::Result<()> {
        if self.discount_rate < Decimal::ZERO || self.discount_rate > Decimal::ONE {
            return Err(crate::Error::Config(format!(
                "discount_rate must be between 0 and 1, got {}",
                self.discount_rate
            )));
        }
        if self.near_expiry_days < 0 {
            return Err(crate::Error::Config(format!(
                "near_expiry_days must not be negative, got {}",
                self.near_expiry_days
            )));
        }
        Ok(())
    }

    /// First ingredient of `dish` close enough to expiry to discount it
    ///
    /// Absent ingredients never trigger a discount.
    pub fn near_expiry_trigger<L: LedgerReader + ?Sized>(
        &self,
        dish: &Dish,
        ledger: &L,
        today: NaiveDate,
    ) -> Option<IngredientId> {
        dish.ingredients
            .iter()
            .find(|id| {
                ledger
                    .get(id)
                    .and_then(|ingredient| ingredient.expiry_date.or(self.missing_expiry_default))
                    .is_some_and(|expiry| days_remaining(expiry, today) <= self.near_expiry_days)
            })
            .cloned()
    }

    /// Price after the optional discount, rounded half-up to cents
    pub fn apply(&self, base_price: Decimal, discounted: bool) -> Decimal {
        let price = if discounted {
            base_price * (Decimal::ONE - self.discount_rate)
        } else {
            base_price
        };
        round_price(price)
    }
}

/// Calendar days from `today` until `expiry` (negative once past)
pub fn days_remaining(expiry: NaiveDate, today: NaiveDate) -> i64 {
    expiry.signed_duration_since(today).num_days()
}

/// Round half-up (midpoint away from zero) to [`PRICE_SCALE`] places
pub fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_ledger::{Ingredient, LedgerSnapshot};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_price(dec!(2.345)), dec!(2.35));
        assert_eq!(round_price(dec!(2.344)), dec!(2.34));
        assert_eq!(round_price(dec!(0.125)), dec!(0.13));
        assert_eq!(round_price(dec!(10)), dec!(10));
    }

    #[test]
    fn test_apply_discount() {
        let rule = PricingRule::default();
        assert_eq!(rule.apply(dec!(10.00), true), dec!(8.00));
        assert_eq!(rule.apply(dec!(10.00), false), dec!(10.00));
        assert_eq!(rule.apply(dec!(12.99), true), dec!(10.39));
        assert_eq!(rule.apply(dec!(0.05), true), dec!(0.04));
    }

    #[test]
    fn test_days_remaining() {
        let today = date(2026, 12, 30);
        assert_eq!(days_remaining(date(2027, 1, 1), today), 2);
        assert_eq!(days_remaining(date(2026, 12, 29), today), -1);
    }

    #[test]
    fn test_trigger_boundary() {
        let today = date(2026, 4, 10);
        let rule = PricingRule::default();
        let ledger = LedgerSnapshot::from_ingredients(vec![
            Ingredient::new("two_days", dec!(1)).with_expiry(date(2026, 4, 12)),
            Ingredient::new("three_days", dec!(1)).with_expiry(date(2026, 4, 13)),
            Ingredient::new("expired", dec!(1)).with_expiry(date(2026, 4, 1)),
        ]).unwrap();

        let inside = Dish::new("a", ["three_days", "two_days"], dec!(5));
        assert_eq!(
            rule.near_expiry_trigger(&inside, &ledger, today),
            Some(IngredientId::new("two_days"))
        );

        let outside = Dish::new("b", ["three_days"], dec!(5));
        assert_eq!(rule.near_expiry_trigger(&outside, &ledger, today), None);

        let expired = Dish::new("c", ["expired", "two_days"], dec!(5));
        assert_eq!(
            rule.near_expiry_trigger(&expired, &ledger, today),
            Some(IngredientId::new("expired"))
        );
    }

    #[test]
    fn test_missing_expiry_default() {
        let today = date(2026, 4, 10);
        let ledger = LedgerSnapshot::from_ingredients(vec![Ingredient::new("salt", dec!(1))]).unwrap();
        let dish = Dish::new("d", ["salt", "ghost"], dec!(5));

        let rule = PricingRule::default();
        assert_eq!(rule.near_expiry_trigger(&dish, &ledger, today), None);

        let stale_default = PricingRule {
            missing_expiry_default: Some(date(2025, 12, 31)),
            ..Default::default()
        };
        assert_eq!(
            stale_default.near_expiry_trigger(&dish, &ledger, today),
            Some(IngredientId::new("salt"))
        );
    }

    #[test]
    fn test_validate_rule() {
        assert!(PricingRule::default().validate().is_ok());
        let bad = PricingRule {
            discount_rate: dec!(1.5),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
