//! Property-based tests for evaluator invariants
//!
//! These tests use proptest to verify:
//! - An empty recipe is always available at its rounded base price
//! - Without near-expiry ingredients the price is the rounded base price
//! - With one the price is the rounded 80% of base, and it is never stacked
//! - Any ingredient under its threshold or switched off makes the dish unavailable
//! - Evaluation is deterministic

use chrono::{Days, NaiveDate};
use menu_engine::{Dish, RecipeEvaluator, UnavailableReason};
use pantry_ledger::{Ingredient, IngredientId, LedgerSnapshot};
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

/// Strategy for generating base prices with up to 4 decimal places
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_0000i64).prop_map(|units| Decimal::new(units, 4))
}

/// Strategy for generating an ingredient that passes every availability check
fn healthy_ingredient_strategy() -> impl Strategy<Value = (Decimal, Decimal, u64)> {
    (0i64..1_000i64, 0i64..1_000i64, 3u64..365u64).prop_map(|(minimum, extra, days)| {
        (Decimal::new(minimum, 0), Decimal::new(minimum + extra, 0), days)
    })
}

fn rounded(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Ledger of healthy ingredients named `i0..iN`, expiring well after today
fn healthy_ledger(specs: &[(Decimal, Decimal, u64)]) -> (LedgerSnapshot, Vec<IngredientId>) {
    let ingredients: Vec<Ingredient> = specs
        .iter()
        .enumerate()
        .map(|(i, (minimum, quantity, days))| {
            Ingredient::new(format!("i{i}").as_str(), *quantity)
                .with_minimum(*minimum)
                .with_expiry(today() + Days::new(*days))
        })
        .collect();
    let ids = ingredients.iter().map(|i| i.id.clone()).collect();
    (LedgerSnapshot::from_ingredients(ingredients).unwrap(), ids)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: Empty recipes are available at the rounded base price
    #[test]
    fn prop_empty_recipe_available(price in price_strategy()) {
        let dish = Dish::new("empty", Vec::<IngredientId>::new(), price);
        let result = RecipeEvaluator::default()
            .evaluate(&dish, &LedgerSnapshot::empty(), today())
            .unwrap();

        prop_assert!(result.available);
        prop_assert_eq!(result.price, rounded(price));
    }

    /// Property: No near-expiry ingredient means no discount
    #[test]
    fn prop_no_discount_far_from_expiry(
        price in price_strategy(),
        specs in prop::collection::vec(healthy_ingredient_strategy(), 1..8),
    ) {
        let (ledger, ids) = healthy_ledger(&specs);
        let dish = Dish::new("dish", ids, price);

        let result = RecipeEvaluator::default().evaluate(&dish, &ledger, today()).unwrap();

        prop_assert!(result.available);
        prop_assert!(!result.is_discounted());
        prop_assert_eq!(result.price, rounded(price));
    }

    /// Property: Any number of near-expiry ingredients gives one 20% discount
    #[test]
    fn prop_single_discount(
        price in price_strategy(),
        specs in prop::collection::vec(healthy_ingredient_strategy(), 1..8),
        expiring in prop::collection::vec(0u64..=2u64, 1..4),
    ) {
        let (ledger, mut ids) = healthy_ledger(&specs);
        let mut ingredients: Vec<Ingredient> = ledger.iter().cloned().collect();
        for (i, days) in expiring.iter().enumerate() {
            let ingredient = Ingredient::new(format!("soon{i}").as_str(), Decimal::ONE)
                .with_expiry(today() + Days::new(*days));
            ids.push(ingredient.id.clone());
            ingredients.push(ingredient);
        }
        let ledger = LedgerSnapshot::from_ingredients(ingredients).unwrap();
        let dish = Dish::new("dish", ids, price);

        let result = RecipeEvaluator::default().evaluate(&dish, &ledger, today()).unwrap();

        prop_assert!(result.available);
        prop_assert_eq!(result.discounted_by, Some(IngredientId::new("soon0")));
        prop_assert_eq!(result.price, rounded(price * Decimal::new(80, 2)));
    }

    /// Property: One blocking ingredient anywhere makes the dish unavailable
    #[test]
    fn prop_blocker_makes_unavailable(
        price in price_strategy(),
        specs in prop::collection::vec(healthy_ingredient_strategy(), 1..8),
        position in any::<prop::sample::Index>(),
        switched_off in any::<bool>(),
    ) {
        let (ledger, mut ids) = healthy_ledger(&specs);
        let blocker = if switched_off {
            Ingredient::new("blocker", Decimal::new(100, 0)).with_available(false)
        } else {
            Ingredient::new("blocker", Decimal::ZERO).with_minimum(Decimal::ONE)
        };
        ids.insert(position.index(ids.len() + 1), blocker.id.clone());
        let ledger = LedgerSnapshot::from_ingredients(ledger.iter().cloned().chain([blocker])).unwrap();
        let dish = Dish::new("dish", ids, price);

        let result = RecipeEvaluator::default().evaluate(&dish, &ledger, today()).unwrap();

        prop_assert!(!result.available);
        let blocked = result.unavailable_because.unwrap();
        prop_assert_eq!(blocked.ingredient_id, IngredientId::new("blocker"));
        let expected = if switched_off {
            UnavailableReason::Disabled
        } else {
            UnavailableReason::BelowThreshold
        };
        prop_assert_eq!(blocked.reason, expected);
    }

    /// Property: Same dish, same snapshot, same result
    #[test]
    fn prop_evaluation_idempotent(
        price in price_strategy(),
        specs in prop::collection::vec((0i64..10i64, 0i64..10i64, 0u64..5u64), 0..8),
    ) {
        let ingredients: Vec<Ingredient> = specs
            .iter()
            .enumerate()
            .map(|(i, (minimum, quantity, days))| {
                Ingredient::new(format!("i{i}").as_str(), Decimal::new(*quantity, 0))
                    .with_minimum(Decimal::new(*minimum, 0))
                    .with_expiry(today() + Days::new(*days))
            })
            .collect();
        let ids: Vec<IngredientId> = ingredients.iter().map(|i| i.id.clone()).collect();
        let ledger = LedgerSnapshot::from_ingredients(ingredients).unwrap();
        let dish = Dish::new("dish", ids, price);
        let evaluator = RecipeEvaluator::default();

        let first = evaluator.evaluate(&dish, &ledger, today()).unwrap();
        let second = evaluator.evaluate(&dish, &ledger, today()).unwrap();
        prop_assert_eq!(first, second);
    }
}
