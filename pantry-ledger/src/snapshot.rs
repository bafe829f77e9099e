//! Immutable ingredient snapshot handed to evaluators

use crate::{
    reader::LedgerReader,
    record::IngredientRecord,
    types::{Ingredient, IngredientId},
    Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

/// Point-in-time copy of the ingredient ledger
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    ingredients: HashMap<IngredientId, Ingredient>,
    taken_at: DateTime<Utc>,
}

impl LedgerSnapshot {
    /// Empty snapshot
    pub fn empty() -> Self {
        Self {
            ingredients: HashMap::new(),
            taken_at: Utc::now(),
        }
    }

    /// Build from ingredients, checking each one
    ///
    /// Fails on the first ingredient with a negative quantity or threshold. When an id
    /// repeats, the later ingredient replaces the earlier one.
    pub fn from_ingredients(ingredients: impl IntoIterator<Item = Ingredient>) -> Result<Self> {
        let ingredients = ingredients
            .into_iter()
            .map(|ingredient| ingredient.validate().map(|()| ingredient))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_validated(ingredients))
    }

    /// Build from ingredients that already passed validation
    pub(crate) fn from_validated(ingredients: impl IntoIterator<Item = Ingredient>) -> Self {
        let mut map = HashMap::new();
        for ingredient in ingredients {
            let id = ingredient.id.clone();
            if map.insert(id.clone(), ingredient).is_some() {
                tracing::warn!(ingredient_id = %id, "Duplicate ingredient in ledger input, keeping the last record");
            }
        }

        Self {
            ingredients: map,
            taken_at: Utc::now(),
        }
    }

    /// Build from raw supplier records keyed by id
    ///
    /// Fails on the first record that does not validate.
    pub fn from_records(
        records: impl IntoIterator<Item = (IngredientId, IngredientRecord)>,
        default_available: bool,
    ) -> Result<Self> {
        let ingredients = records
            .into_iter()
            .map(|(key, record)| record.validate(&key, default_available))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_validated(ingredients))
    }

    /// When this snapshot was taken
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Number of ingredients
    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    /// No ingredients at all
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    /// Iterate ingredients in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.values()
    }

    /// Ingredient currently on the kitchen scale
    pub fn active(&self) -> Option<&Ingredient> {
        self.ingredients.values().find(|ingredient| ingredient.active)
    }

    /// Ingredients expiring within `days` of `today`, soonest first
    pub fn near_expiry(&self, today: NaiveDate, days: i64) -> Vec<&Ingredient> {
        let mut expiring: Vec<&Ingredient> = self
            .ingredients
            .values()
            .filter(|ingredient| {
                ingredient
                    .days_until_expiry(today)
                    .is_some_and(|remaining| remaining <= days)
            })
            .collect();
        expiring.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date).then(a.id.cmp(&b.id)));
        expiring
    }

    /// Ingredients under their minimum threshold, by id
    pub fn below_threshold(&self) -> Vec<&Ingredient> {
        let mut restock: Vec<&Ingredient> = self
            .ingredients
            .values()
            .filter(|ingredient| ingredient.is_below_threshold())
            .collect();
        restock.sort_by(|a, b| a.id.cmp(&b.id));
        restock
    }

    /// Consume into the underlying map
    pub fn into_inner(self) -> HashMap<IngredientId, Ingredient> {
        self.ingredients
    }
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl LedgerReader for LedgerSnapshot {
    fn get(&self, id: &IngredientId) -> Option<&Ingredient> {
        self.ingredients.get(id)
    }
}
