//! Core types for the menu engine

use pantry_ledger::types::deserialize_key;
use pantry_ledger::IngredientId;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Dish identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DishId(String);

impl DishId {
    /// Create new dish ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DishId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for DishId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_key(deserializer).map(Self)
    }
}

/// Whether a dish is on offer at all
///
/// Decoded from a flag (`true` = available) or from the status words the dish tables
/// use ("disponivel", "indisponivel").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DishStatus {
    /// Listed and evaluated against the ledger
    #[default]
    Available,
    /// Taken off the menu by staff
    Withdrawn,
}

impl<'de> Deserialize<'de> for DishStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StatusText {
            Flag(bool),
            Word(String),
        }

        match StatusText::deserialize(deserializer)? {
            StatusText::Flag(true) => Ok(Self::Available),
            StatusText::Flag(false) => Ok(Self::Withdrawn),
            StatusText::Word(word) => match word.trim().to_lowercase().as_str() {
                "available" | "disponivel" | "disponível" | "ativo" => Ok(Self::Available),
                "withdrawn" | "unavailable" | "indisponivel" | "indisponível" | "inativo" => {
                    Ok(Self::Withdrawn)
                }
                other => Err(serde::de::Error::custom(format!("unknown dish status {other:?}"))),
            },
        }
    }
}

/// Menu item made from a recipe of ingredients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dish {
    /// Dish ID
    pub id: DishId,

    /// Display name
    pub name: String,

    /// Recipe ingredients in recipe order, optional ones included
    pub ingredients: Vec<IngredientId>,

    /// Recipe ingredients the dish can go without
    pub optional_ingredients: BTreeSet<IngredientId>,

    /// Price before any discount
    pub base_price: Decimal,

    /// Amount of an ingredient one portion uses, where the recipe records it
    pub required_quantities: BTreeMap<IngredientId, Decimal>,

    /// Menu category
    pub category: Option<String>,

    /// Menu description
    pub description: Option<String>,

    /// Listed or withdrawn
    pub status: DishStatus,

    /// Staff promotion: sold at the discounted price whatever the stock says
    pub promotion: bool,
}

impl Dish {
    /// Create a dish with only required ingredients and no per-portion quantities
    pub fn new(
        id: impl Into<DishId>,
        ingredients: impl IntoIterator<Item = impl Into<IngredientId>>,
        base_price: Decimal,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            optional_ingredients: BTreeSet::new(),
            base_price,
            required_quantities: BTreeMap::new(),
            category: None,
            description: None,
            status: DishStatus::Available,
            promotion: false,
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Record how much of `ingredient` one portion uses
    pub fn with_requirement(mut self, ingredient: impl Into<IngredientId>, quantity: Decimal) -> Self {
        self.required_quantities.insert(ingredient.into(), quantity);
        self
    }

    /// Add `ingredient` to the end of the recipe as optional
    pub fn with_optional(mut self, ingredient: impl Into<IngredientId>) -> Self {
        let ingredient = ingredient.into();
        if !self.ingredients.contains(&ingredient) {
            self.ingredients.push(ingredient.clone());
        }
        self.optional_ingredients.insert(ingredient);
        self
    }

    /// Set listing status
    pub fn with_status(mut self, status: DishStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the staff promotion flag
    pub fn with_promotion(mut self, promotion: bool) -> Self {
        self.promotion = promotion;
        self
    }

    /// Taken off the menu
    pub fn is_withdrawn(&self) -> bool {
        self.status == DishStatus::Withdrawn
    }

    /// `ingredient` blocks the dish when it runs out
    pub fn is_required(&self, ingredient: &IngredientId) -> bool {
        !self.optional_ingredients.contains(ingredient)
    }

    /// Required ingredients in recipe order
    pub fn required_ingredients(&self) -> impl Iterator<Item = &IngredientId> {
        self.ingredients.iter().filter(|id| self.is_required(id))
    }

    /// Reject dishes whose numbers cannot be priced
    pub fn validate(&self) -> crate::Result<()> {
        if self.base_price < Decimal::ZERO {
            return Err(crate::Error::invalid_dish(
                &self.id,
                format!("base_price must not be negative, got {}", self.base_price),
            ));
        }
        if let Some((ingredient, quantity)) = self
            .required_quantities
            .iter()
            .find(|(_, quantity)| **quantity < Decimal::ZERO)
        {
            return Err(crate::Error::invalid_dish(
                &self.id,
                format!("required quantity of '{ingredient}' must not be negative, got {quantity}"),
            ));
        }
        if let Some(stray) = self
            .optional_ingredients
            .iter()
            .find(|id| !self.ingredients.contains(id))
        {
            return Err(crate::Error::invalid_dish(
                &self.id,
                format!("optional ingredient '{stray}' is not in the recipe"),
            ));
        }
        Ok(())
    }
}

/// Why a dish cannot be prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Ingredient absent from the ledger
    Missing,
    /// Ingredient switched off by staff
    Disabled,
    /// Quantity under the ingredient's minimum threshold
    BelowThreshold,
    /// Quantity under what one portion needs
    BelowRequired,
}

/// Ingredient that blocked a dish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unavailability {
    /// Blocking ingredient
    pub ingredient_id: IngredientId,

    /// Why it blocked
    pub reason: UnavailableReason,
}

/// Availability and price of one dish against one ledger snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Dish ID
    pub dish_id: DishId,

    /// Dish can be prepared
    pub available: bool,

    /// Price to charge, rounded to 2 decimal places
    pub price: Decimal,

    /// First blocking ingredient, when unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable_because: Option<Unavailability>,

    /// Near-expiry ingredient that triggered the discount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_by: Option<IngredientId>,

    /// Discounted because staff put the dish on promotion
    #[serde(default)]
    pub promoted: bool,

    /// Dish is withdrawn from the menu; the ledger was not consulted
    #[serde(default)]
    pub withdrawn: bool,
}

impl EvaluationResult {
    /// Discount was applied, by a near-expiry ingredient or a promotion
    pub fn is_discounted(&self) -> bool {
        self.discounted_by.is_some() || self.promoted
    }
}
