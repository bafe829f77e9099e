//! Dish catalog boundary
//!
//! Dish definitions come from files, table joins or REST calls, so prices and
//! quantities arrive as numbers or numeric strings. Each dish is validated on its own:
//! a bad record becomes an [`Error::InvalidDishData`] entry instead of taking the whole
//! catalog down.
//!
//! Accepted file shapes:
//!
//! ```json
//! { "12": { "name": "Pancakes", "ingredients": ["flour", 3], "base_price": "10.00" } }
//! ```
//!
//! or an array of records that each carry an `id`. A recipe line is either a bare
//! ingredient id or a mapping such as
//! `{ "ingrediente_id": 7, "obrigatorio": false, "quantidade": "30" }`.
//!
//! Entries keep the document order, and [`DishCatalog::save`] writes the catalog back in
//! the shape it was read in.

use crate::{
    types::{Dish, DishId, DishStatus},
    Error, Result,
};
use pantry_ledger::record::parse_quantity;
use pantry_ledger::IngredientId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

/// One line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeLine {
    /// Bare ingredient id, required
    Id(IngredientId),
    /// Ingredient mapping with its own flags
    Mapping(RecipeMapping),
}

impl RecipeLine {
    /// Ingredient this line refers to
    pub fn ingredient_id(&self) -> &IngredientId {
        match self {
            RecipeLine::Id(id) => id,
            RecipeLine::Mapping(mapping) => &mapping.id,
        }
    }
}

/// Ingredient mapping row of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeMapping {
    /// Ingredient ID
    #[serde(alias = "ingredient_id", alias = "ingrediente_id")]
    pub id: IngredientId,

    /// Dish cannot be prepared without it
    #[serde(default = "default_required", alias = "obrigatorio")]
    pub required: bool,

    /// Per-portion quantity, number or numeric string
    #[serde(default, alias = "quantidade", skip_serializing_if = "Value::is_null")]
    pub quantity: Value,

    /// Unit the quantity is given in
    #[serde(default, alias = "unidade", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Free-text note for the kitchen
    #[serde(default, alias = "observacao", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_required() -> bool {
    true
}

/// Dish record before validation
///
/// Field names follow the English catalog format; the Portuguese names used by the dish
/// tables are accepted as aliases. `ingredients` must be present, and any other key is
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DishRecord {
    /// Dish ID (object-shaped catalogs use the key instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DishId>,

    /// Display name
    #[serde(default, alias = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Recipe lines in recipe order
    #[serde(alias = "ingredientes")]
    pub ingredients: Vec<RecipeLine>,

    /// Extra ingredients the dish can go without
    #[serde(
        default,
        alias = "ingredientes_opcionais",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub optional_ingredients: Vec<IngredientId>,

    /// Base price, number or numeric string
    #[serde(default, alias = "price", alias = "preco", alias = "preco_base")]
    pub base_price: Value,

    /// Per-portion quantities, numbers or numeric strings
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub required_quantities: BTreeMap<IngredientId, Value>,

    /// Menu category
    #[serde(default, alias = "categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Menu description
    #[serde(
        default,
        alias = "desc",
        alias = "descricao",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    /// Listing status, flag or status word
    #[serde(default, alias = "disponivel", skip_serializing_if = "Option::is_none")]
    pub status: Option<DishStatus>,

    /// Staff promotion flag
    #[serde(default, alias = "promocao", skip_serializing_if = "Option::is_none")]
    pub promotion: Option<bool>,
}

impl DishRecord {
    /// Validate into a [`Dish`]
    pub fn validate(self, fallback_id: &DishId) -> Result<Dish> {
        let id = self.id.unwrap_or_else(|| fallback_id.clone());

        let base_price = match &self.base_price {
            Value::Null => return Err(Error::invalid_dish(&id, "missing base_price")),
            value => parse_quantity(value).ok_or_else(|| {
                Error::invalid_dish(&id, format!("base_price is not numeric: {value}"))
            })?,
        };
        if base_price < Decimal::ZERO {
            return Err(Error::invalid_dish(
                &id,
                format!("base_price must not be negative, got {base_price}"),
            ));
        }

        let mut required_quantities = BTreeMap::new();
        for (ingredient, value) in self.required_quantities {
            let quantity = portion_quantity(&id, &ingredient, &value)?;
            required_quantities.insert(ingredient, quantity);
        }

        let mut ingredients = Vec::with_capacity(self.ingredients.len());
        let mut optional_ingredients = BTreeSet::new();
        for line in self.ingredients {
            match line {
                RecipeLine::Id(ingredient) => ingredients.push(ingredient),
                RecipeLine::Mapping(mapping) => {
                    if !mapping.quantity.is_null() {
                        let quantity = portion_quantity(&id, &mapping.id, &mapping.quantity)?;
                        required_quantities.insert(mapping.id.clone(), quantity);
                    }
                    if !mapping.required {
                        optional_ingredients.insert(mapping.id.clone());
                    }
                    ingredients.push(mapping.id);
                }
            }
        }
        for ingredient in self.optional_ingredients {
            if !ingredients.contains(&ingredient) {
                ingredients.push(ingredient.clone());
            }
            optional_ingredients.insert(ingredient);
        }

        Ok(Dish {
            name: self.name.unwrap_or_else(|| id.to_string()),
            id,
            ingredients,
            optional_ingredients,
            base_price,
            required_quantities,
            category: self.category,
            description: self.description,
            status: self.status.unwrap_or_default(),
            promotion: self.promotion.unwrap_or(false),
        })
    }
}

impl From<&Dish> for DishRecord {
    fn from(dish: &Dish) -> Self {
        let ingredients = dish
            .ingredients
            .iter()
            .map(|ingredient| {
                if dish.is_required(ingredient) {
                    RecipeLine::Id(ingredient.clone())
                } else {
                    RecipeLine::Mapping(RecipeMapping {
                        id: ingredient.clone(),
                        required: false,
                        quantity: Value::Null,
                        unit: None,
                        note: None,
                    })
                }
            })
            .collect();

        Self {
            id: Some(dish.id.clone()),
            name: Some(dish.name.clone()),
            ingredients,
            optional_ingredients: Vec::new(),
            base_price: Value::String(dish.base_price.to_string()),
            required_quantities: dish
                .required_quantities
                .iter()
                .map(|(ingredient, quantity)| {
                    (ingredient.clone(), Value::String(quantity.to_string()))
                })
                .collect(),
            category: dish.category.clone(),
            description: dish.description.clone(),
            status: Some(dish.status),
            promotion: Some(dish.promotion),
        }
    }
}

fn portion_quantity(dish_id: &DishId, ingredient: &IngredientId, value: &Value) -> Result<Decimal> {
    let quantity = parse_quantity(value).ok_or_else(|| {
        Error::invalid_dish(
            dish_id,
            format!("required quantity of '{ingredient}' is not numeric: {value}"),
        )
    })?;
    if quantity < Decimal::ZERO {
        return Err(Error::invalid_dish(
            dish_id,
            format!("required quantity of '{ingredient}' must not be negative"),
        ));
    }
    Ok(quantity)
}

/// One catalog entry: a validated dish or the reason it was rejected
#[derive(Debug)]
pub struct CatalogEntry {
    /// Dish ID
    pub id: DishId,

    /// Validation outcome
    pub dish: Result<Dish>,

    /// Document value of a rejected record, written back untouched on save
    raw: Option<Value>,
}

/// Layout of a catalog document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogShape {
    /// Object keyed by dish id
    #[default]
    Object,
    /// Array of records carrying their own `id`
    Array,
}

/// Dish catalog in supplier order
#[derive(Debug, Default)]
pub struct DishCatalog {
    entries: Vec<CatalogEntry>,
    shape: CatalogShape,
}

impl DishCatalog {
    /// Catalog of already-validated dishes
    pub fn from_dishes(dishes: impl IntoIterator<Item = Dish>) -> Self {
        Self {
            entries: dishes
                .into_iter()
                .map(|dish| CatalogEntry {
                    id: dish.id.clone(),
                    dish: Ok(dish),
                    raw: None,
                })
                .collect(),
            shape: CatalogShape::Object,
        }
    }

    /// Parse a catalog document
    ///
    /// Fails only when the document itself is unusable; bad dishes become rejected entries.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)
            .map_err(|e| Error::Catalog(format!("Catalog is not valid JSON: {e}")))?;

        let (shape, raw): (CatalogShape, Vec<(DishId, Value)>) = match document {
            Value::Object(map) => (
                CatalogShape::Object,
                map.into_iter()
                    .map(|(key, value)| (DishId::new(key), value))
                    .collect(),
            ),
            Value::Array(items) => (
                CatalogShape::Array,
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| (array_entry_id(index, &value), value))
                    .collect(),
            ),
            other => {
                return Err(Error::Catalog(format!(
                    "Catalog must be a JSON object or array, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut seen = HashSet::new();
        let entries = raw
            .into_iter()
            .map(|(id, value)| {
                let dish = if seen.insert(id.clone()) {
                    serde_json::from_value::<DishRecord>(value.clone())
                        .map_err(|e| Error::invalid_dish(&id, e.to_string()))
                        .and_then(|record| record.validate(&id))
                } else {
                    Err(Error::invalid_dish(&id, "duplicate dish id"))
                };
                let raw = dish.is_err().then_some(value);
                CatalogEntry { id, dish, raw }
            })
            .collect();

        let catalog = Self { entries, shape };
        for (id, error) in catalog.rejected() {
            tracing::warn!(dish_id = %id, "Rejected dish record: {}", error);
        }
        Ok(catalog)
    }

    /// Load a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Catalog(format!("Failed to read {}: {}", path.display(), e)))?;
        let catalog = Self::from_json_str(&content)?;

        tracing::info!(
            "Loaded {} dishes from {:?} ({} rejected)",
            catalog.len(),
            path,
            catalog.rejected().count()
        );
        Ok(catalog)
    }

    /// All entries, valid or not
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Document layout used by [`save`](Self::save)
    pub fn shape(&self) -> CatalogShape {
        self.shape
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validated dishes
    pub fn valid_dishes(&self) -> impl Iterator<Item = &Dish> {
        self.entries.iter().filter_map(|entry| entry.dish.as_ref().ok())
    }

    /// Rejected entries with their errors
    pub fn rejected(&self) -> impl Iterator<Item = (&DishId, &Error)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.dish.as_ref().err().map(|e| (&entry.id, e)))
    }

    /// Look up a validated dish
    pub fn get(&self, id: &DishId) -> Option<&Dish> {
        self.valid_dishes().find(|dish| &dish.id == id)
    }

    /// Add a new dish at the end of the catalog
    pub fn add_dish(&mut self, dish: Dish) -> Result<()> {
        dish.validate()?;
        if self.entries.iter().any(|entry| entry.id == dish.id) {
            return Err(Error::invalid_dish(&dish.id, "duplicate dish id"));
        }

        tracing::info!(dish_id = %dish.id, "Added dish");
        self.entries.push(CatalogEntry {
            id: dish.id.clone(),
            dish: Ok(dish),
            raw: None,
        });
        Ok(())
    }

    /// Delete a dish, rejected or not
    pub fn remove_dish(&mut self, id: &DishId) -> Result<CatalogEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| &entry.id == id)
            .ok_or_else(|| Error::DishNotFound(id.to_string()))?;

        tracing::info!(dish_id = %id, "Removed dish");
        Ok(self.entries.remove(index))
    }

    /// Set the listing status of a dish
    pub fn set_status(&mut self, id: &DishId, status: DishStatus) -> Result<&Dish> {
        let dish = self.dish_mut(id)?;
        dish.status = status;
        tracing::info!(dish_id = %id, ?status, "Dish status changed");
        Ok(dish)
    }

    /// Take a dish off the menu without deleting it
    pub fn withdraw_dish(&mut self, id: &DishId) -> Result<&Dish> {
        self.set_status(id, DishStatus::Withdrawn)
    }

    /// Put a dish on or off promotion
    pub fn set_promotion(&mut self, id: &DishId, promotion: bool) -> Result<&Dish> {
        let dish = self.dish_mut(id)?;
        dish.promotion = promotion;
        tracing::info!(dish_id = %id, promotion, "Dish promotion changed");
        Ok(dish)
    }

    /// Add `ingredient` to a recipe, or update its line when already there
    ///
    /// `quantity` is the per-portion amount; `None` leaves any recorded amount as is.
    pub fn add_ingredient(
        &mut self,
        id: &DishId,
        ingredient: IngredientId,
        required: bool,
        quantity: Option<Decimal>,
    ) -> Result<&Dish> {
        if let Some(quantity) = quantity {
            if quantity < Decimal::ZERO {
                return Err(Error::invalid_dish(
                    id,
                    format!("required quantity of '{ingredient}' must not be negative"),
                ));
            }
        }

        let dish = self.dish_mut(id)?;
        if !dish.ingredients.contains(&ingredient) {
            dish.ingredients.push(ingredient.clone());
        }
        if required {
            dish.optional_ingredients.remove(&ingredient);
        } else {
            dish.optional_ingredients.insert(ingredient.clone());
        }
        if let Some(quantity) = quantity {
            dish.required_quantities.insert(ingredient.clone(), quantity);
        }

        tracing::info!(dish_id = %id, ingredient_id = %ingredient, required, "Recipe line set");
        Ok(dish)
    }

    /// Drop `ingredient` from a recipe
    pub fn remove_ingredient(&mut self, id: &DishId, ingredient: &IngredientId) -> Result<&Dish> {
        let dish = self.dish_mut(id)?;
        if !dish.ingredients.contains(ingredient) {
            return Err(Error::invalid_dish(
                id,
                format!("ingredient '{ingredient}' is not in the recipe"),
            ));
        }
        dish.ingredients.retain(|line| line != ingredient);
        dish.optional_ingredients.remove(ingredient);
        dish.required_quantities.remove(ingredient);

        tracing::info!(dish_id = %id, ingredient_id = %ingredient, "Recipe line removed");
        Ok(dish)
    }

    /// Catalog as a JSON document in its original shape
    ///
    /// Rejected records are written back exactly as they were read.
    pub fn to_json_value(&self) -> Result<Value> {
        let mut rows = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let value = match (&entry.dish, &entry.raw) {
                (Ok(dish), _) => {
                    let mut record = DishRecord::from(dish);
                    if self.shape == CatalogShape::Object {
                        record.id = None;
                    }
                    serde_json::to_value(record).map_err(|e| {
                        Error::Catalog(format!("Failed to encode dish {}: {e}", entry.id))
                    })?
                }
                (Err(_), Some(raw)) => raw.clone(),
                (Err(_), None) => continue,
            };
            rows.push((entry.id.clone(), value));
        }

        Ok(match self.shape {
            CatalogShape::Object => Value::Object(
                rows.into_iter()
                    .map(|(id, value)| (id.to_string(), value))
                    .collect::<Map<String, Value>>(),
            ),
            CatalogShape::Array => Value::Array(rows.into_iter().map(|(_, value)| value).collect()),
        })
    }

    /// Write the catalog file
    ///
    /// Written to a temporary file first and renamed into place.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.to_json_value()?)
            .map_err(|e| Error::Catalog(format!("Failed to encode catalog: {e}")))?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(|e| {
            Error::Catalog(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        std::fs::rename(&tmp_path, path).map_err(|e| {
            Error::Catalog(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        tracing::info!("Saved {} dishes to {:?}", self.len(), path);
        Ok(())
    }

    fn dish_mut(&mut self, id: &DishId) -> Result<&mut Dish> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| &entry.id == id)
            .ok_or_else(|| Error::DishNotFound(id.to_string()))?;
        entry
            .dish
            .as_mut()
            .map_err(|_| Error::invalid_dish(id, "rejected dish records cannot be edited"))
    }
}

fn array_entry_id(index: usize, value: &Value) -> DishId {
    match value.get("id") {
        Some(Value::String(id)) => DishId::new(id.clone()),
        Some(Value::Number(id)) => DishId::new(id.to_string()),
        _ => DishId::new(format!("#{}", index + 1)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
