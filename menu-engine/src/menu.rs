//! Menu presentation
//!
//! Turns a [`CatalogReport`] into the rows a menu screen or API shows. Dishes that could
//! not be evaluated are left off the menu.

use crate::{
    batch::CatalogReport,
    catalog::DishCatalog,
    types::DishId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One menu row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Dish ID
    pub id: DishId,

    /// Display name
    pub name: String,

    /// Price to charge today
    pub price: Decimal,

    /// Price before any discount
    pub base_price: Decimal,

    /// Dish can be prepared
    pub available: bool,

    /// Sold at the discounted price, through near expiry or a staff promotion
    pub promotion: bool,

    /// Menu category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Menu description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Menu rows in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Menu {
    items: Vec<MenuItem>,
}

impl Menu {
    /// Build the menu for an evaluated catalog
    pub fn from_report(catalog: &DishCatalog, report: &CatalogReport) -> Self {
        let items = report
            .results()
            .filter_map(|result| {
                let dish = catalog.get(&result.dish_id)?;
                Some(MenuItem {
                    id: dish.id.clone(),
                    name: dish.name.clone(),
                    price: result.price,
                    base_price: dish.base_price,
                    available: result.available,
                    promotion: result.is_discounted(),
                    category: dish.category.clone(),
                    description: dish.description.clone(),
                })
            })
            .collect();

        Self { items }
    }

    /// Rows in catalog order
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No rows
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rows that can be ordered
    pub fn available(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter().filter(|item| item.available)
    }

    /// Rows sorted by name, ignoring case
    pub fn sorted_by_name(&self) -> Vec<&MenuItem> {
        let mut items: Vec<&MenuItem> = self.items.iter().collect();
        items.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        items
    }

    /// Pretty JSON array of rows
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.items)
    }
}
