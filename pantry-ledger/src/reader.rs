//! Read-only view of ingredient state

use crate::types::{Ingredient, IngredientId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Read access to the ingredient ledger
///
/// Lookups never fail: an unknown identifier is `None`, and the caller decides what an
/// absent ingredient means.
pub trait LedgerReader {
    /// Look up an ingredient
    fn get(&self, id: &IngredientId) -> Option<&Ingredient>;
}

impl LedgerReader for HashMap<IngredientId, Ingredient> {
    fn get(&self, id: &IngredientId) -> Option<&Ingredient> {
        HashMap::get(self, id)
    }
}

impl LedgerReader for BTreeMap<IngredientId, Ingredient> {
    fn get(&self, id: &IngredientId) -> Option<&Ingredient> {
        BTreeMap::get(self, id)
    }
}

impl<T: LedgerReader + ?Sized> LedgerReader for &T {
    fn get(&self, id: &IngredientId) -> Option<&Ingredient> {
        (**self).get(id)
    }
}

impl<T: LedgerReader + ?Sized> LedgerReader for Arc<T> {
    fn get(&self, id: &IngredientId) -> Option<&Ingredient> {
        (**self).get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lookup<R: LedgerReader>(reader: R, id: &str) -> Option<String> {
        reader.get(&IngredientId::new(id)).map(|i| i.name.clone())
    }

    #[test]
    fn test_map_readers() {
        let mut map = HashMap::new();
        map.insert(IngredientId::new("egg"), Ingredient::new("egg", dec!(3)));

        assert_eq!(lookup(&map, "egg").as_deref(), Some("egg"));
        assert_eq!(lookup(&map, "flour"), None);

        let shared = Arc::new(map);
        assert_eq!(lookup(shared, "egg").as_deref(), Some("egg"));
    }
}
