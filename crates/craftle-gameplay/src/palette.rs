//! The ingredient palette: every item a player can place on the grid.

use std::collections::BTreeSet;

use craftle_common::ItemId;
use craftle_kernel::catalog::{Catalog, ItemCatalog};
use tracing::{debug, warn};

/// Sorted, de-duplicated list of selectable ingredients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientPalette {
    items: Vec<ItemId>,
}

impl IngredientPalette {
    /// Collects every concrete item accepted by any recipe ingredient.
    ///
    /// With `include_results`, every recipe's output is added as well.
    /// Recipes with unresolvable tags are skipped.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog, include_results: bool) -> Self {
        let expander = catalog.tags().expander();
        let mut items = BTreeSet::new();

        for recipe in catalog.recipes() {
            for spec in recipe.ingredient_specs() {
                match expander.expand(spec) {
                    Ok(set) => items.extend(set),
                    Err(e) => warn!("Palette skips ingredient of {}: {}", recipe.id, e),
                }
            }
            if include_results {
                items.insert(recipe.result.item.clone());
            }
        }

        debug!("Ingredient palette has {} items", items.len());
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// Items in sorted order.
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the palette is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if an item is selectable.
    #[must_use]
    pub fn contains(&self, item: &ItemId) -> bool {
        self.items.binary_search(item).is_ok()
    }

    /// Items whose ID or display name contains `query` (case-insensitive).
    #[must_use]
    pub fn search<'a>(&'a self, query: &str, names: &ItemCatalog) -> Vec<&'a ItemId> {
        let query = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.as_str().to_lowercase().contains(&query)
                    || names
                        .get(item)
                        .is_some_and(|info| info.name.to_lowercase().contains(&query))
            })
            .collect()
    }
}
