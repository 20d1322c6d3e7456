//! The read-only game catalog: recipes, tags, and item display metadata.
//!
//! A [`Catalog`] is built once at startup and never mutated afterwards; wrap
//! it in an `Arc` to share it between sessions.

use ahash::AHashMap;
use craftle_common::{CatalogError, CatalogResult, ItemId, RecipeId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::crafting_grid::{CraftingGrid, RecipeMatcher};
use crate::recipe::Recipe;
use crate::tags::TagCatalog;

/// Display metadata for an item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Human-readable name.
    pub name: String,
    /// Icon reference (data URL or path). Empty when unavailable.
    #[serde(default)]
    pub icon: String,
}

/// Item display metadata keyed by item ID.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: AHashMap<ItemId, ItemInfo>,
}

impl ItemCatalog {
    /// Creates an empty item catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers display metadata for an item.
    pub fn insert(&mut self, item: ItemId, info: ItemInfo) {
        self.items.insert(item, info);
    }

    /// Gets the metadata for an item.
    #[must_use]
    pub fn get(&self, item: &ItemId) -> Option<&ItemInfo> {
        self.items.get(item)
    }

    /// Returns the display name, falling back to the raw ID.
    #[must_use]
    pub fn display_name<'a>(&'a self, item: &'a ItemId) -> &'a str {
        match self.items.get(item) {
            Some(info) => &info.name,
            None => {
                warn!("Missing item definition for {}", item);
                item.as_str()
            },
        }
    }

    /// Number of known items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no items are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(ItemId, ItemInfo)> for ItemCatalog {
    fn from_iter<I: IntoIterator<Item = (ItemId, ItemInfo)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Recipes, tags and items, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
    tags: TagCatalog,
    items: ItemCatalog,
}

impl Catalog {
    /// Builds a catalog. Recipe IDs are reassigned to match their position.
    #[must_use]
    pub fn new(mut recipes: Vec<Recipe>, tags: TagCatalog, items: ItemCatalog) -> Self {
        for (index, recipe) in recipes.iter_mut().enumerate() {
            recipe.id = RecipeId::new(index as u32);
        }

        info!(
            "Catalog ready: {} recipes, {} tags, {} items",
            recipes.len(),
            tags.len(),
            items.len()
        );

        Self {
            recipes,
            tags,
            items,
        }
    }

    /// All recipes in catalog order.
    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Gets a recipe by ID.
    pub fn recipe(&self, id: RecipeId) -> CatalogResult<&Recipe> {
        self.recipes
            .get(id.index())
            .ok_or(CatalogError::UnknownRecipe(id))
    }

    /// The tag catalog.
    #[must_use]
    pub fn tags(&self) -> &TagCatalog {
        &self.tags
    }

    /// The item display catalog.
    #[must_use]
    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// Number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if there are no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// A matcher that resolves tags against this catalog.
    #[must_use]
    pub fn matcher(&self) -> RecipeMatcher<'_> {
        RecipeMatcher::new(&self.tags)
    }

    /// The first recipe, in catalog order, that the grid satisfies.
    #[must_use]
    pub fn find_first_match(&self, grid: &CraftingGrid) -> Option<&Recipe> {
        self.matcher().find_first_match(&self.recipes, grid)
    }
}
