//! # Craftle Kernel
//!
//! The recipe-matching engine behind Craftle.
//!
//! This crate provides:
//! - Recipe data structures (shaped, shapeless)
//! - Item tags and transitive tag expansion with cycle detection
//! - The 3×3 crafting grid
//! - Exact recipe matching at any grid offset
//! - The read-only catalog shared by game sessions
//!
//! ## Matching
//!
//! Matching is exact: a grid satisfies a recipe only when every placed item
//! is consumed by one ingredient position and every position is filled.
//! Catalog scans resolve ambiguity by catalog order (first match wins).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod crafting_grid;
pub mod recipe;
pub mod tags;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalog::*;
    pub use crate::crafting_grid::*;
    pub use crate::recipe::*;
    pub use crate::tags::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use craftle_common::{ItemId, RecipeId};

    #[test]
    fn test_catalog_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }

    #[test]
    fn test_tagged_shaped_recipe_end_to_end() {
        let tags = TagCatalog::new()
            .with_tag("planks", ["minecraft:oak_planks", "minecraft:spruce_planks"]);
        let recipes = vec![Recipe::shaped(
            RecipeId::new(0),
            ShapedPattern::new(&["##", "##"]).with_key('#', IngredientSpec::tag("minecraft:planks")),
            "minecraft:crafting_table",
        )];
        let catalog = Catalog::new(recipes, tags, ItemCatalog::new());

        let mut grid = CraftingGrid::new();
        for index in [4, 5, 7, 8] {
            grid.set(index, Some(ItemId::new("minecraft:oak_planks")));
        }
        grid.set(8, Some(ItemId::new("minecraft:spruce_planks")));

        let found = catalog.find_first_match(&grid).expect("crafting table");
        assert_eq!(found.result_item().as_str(), "minecraft:crafting_table");
    }
}
