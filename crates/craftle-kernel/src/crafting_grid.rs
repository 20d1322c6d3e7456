//! Crafting Grid Computation
//!
//! This module provides the 3×3 crafting grid and the exact recipe matcher:
//!
//! - Shaped recipes may be placed at any offset that keeps the pattern inside
//!   the grid; every cell's occupancy must agree with the translated pattern.
//! - Shapeless recipes need a one-to-one assignment between placed items and
//!   ingredient specs, with no leftovers on either side.
//! - Ingredient positions accept items through tags (see [`crate::tags`]).
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐     ┌────────────────┐     ┌────────────────┐
//! │ CraftingGrid  │────▶│ RecipeMatcher  │◀────│  TagExpander   │
//! │ (player input)│     │ (exact match)  │     │ (tag → items)  │
//! └───────────────┘     └────────────────┘     └────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use craftle_common::RecipeId;
//! use craftle_kernel::crafting_grid::{CraftingGrid, RecipeMatcher};
//! use craftle_kernel::recipe::{IngredientSpec, Recipe, ShapedPattern};
//! use craftle_kernel::tags::TagCatalog;
//!
//! let tags = TagCatalog::new();
//! let torch = Recipe::shaped(
//!     RecipeId::new(0),
//!     ShapedPattern::new(&["X"]).with_key('X', IngredientSpec::item("minecraft:stick")),
//!     "minecraft:torch",
//! );
//!
//! let mut grid = CraftingGrid::new();
//! grid.set(4, Some("minecraft:stick".into()));
//!
//! let matcher = RecipeMatcher::new(&tags);
//! assert_eq!(matcher.matches(&torch, &grid), Ok(true));
//! ```

use ahash::AHashMap;
use craftle_common::{CatalogResult, ItemId};
use tracing::{debug, warn};

use crate::recipe::{IngredientSpec, Recipe, RecipeKind, ShapedPattern};
use crate::tags::{ItemSet, TagCatalog, TagExpander};

/// Grid width and height.
pub const GRID_SIZE: usize = 3;

/// Number of cells in the grid.
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Slot content: item ID or None for empty.
pub type SlotContent = Option<ItemId>;

/// The 3×3 crafting input, stored in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CraftingGrid {
    cells: [SlotContent; GRID_CELLS],
}

impl CraftingGrid {
    /// Create an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the item at a cell index, or None if empty or out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ItemId> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    /// Set the content of a cell. Returns false if out of bounds.
    pub fn set(&mut self, index: usize, item: SlotContent) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = item;
                true
            },
            None => false,
        }
    }

    /// Clear all cells.
    pub fn clear(&mut self) {
        self.cells = Default::default();
    }

    /// Check if the grid is completely empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Count non-empty cells.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[SlotContent; GRID_CELLS] {
        &self.cells
    }

    /// Occupied cells as (index, item) pairs in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &ItemId)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.as_ref().map(|item| (index, item)))
    }
}

/// Exact recipe matcher.
///
/// Matching is a pure predicate over a recipe and a grid; the matcher only
/// borrows the tag catalog.
#[derive(Debug, Clone, Copy)]
pub struct RecipeMatcher<'a> {
    expander: TagExpander<'a>,
}

impl<'a> RecipeMatcher<'a> {
    /// Create a matcher that resolves tags against `tags`.
    #[must_use]
    pub const fn new(tags: &'a TagCatalog) -> Self {
        Self {
            expander: TagExpander::new(tags),
        }
    }

    /// Check if a grid exactly satisfies a recipe.
    ///
    /// Fails only when an ingredient refers to an unknown or cyclic tag.
    /// Malformed patterns and unsupported recipe kinds never match.
    pub fn matches(&self, recipe: &Recipe, grid: &CraftingGrid) -> CatalogResult<bool> {
        match &recipe.kind {
            RecipeKind::Shaped(pattern) => self.matches_shaped(pattern, grid),
            RecipeKind::Shapeless(ingredients) => self.matches_shapeless(ingredients, grid),
            RecipeKind::Unsupported(kind) => {
                debug!("Recipe {} has unsupported type {}", recipe.id, kind);
                Ok(false)
            },
        }
    }

    /// Find the first recipe, in slice order, that matches the grid.
    ///
    /// Recipes whose ingredients cannot be resolved are logged and skipped.
    #[must_use]
    pub fn find_first_match<'r>(
        &self,
        recipes: &'r [Recipe],
        grid: &CraftingGrid,
    ) -> Option<&'r Recipe> {
        if grid.is_empty() {
            return None;
        }

        recipes
            .iter()
            .find(|recipe| match self.matches(recipe, grid) {
                Ok(matched) => matched,
                Err(e) => {
                    warn!("Skipping {} ({}): {}", recipe.id, recipe.result.item, e);
                    false
                },
            })
    }

    /// Check if grid matches a shaped recipe at any offset.
    fn matches_shaped(&self, pattern: &ShapedPattern, grid: &CraftingGrid) -> CatalogResult<bool> {
        let height = pattern.height();
        let width = pattern.width();
        if height == 0 || width == 0 || height > GRID_SIZE || width > GRID_SIZE {
            debug!("Shaped pattern {}x{} cannot fit the grid", width, height);
            return Ok(false);
        }

        let mut allowed: AHashMap<char, ItemSet> = AHashMap::default();
        for key in pattern.used_keys() {
            let Some(spec) = pattern.key.get(&key) else {
                debug!("Shaped pattern uses undefined key '{}'", key);
                return Ok(false);
            };
            allowed.insert(key, self.expander.expand(spec)?);
        }

        for row_offset in 0..=(GRID_SIZE - height) {
            for col_offset in 0..=(GRID_SIZE - width) {
                let Some(layout) = pattern.layout(GRID_SIZE, row_offset, col_offset) else {
                    continue;
                };
                if Self::layout_matches(&layout, grid, &allowed) {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    /// Check every cell of one translated placement.
    fn layout_matches(
        layout: &[Option<char>],
        grid: &CraftingGrid,
        allowed: &AHashMap<char, ItemSet>,
    ) -> bool {
        layout
            .iter()
            .zip(grid.cells())
            .all(|(key, cell)| match (key, cell) {
                (None, None) => true,
                (Some(key), Some(item)) => allowed.get(key).is_some_and(|set| set.contains(item)),
                _ => false,
            })
    }

    /// Check if grid matches a shapeless recipe.
    ///
    /// Specs are assigned to cells in recipe order, scanning cells row-major;
    /// an earlier assignment is moved when that frees a cell for a later spec,
    /// so the match succeeds exactly when a one-to-one assignment exists.
    fn matches_shapeless(
        &self,
        ingredients: &[IngredientSpec],
        grid: &CraftingGrid,
    ) -> CatalogResult<bool> {
        let placed: Vec<&ItemId> = grid.occupied().map(|(_, item)| item).collect();
        if placed.len() != ingredients.len() {
            return Ok(false);
        }

        let mut candidates = Vec::with_capacity(ingredients.len());
        for spec in ingredients {
            let allowed = self.expander.expand(spec)?;
            let cells: Vec<usize> = placed
                .iter()
                .enumerate()
                .filter(|(_, item)| allowed.contains(**item))
                .map(|(slot, _)| slot)
                .collect();
            if cells.is_empty() {
                return Ok(false);
            }
            candidates.push(cells);
        }

        let mut owner: Vec<Option<usize>> = vec![None; placed.len()];
        for ingredient in 0..ingredients.len() {
            let mut visited = vec![false; placed.len()];
            if !Self::assign(ingredient, &candidates, &mut owner, &mut visited) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Augmenting-path step: give `ingredient` a cell, displacing an earlier
    /// ingredient onto another of its candidates if necessary.
    fn assign(
        ingredient: usize,
        candidates: &[Vec<usize>],
        owner: &mut [Option<usize>],
        visited: &mut [bool],
    ) -> bool {
        for &slot in &candidates[ingredient] {
            if visited[slot] {
                continue;
            }
            visited[slot] = true;

            let free = match owner[slot] {
                None => true,
                Some(other) => Self::assign(other, candidates, owner, visited),
            };
            if free {
                owner[slot] = Some(ingredient);
                return true;
            }
        }
        false
    }
}
