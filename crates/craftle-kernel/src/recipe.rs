//! Recipe definitions and ingredient specifications.
//!
//! A recipe is either *shaped* (a pattern of single-character keys that must
//! appear in the grid in that arrangement) or *shapeless* (an unordered
//! multiset of ingredients). Every ingredient position holds an
//! [`IngredientSpec`]: one item, one tag, or a list of alternatives.

use std::collections::BTreeMap;

use craftle_common::{ItemId, RecipeId, TagId};
use serde::{Deserialize, Serialize};

/// Cell marker for an empty position inside a shaped pattern.
pub const EMPTY_KEY: char = ' ';

/// Recipe type string for shaped crafting recipes.
pub const SHAPED_TYPE: &str = "minecraft:crafting_shaped";

/// Recipe type string for shapeless crafting recipes.
pub const SHAPELESS_TYPE: &str = "minecraft:crafting_shapeless";

// ============================================================================
// Ingredients
// ============================================================================

/// One alternative inside an ingredient position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngredientChoice {
    /// A literal item.
    Item {
        /// Item identifier.
        item: ItemId,
    },
    /// Any item in a tag.
    Tag {
        /// Tag identifier.
        tag: TagId,
    },
}

/// Ingredient specification for one recipe position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngredientSpec {
    /// Exactly one choice.
    Single(IngredientChoice),
    /// Any one of several choices.
    AnyOf(Vec<IngredientChoice>),
}

impl IngredientSpec {
    /// Spec that accepts a single literal item.
    #[must_use]
    pub fn item(item: impl Into<ItemId>) -> Self {
        Self::Single(IngredientChoice::Item { item: item.into() })
    }

    /// Spec that accepts any member of a tag.
    #[must_use]
    pub fn tag(tag: impl Into<TagId>) -> Self {
        Self::Single(IngredientChoice::Tag { tag: tag.into() })
    }

    /// Spec that accepts any of the given choices.
    #[must_use]
    pub fn any_of(choices: Vec<IngredientChoice>) -> Self {
        Self::AnyOf(choices)
    }

    /// Returns the choices as a list; a single choice becomes a one-element slice.
    #[must_use]
    pub fn choices(&self) -> &[IngredientChoice] {
        match self {
            Self::Single(choice) => std::slice::from_ref(choice),
            Self::AnyOf(choices) => choices,
        }
    }
}

// ============================================================================
// Shaped patterns
// ============================================================================

/// A shaped pattern: rows of key characters plus the key → ingredient map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapedPattern {
    /// Pattern rows, top to bottom. A space is an empty cell.
    pub rows: Vec<String>,
    /// Ingredient for each key character.
    pub key: BTreeMap<char, IngredientSpec>,
}

impl ShapedPattern {
    /// Creates a pattern with no keys defined yet.
    #[must_use]
    pub fn new<S: AsRef<str>>(rows: &[S]) -> Self {
        Self {
            rows: rows.iter().map(|row| row.as_ref().to_string()).collect(),
            key: BTreeMap::new(),
        }
    }

    /// Defines the ingredient for a key character.
    #[must_use]
    pub fn with_key(mut self, key: char, spec: IngredientSpec) -> Self {
        self.key.insert(key, spec);
        self
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (the longest row).
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Returns the distinct non-empty key characters used by the rows.
    #[must_use]
    pub fn used_keys(&self) -> Vec<char> {
        let mut keys: Vec<char> = self
            .rows
            .iter()
            .flat_map(|row| row.chars())
            .filter(|&c| c != EMPTY_KEY)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Places the pattern on a `grid_size`×`grid_size` grid at the given offset,
    /// returning the key for every cell in row-major order.
    ///
    /// Cells outside the pattern, and cells past the end of a short row, are
    /// `None`. Returns `None` if the pattern does not fit at that offset.
    #[must_use]
    pub fn layout(
        &self,
        grid_size: usize,
        row_offset: usize,
        col_offset: usize,
    ) -> Option<Vec<Option<char>>> {
        if row_offset + self.height() > grid_size || col_offset + self.width() > grid_size {
            return None;
        }

        let mut cells = vec![None; grid_size * grid_size];
        for (row, line) in self.rows.iter().enumerate() {
            for (col, key) in line.chars().enumerate() {
                if key != EMPTY_KEY {
                    cells[(row + row_offset) * grid_size + col + col_offset] = Some(key);
                }
            }
        }
        Some(cells)
    }
}

// ============================================================================
// Recipes
// ============================================================================

/// The crafted output of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeResult {
    /// Output item.
    pub item: ItemId,
    /// Output quantity.
    #[serde(default = "default_count")]
    pub count: u32,
}

const fn default_count() -> u32 {
    1
}

/// Recipe variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipeKind {
    /// Ingredients must appear in the pattern's arrangement.
    Shaped(ShapedPattern),
    /// Ingredients may appear anywhere, one grid item per ingredient.
    Shapeless(Vec<IngredientSpec>),
    /// Any other recipe type. Never matches a grid.
    Unsupported(String),
}

impl RecipeKind {
    /// The recipe type string this kind corresponds to.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Shaped(_) => SHAPED_TYPE,
            Self::Shapeless(_) => SHAPELESS_TYPE,
            Self::Unsupported(name) => name,
        }
    }
}

/// A crafting recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Recipe identifier (catalog position).
    pub id: RecipeId,
    /// Recipe shape.
    pub kind: RecipeKind,
    /// Crafted output.
    pub result: RecipeResult,
    /// Optional recipe-book group.
    #[serde(default)]
    pub group: Option<String>,
}

impl Recipe {
    /// Creates a recipe producing one `result`.
    #[must_use]
    pub fn new(id: RecipeId, kind: RecipeKind, result: impl Into<ItemId>) -> Self {
        Self {
            id,
            kind,
            result: RecipeResult {
                item: result.into(),
                count: 1,
            },
            group: None,
        }
    }

    /// Creates a shaped recipe.
    #[must_use]
    pub fn shaped(id: RecipeId, pattern: ShapedPattern, result: impl Into<ItemId>) -> Self {
        Self::new(id, RecipeKind::Shaped(pattern), result)
    }

    /// Creates a shapeless recipe.
    #[must_use]
    pub fn shapeless(
        id: RecipeId,
        ingredients: Vec<IngredientSpec>,
        result: impl Into<ItemId>,
    ) -> Self {
        Self::new(id, RecipeKind::Shapeless(ingredients), result)
    }

    /// Sets the output quantity.
    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.result.count = count;
        self
    }

    /// The crafted item.
    #[must_use]
    pub fn result_item(&self) -> &ItemId {
        &self.result.item
    }

    /// Check if this is a shaped recipe.
    #[must_use]
    pub const fn is_shaped(&self) -> bool {
        matches!(self.kind, RecipeKind::Shaped(_))
    }

    /// Check if this is a shapeless recipe.
    #[must_use]
    pub const fn is_shapeless(&self) -> bool {
        matches!(self.kind, RecipeKind::Shapeless(_))
    }

    /// Every ingredient spec the recipe refers to.
    ///
    /// Shaped recipes yield each key's spec once, regardless of how many
    /// cells use it.
    pub fn ingredient_specs(&self) -> Box<dyn Iterator<Item = &IngredientSpec> + '_> {
        match &self.kind {
            RecipeKind::Shaped(pattern) => Box::new(pattern.key.values()),
            RecipeKind::Shapeless(ingredients) => Box::new(ingredients.iter()),
            RecipeKind::Unsupported(_) => Box::new(std::iter::empty()),
        }
    }
}
