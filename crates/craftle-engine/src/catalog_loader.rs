//! Catalog asset loading.
//!
//! This module provides:
//! - Loading the recipe list, tag map, and item metadata JSON documents
//! - Filtering recipes down to shaped and shapeless crafting
//! - Recipe validation on load (invalid records are skipped and counted)
//! - A consistency pass that reports recipes referring to unknown tags

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use craftle_common::{ItemId, RecipeId, TagId};
use craftle_kernel::catalog::{Catalog, ItemCatalog, ItemInfo};
use craftle_kernel::crafting_grid::{GRID_CELLS, GRID_SIZE};
use craftle_kernel::recipe::{
    IngredientSpec, Recipe, RecipeKind, RecipeResult, ShapedPattern, EMPTY_KEY, SHAPED_TYPE,
    SHAPELESS_TYPE,
};
use craftle_kernel::tags::{TagCatalog, TagEntry};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CraftleConfig;

/// Errors that can occur during catalog loading.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// File not found.
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read catalog file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse JSON.
    #[error("Failed to parse catalog JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Validation error.
    #[error("Recipe validation error: {0}")]
    ValidationError(String),
}

/// Result type for catalog loading operations.
pub type CatalogLoadResult<T> = Result<T, CatalogLoadError>;

/// A crafting recipe record as stored in the recipe list.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeRecord {
    /// Recipe type, e.g. `minecraft:crafting_shaped`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Recipe-book group.
    #[serde(default)]
    pub group: Option<String>,
    /// Shaped pattern rows.
    #[serde(default)]
    pub pattern: Option<Vec<String>>,
    /// Shaped key map.
    #[serde(default)]
    pub key: Option<BTreeMap<String, IngredientSpec>>,
    /// Shapeless ingredient list.
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientSpec>>,
    /// Crafted output.
    pub result: RecipeResult,
}

impl RecipeRecord {
    /// Validates the record and converts it into a catalog recipe.
    pub fn into_recipe(self, id: RecipeId) -> CatalogLoadResult<Recipe> {
        if self.result.item.as_str().is_empty() {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe {id} has no result item"
            )));
        }
        if self.result.count == 0 {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe {id} has zero output count"
            )));
        }

        let kind = match self.kind.as_str() {
            SHAPED_TYPE => RecipeKind::Shaped(Self::shaped_pattern(id, self.pattern, self.key)?),
            SHAPELESS_TYPE => {
                let ingredients = self.ingredients.unwrap_or_default();
                if ingredients.is_empty() || ingredients.len() > GRID_CELLS {
                    return Err(CatalogLoadError::ValidationError(format!(
                        "Recipe {id} has {} shapeless ingredients",
                        ingredients.len()
                    )));
                }
                RecipeKind::Shapeless(ingredients)
            },
            other => {
                return Err(CatalogLoadError::ValidationError(format!(
                    "Recipe {id} has unsupported type {other}"
                )))
            },
        };

        Ok(Recipe {
            id,
            kind,
            result: self.result,
            group: self.group.filter(|group| !group.is_empty()),
        })
    }

    fn shaped_pattern(
        id: RecipeId,
        pattern: Option<Vec<String>>,
        key: Option<BTreeMap<String, IngredientSpec>>,
    ) -> CatalogLoadResult<ShapedPattern> {
        let (Some(rows), Some(key)) = (pattern, key) else {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe {id} is missing its pattern or key"
            )));
        };

        let mut shaped = ShapedPattern::new(&rows);
        if shaped.height() == 0
            || shaped.width() == 0
            || shaped.height() > GRID_SIZE
            || shaped.width() > GRID_SIZE
        {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe {id} pattern is {}x{}",
                shaped.width(),
                shaped.height()
            )));
        }

        for (symbol, spec) in key {
            let mut chars = symbol.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c != EMPTY_KEY => {
                    shaped.key.insert(c, spec);
                },
                _ => {
                    return Err(CatalogLoadError::ValidationError(format!(
                        "Recipe {id} has invalid key {symbol:?}"
                    )))
                },
            }
        }

        if let Some(missing) = shaped
            .used_keys()
            .into_iter()
            .find(|c| !shaped.key.contains_key(c))
        {
            return Err(CatalogLoadError::ValidationError(format!(
                "Recipe {id} uses undefined key {missing:?}"
            )));
        }

        Ok(shaped)
    }
}

/// A tag document entry.
#[derive(Debug, Clone, Deserialize)]
struct TagRecord {
    values: Vec<TagEntry>,
}

/// Statistics for the catalog loader.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogLoaderStats {
    /// Recipes accepted into the catalog.
    pub recipes_loaded: u32,
    /// Records of other recipe types that were filtered out.
    pub recipes_filtered: u32,
    /// Records rejected by validation.
    pub validation_errors: u32,
    /// Accepted recipes that refer to unknown or cyclic tags.
    pub unresolved_recipes: u32,
    /// Tags loaded.
    pub tags_loaded: u32,
    /// Item definitions loaded.
    pub items_loaded: u32,
}

/// Loads the three catalog documents into a [`Catalog`].
pub struct CatalogLoader {
    /// Recipe list path.
    recipes_path: PathBuf,
    /// Tag map path.
    tags_path: PathBuf,
    /// Item metadata path.
    items_path: PathBuf,
    /// Statistics.
    stats: CatalogLoaderStats,
}

impl CatalogLoader {
    /// Creates a loader for the default file names inside `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let defaults = CraftleConfig {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..CraftleConfig::default()
        };
        Self::from_config(&defaults)
    }

    /// Creates a loader for the paths named in `config`.
    #[must_use]
    pub fn from_config(config: &CraftleConfig) -> Self {
        info!("Initializing catalog loader at: {:?}", config.data_dir);
        Self {
            recipes_path: config.recipes_path(),
            tags_path: config.tags_path(),
            items_path: config.items_path(),
            stats: CatalogLoaderStats::default(),
        }
    }

    /// Returns loader statistics.
    #[must_use]
    pub fn stats(&self) -> &CatalogLoaderStats {
        &self.stats
    }

    /// Loads and validates the whole catalog.
    ///
    /// Recipes and tags are required; missing item metadata only degrades
    /// display names.
    pub fn load(&mut self) -> CatalogLoadResult<Catalog> {
        self.stats = CatalogLoaderStats::default();

        let recipes_json = Self::read_required(&self.recipes_path)?;
        let tags_json = Self::read_required(&self.tags_path)?;

        let recipes = self.parse_recipes(&recipes_json)?;
        let tags = self.parse_tags(&tags_json)?;

        let items = if self.items_path.exists() {
            let items_json = fs::read_to_string(&self.items_path)?;
            self.parse_items(&items_json)?
        } else {
            warn!(
                "Item metadata {:?} not found, names will fall back to IDs",
                self.items_path
            );
            ItemCatalog::new()
        };

        let catalog = Catalog::new(recipes, tags, items);
        self.check_references(&catalog);

        info!(
            "Loaded {} recipes ({} filtered, {} invalid, {} unresolved)",
            self.stats.recipes_loaded,
            self.stats.recipes_filtered,
            self.stats.validation_errors,
            self.stats.unresolved_recipes
        );

        Ok(catalog)
    }

    /// Parses the recipe list, keeping valid shaped and shapeless records in
    /// file order.
    pub fn parse_recipes(&mut self, json: &str) -> CatalogLoadResult<Vec<Recipe>> {
        let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut recipes = Vec::with_capacity(records.len());

        for (position, value) in records.into_iter().enumerate() {
            let kind = value.get("type").and_then(serde_json::Value::as_str);
            if !matches!(kind, Some(SHAPED_TYPE | SHAPELESS_TYPE)) {
                debug!("Filtered record {} of type {:?}", position, kind);
                self.stats.recipes_filtered += 1;
                continue;
            }

            let id = RecipeId::new(recipes.len() as u32);
            let parsed = serde_json::from_value::<RecipeRecord>(value)
                .map_err(CatalogLoadError::from)
                .and_then(|record| record.into_recipe(id));

            match parsed {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => {
                    warn!("Invalid recipe record {}: {}", position, e);
                    self.stats.validation_errors += 1;
                },
            }
        }

        self.stats.recipes_loaded = recipes.len() as u32;
        Ok(recipes)
    }

    /// Parses the tag map.
    pub fn parse_tags(&mut self, json: &str) -> CatalogLoadResult<TagCatalog> {
        let records: BTreeMap<TagId, TagRecord> = serde_json::from_str(json)?;
        let mut tags = TagCatalog::new();
        for (tag, record) in records {
            tags.insert(tag, record.values);
        }
        self.stats.tags_loaded = tags.len() as u32;
        Ok(tags)
    }

    /// Parses the item metadata map.
    pub fn parse_items(&mut self, json: &str) -> CatalogLoadResult<ItemCatalog> {
        let records: BTreeMap<ItemId, ItemInfo> = serde_json::from_str(json)?;
        let items: ItemCatalog = records.into_iter().collect();
        self.stats.items_loaded = items.len() as u32;
        Ok(items)
    }

    fn read_required(path: &Path) -> CatalogLoadResult<String> {
        if !path.exists() {
            return Err(CatalogLoadError::NotFound(path.to_path_buf()));
        }
        debug!("Loading catalog file: {:?}", path);
        Ok(fs::read_to_string(path)?)
    }

    /// Logs every recipe whose ingredients cannot be resolved. Such recipes
    /// stay in the catalog but will never match.
    fn check_references(&mut self, catalog: &Catalog) {
        let expander = catalog.tags().expander();
        for recipe in catalog.recipes() {
            if let Some(e) = recipe
                .ingredient_specs()
                .find_map(|spec| expander.expand(spec).err())
            {
                warn!("{} ({}) cannot be resolved: {}", recipe.id, recipe.result.item, e);
                self.stats.unresolved_recipes += 1;
            }
        }
    }
}
