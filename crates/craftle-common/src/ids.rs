//! ID types for items, tags, and recipes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace assumed for tag references that omit one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Marker that distinguishes a nested tag reference from a literal item
/// inside a tag's value list.
pub const TAG_REFERENCE_PREFIX: char = '#';

/// Identifier of a concrete item, e.g. `minecraft:stick`.
///
/// Items are opaque: only identity and equality are ever inspected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an item ID from its namespaced name.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of an item tag (a named item category such as "any plank").
///
/// Tag names are normalised on construction: a leading `#` is dropped and a
/// missing namespace defaults to [`DEFAULT_NAMESPACE`], so `planks`,
/// `minecraft:planks` and `#minecraft:planks` all name the same tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct TagId(String);

impl TagId {
    /// Creates a normalised tag ID.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        let name = name.strip_prefix(TAG_REFERENCE_PREFIX).unwrap_or(name);
        if name.contains(':') {
            Self(name.to_string())
        } else {
            Self(format!("{DEFAULT_NAMESPACE}:{name}"))
        }
    }

    /// Returns the namespaced tag name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TAG_REFERENCE_PREFIX}{}", self.0)
    }
}

impl From<String> for TagId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for TagId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Unique identifier for a recipe: its position in the loaded catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecipeId(u32);

impl RecipeId {
    /// Creates a recipe ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the catalog index this ID refers to.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recipe#{}", self.0)
    }
}
