//! Error types shared across Craftle crates.

use thiserror::Error;

use crate::ids::{RecipeId, TagId};

/// Lookup failures against the read-only catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A recipe or tag referenced a tag the catalog does not define.
    #[error("Unknown tag: {0}")]
    UnknownTag(TagId),

    /// A tag reaches itself through nested references.
    #[error("Tag {tag} is part of a reference cycle")]
    TagCycle {
        /// Tag that was reached a second time on the same resolution path.
        tag: TagId,
    },

    /// A recipe ID outside the catalog.
    #[error("Unknown recipe: {0}")]
    UnknownRecipe(RecipeId),
}

/// Result type alias for catalog lookups.
pub type CatalogResult<T> = Result<T, CatalogError>;
