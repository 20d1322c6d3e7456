//! # Craftle Common
//!
//! Common types shared by all Craftle crates:
//! - ID types (ItemId, TagId, RecipeId)
//! - Catalog lookup errors
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;
