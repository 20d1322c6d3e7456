//! # Craftle Engine
//!
//! Ties the puzzle crates to the outside world:
//! - Config: `craftle.toml` with command-line overrides
//! - Catalog loader: recipes, tags and item metadata from JSON
//! - App: the terminal front end

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod app;
pub mod catalog_loader;
pub mod config;

pub use app::{App, Args};
pub use catalog_loader::{CatalogLoadError, CatalogLoader, CatalogLoaderStats};
pub use config::CraftleConfig;
