//! # Craftle Gameplay
//!
//! Game rules on top of the matching kernel:
//! - Puzzle session with attempt counting and the solved/exhausted outcomes
//! - Daily target selection (date-seeded Mulberry32) and random practice mode
//! - Ingredient palette for the selection UI

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod daily;
pub mod palette;
pub mod session;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::daily::*;
    pub use crate::palette::*;
    pub use crate::session::*;
}

pub use prelude::*;
