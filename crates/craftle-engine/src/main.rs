//! # Craftle
//!
//! Entry point for the terminal crafting puzzle.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::Result;
use clap::Parser;
use craftle_engine::{app, Args};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*};

/// Main entry point.
fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.resolve_config();

    // Initialize tracing on stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(config.env_filter())
        .init();

    info!("Craftle starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    app::run(&args, config)?;

    info!("Craftle shutdown complete");
    Ok(())
}
