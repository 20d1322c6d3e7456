//! Game configuration.
//!
//! Provides data locations, the puzzle mode, and logging settings.
//! Configuration can be loaded from and saved to a TOML file.

use craftle_gameplay::daily::PuzzleMode;
use craftle_gameplay::session::MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Configuration file name.
pub const CONFIG_FILE: &str = "craftle.toml";

/// Game configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftleConfig {
    // === Data Files ===
    /// Directory holding the catalog documents
    pub data_dir: PathBuf,
    /// Recipe list file name
    pub recipes_file: String,
    /// Tag map file name
    pub tags_file: String,
    /// Item display metadata file name
    pub items_file: String,

    // === Puzzle Settings ===
    /// Daily or random target
    pub mode: PuzzleMode,
    /// Attempts per puzzle
    pub max_attempts: u32,
    /// Offer recipe results in the ingredient palette too
    pub palette_includes_results: bool,

    // === Debug Settings ===
    /// Default tracing filter (overridden by RUST_LOG)
    pub log_filter: String,
}

impl Default for CraftleConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("static"),
            recipes_file: "recipes.json".to_string(),
            tags_file: "tags.json".to_string(),
            items_file: "items.json".to_string(),

            mode: PuzzleMode::Daily,
            max_attempts: MAX_ATTEMPTS,
            palette_includes_results: false,

            log_filter: "craftle=info".to_string(),
        }
    }
}

impl CraftleConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str::<Self>(&contents) {
            Ok(mut config) => {
                config.validate();
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.max_attempts = self.max_attempts.clamp(1, 999);
        if self.log_filter.trim().is_empty() {
            self.log_filter = Self::default().log_filter;
        } else if let Err(e) = EnvFilter::try_new(&self.log_filter) {
            warn!("Invalid log_filter {:?}: {e}", self.log_filter);
            self.log_filter = Self::default().log_filter;
        }
    }

    /// Tracing filter for the binary: `RUST_LOG` when set and valid,
    /// otherwise `log_filter`.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        Self::filter_from(env.as_deref(), &self.log_filter)
    }

    fn filter_from(env: Option<&str>, log_filter: &str) -> EnvFilter {
        env.filter(|directives| !directives.trim().is_empty())
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .or_else(|| EnvFilter::try_new(log_filter).ok())
            .unwrap_or_else(|| EnvFilter::new(Self::default().log_filter))
    }

    /// Full path of the recipe list.
    #[must_use]
    pub fn recipes_path(&self) -> PathBuf {
        self.data_dir.join(&self.recipes_file)
    }

    /// Full path of the tag map.
    #[must_use]
    pub fn tags_path(&self) -> PathBuf {
        self.data_dir.join(&self.tags_file)
    }

    /// Full path of the item metadata.
    #[must_use]
    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join(&self.items_file)
    }
}
