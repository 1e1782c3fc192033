//! Configuration management for chroma-recall
//!
//! Config file location:
//! - Linux: ~/.config/chroma-recall/config.toml
//! - macOS: ~/Library/Application Support/com.forgemypc.chroma-recall/config.toml
//! - Windows: %APPDATA%/forgemypc/chroma-recall/config/config.toml
//!
//! You can override the config location by setting `CHROMA_RECALL_CONFIG_PATH`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::difficulty::{CurveTuning, DifficultyCurve};
use crate::engine::{GameEngine, RandomSource, Rules};
use crate::generator::{ColorSetGenerator, GeneratorTuning};

pub const CONFIG_PATH_ENV: &str = "CHROMA_RECALL_CONFIG_PATH";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Player preferences
    #[serde(default)]
    pub player: PlayerConfig,

    /// Matching, combo and scoring rules
    #[serde(default)]
    pub rules: Rules,

    /// Difficulty curve breakpoints
    #[serde(default)]
    pub difficulty: CurveTuning,

    /// Color-set generation limits
    #[serde(default)]
    pub generator: GeneratorTuning,

    /// Leaderboard display and caching
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, toml)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let proj_dirs = ProjectDirs::from("com", "forgemypc", "chroma-recall")
            .context("Could not determine project directories")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Create default config file if it doesn't exist
    pub fn init() -> Result<Self> {
        let config = Self::load()?;

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            config.save()?;
        }

        Ok(config)
    }

    pub fn curve(&self) -> DifficultyCurve {
        DifficultyCurve::new(self.difficulty.clone())
    }

    pub fn generator(&self) -> ColorSetGenerator {
        ColorSetGenerator::new(self.generator.clone())
    }

    /// Engine wired with these rules and entropy-seeded colors.
    pub fn build_engine(&self) -> GameEngine {
        GameEngine::new(
            self.rules.clone(),
            self.curve(),
            Box::new(RandomSource::from_entropy(self.generator())),
        )
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Name recorded with saved scores
    #[serde(default = "default_username")]
    pub username: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
        }
    }
}

fn default_username() -> String {
    "player".to_string()
}

/// Leaderboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// How long a fetched top-N list is reused
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Entries shown and cached
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl_seconds(),
            capacity: default_capacity(),
        }
    }
}

impl LeaderboardConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

fn default_cache_ttl_seconds() -> u64 {
    60
}

fn default_capacity() -> usize {
    10
}

/// Get configuration file path for display purposes
pub fn get_config_path() -> Result<String> {
    let path = Config::config_path()?;
    Ok(path.display().to_string())
}
