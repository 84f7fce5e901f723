//! Simulation Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `METALMAN_SEED`, `METALMAN_FRAMES`,
//!    `METALMAN_SAVE_DIR`, `METALMAN_DEBUG`
//! 2. Config file: first existing of `metalman.toml`, `config/metalman.toml`
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! seed = 7
//! frames = 3600
//! frame_dt = 0.016666
//! enemy_count = 12
//! spawn_radius = 35.0
//! player_name = "Hero"
//! save_dir = "saves"
//! save_format = "json"   # json, binary
//! save_slot = "autosave"
//! debug = false
//!
//! [physics]
//! corpse_lifetime = 60.0
//! ```

use metal_gamestate::SaveFormat;
use metal_physics::{PhysicsConfig, PhysicsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Files searched for a config, in order
pub const CONFIG_PATHS: [&str; 2] = ["metalman.toml", "config/metalman.toml"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Invalid setting: {0}")]
    Invalid(String),

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the single random source
    pub seed: u64,
    /// Frames to simulate
    pub frames: u32,
    /// Seconds per frame
    pub frame_dt: f32,
    /// Enemies alive at once
    pub enemy_count: usize,
    /// Radius of the enemy spawn disc around the world origin
    pub spawn_radius: f32,
    pub player_name: String,
    pub save_dir: PathBuf,
    pub save_format: SaveFormat,
    pub save_slot: String,
    /// Enable debug logging
    pub debug: bool,
    pub physics: PhysicsConfig,
    /// File the config came from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            frames: 3_600,
            frame_dt: 1.0 / 60.0,
            enemy_count: 10,
            spawn_radius: 35.0,
            player_name: "Hero".to_string(),
            save_dir: PathBuf::from("saves"),
            save_format: SaveFormat::Json,
            save_slot: "autosave".to_string(),
            debug: false,
            physics: PhysicsConfig::default(),
            source: None,
        }
    }
}

impl SimConfig {
    /// Load from the standard locations and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let paths: Vec<&Path> = CONFIG_PATHS.iter().map(Path::new).collect();
        let mut config = Self::load_first(&paths)?;
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// First existing file wins; no file at all means defaults
    pub fn load_first(paths: &[&Path]) -> Result<Self, ConfigError> {
        match paths.iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `METALMAN_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("METALMAN_SEED") {
            self.seed = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "METALMAN_SEED",
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup("METALMAN_FRAMES") {
            self.frames = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "METALMAN_FRAMES",
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup("METALMAN_SAVE_DIR") {
            if !value.is_empty() {
                self.save_dir = PathBuf::from(value);
            }
        }

        if let Some(value) = lookup("METALMAN_DEBUG") {
            self.debug = matches!(value.trim(), "1" | "true" | "yes" | "on");
        }

        Ok(())
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_dt.is_nan() || self.frame_dt <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "frame_dt must be positive, got {}",
                self.frame_dt
            )));
        }
        if self.spawn_radius.is_nan() || self.spawn_radius < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "spawn_radius must not be negative, got {}",
                self.spawn_radius
            )));
        }
        if self.save_slot.is_empty() {
            return Err(ConfigError::Invalid("save_slot must not be empty".to_string()));
        }
        self.physics.validate()?;
        Ok(())
    }

    /// Log filter for the host
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    /// Print configuration summary
    pub fn log_summary(&self) {
        match &self.source {
            Some(path) => log::info!("Loaded config from {}", path.display()),
            None => log::info!("No config file found, using defaults"),
        }
        log::info!(
            "Seed {}, {} frames at {:.4}s, {} enemies within {:.0}m",
            self.seed,
            self.frames,
            self.frame_dt,
            self.enemy_count,
            self.spawn_radius
        );
        log::info!(
            "Saving '{}' to {} as {:?}",
            self.save_slot,
            self.save_dir.display(),
            self.save_format
        );
    }
}
