//! Engine settings
//!
//! Persisted as JSON next to the host. A missing or unreadable file falls
//! back to defaults.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Viewport ===
    /// Drawing area width (pixels)
    pub viewport_width: f32,
    /// Drawing area height (pixels)
    pub viewport_height: f32,

    // === Determinism ===
    /// Replaces the wall clock in map seeds and enemy spawns, making runs
    /// reproducible
    pub fixed_seed: Option<u32>,

    // === Debug drawing ===
    /// Faint tile grid behind the map
    pub show_grid: bool,
    pub show_hud: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_width: 960.0,
            viewport_height: 640.0,
            fixed_seed: None,
            show_grid: true,
            show_hud: true,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(SettingsError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Salt folded into each level's map seed
    pub fn seed_salt(&self) -> u32 {
        self.fixed_seed.unwrap_or_else(|| wall_clock_ms() as u32)
    }

    /// Seed for enemy spawn positions
    pub fn spawn_seed(&self) -> u64 {
        self.fixed_seed.map(u64::from).unwrap_or_else(wall_clock_ms)
    }
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
