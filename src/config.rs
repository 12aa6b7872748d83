//! Configuration Module
//! Read-only startup settings loaded from a JSON file.

use crate::data::{METADATA_FILE, PER_DAY_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "MYWORLD_EXPLORER_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "explorer.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Startup configuration.
///
/// Read-only JSON; fields use `#[serde(default)]` so partial files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // Data
    pub data_dir: PathBuf,
    pub per_day_file: String,
    pub metadata_file: String,
    /// Added to every daily vote count.
    pub count_offset: i64,

    // Interaction
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub transition_secs: f32,

    // Layout
    pub count_chart_height: f32,
    pub focus_chart_height: f32,

    // Export
    pub export_width: u32,
    pub export_height: u32,
    pub open_after_export: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            per_day_file: PER_DAY_FILE.to_string(),
            metadata_file: METADATA_FILE.to_string(),
            count_offset: 1,

            zoom_min: 1.0,
            zoom_max: 20.0,
            transition_secs: 0.25,

            count_chart_height: 200.0,
            focus_chart_height: 280.0,

            export_width: 1400,
            export_height: 1200,
            open_after_export: true,
        }
    }
}

impl AppConfig {
    /// Load config from `$MYWORLD_EXPLORER_CONFIG` or `./explorer.json`,
    /// falling back to defaults on any error.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_path(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.sanitize();
        Ok(config)
    }

    /// Zoom scale extent as `(min, max)`.
    pub fn zoom_extent(&self) -> (f64, f64) {
        (self.zoom_min, self.zoom_max)
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();

        if !(self.zoom_min.is_finite() && self.zoom_min > 0.0) {
            log::warn!("zoom_min {} is not positive, using {}", self.zoom_min, defaults.zoom_min);
            self.zoom_min = defaults.zoom_min;
        }
        if !(self.zoom_max.is_finite() && self.zoom_max > 0.0) {
            log::warn!("zoom_max {} is not positive, using {}", self.zoom_max, defaults.zoom_max);
            self.zoom_max = defaults.zoom_max;
        }
        if self.zoom_min > self.zoom_max {
            std::mem::swap(&mut self.zoom_min, &mut self.zoom_max);
        }
        if !(self.transition_secs >= 0.0) {
            self.transition_secs = defaults.transition_secs;
        }
        self.export_width = self.export_width.max(200);
        self.export_height = self.export_height.max(200);
    }
}
