//! Configuration management for workoutlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::workout::Coordinates;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "workoutlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "workouts.db";

/// Highest zoom level map tiles are served at.
const MAX_ZOOM: u8 = 19;

/// Longest accepted pan animation, in seconds.
const MAX_PAN_SECS: f64 = 60.0;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WORKOUTLOG_`, sections separated
///    by `__`, e.g. `WORKOUTLOG_MAP__ZOOM_LEVEL=12`)
/// 2. TOML config file at `~/.config/workoutlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Map configuration.
    pub map: MapConfig,
    /// Entry form configuration.
    pub form: FormConfig,
    /// Current position used when no geolocation service is available.
    pub location: LocationConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/workoutlog/workouts.db`
    pub database_path: Option<PathBuf>,
    /// Key the workout collection is stored under.
    pub key: String,
}

/// Map-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Zoom level used when centering the map.
    pub zoom_level: u8,
    /// Length of the pan animation when a workout is selected, in seconds.
    pub pan_duration_secs: f64,
    /// Maximum marker popup width in pixels.
    pub popup_max_width: u32,
    /// Minimum marker popup width in pixels.
    pub popup_min_width: u32,
}

/// Entry form configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Delay before a hidden form's display is restored, in milliseconds.
    pub redisplay_delay_ms: u64,
}

/// A fixed current position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            key: "workouts".to_string(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom_level: 14,
            pan_duration_secs: 1.0,
            popup_max_width: 250,
            popup_min_width: 100,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            redisplay_delay_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `WORKOUTLOG_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("WORKOUTLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.key.trim().is_empty() {
            return Err(invalid("storage key must not be empty"));
        }

        if self.map.zoom_level > MAX_ZOOM {
            return Err(invalid(format!(
                "zoom_level ({}) cannot be greater than {MAX_ZOOM}",
                self.map.zoom_level
            )));
        }

        if !(self.map.pan_duration_secs > 0.0 && self.map.pan_duration_secs <= MAX_PAN_SECS) {
            return Err(invalid(format!(
                "pan_duration_secs must be greater than 0 and at most {MAX_PAN_SECS}"
            )));
        }

        if self.map.popup_min_width > self.map.popup_max_width {
            return Err(invalid(format!(
                "popup_min_width ({}) cannot be greater than popup_max_width ({})",
                self.map.popup_min_width, self.map.popup_max_width
            )));
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(latitude), Some(longitude)) => {
                if !(-90.0..=90.0).contains(&latitude) {
                    return Err(invalid(format!(
                        "latitude ({latitude}) must be between -90 and 90"
                    )));
                }
                if !(-180.0..=180.0).contains(&longitude) {
                    return Err(invalid(format!(
                        "longitude ({longitude}) must be between -180 and 180"
                    )));
                }
            }
            (None, None) => {}
            _ => {
                return Err(invalid(
                    "location needs both latitude and longitude, or neither",
                ))
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the configured current position, if any.
    #[must_use]
    pub fn location(&self) -> Option<Coordinates> {
        match (self.location.latitude, self.location.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            _ => None,
        }
    }

    /// Get the pan animation length as a Duration.
    #[must_use]
    pub fn pan_duration(&self) -> Duration {
        Duration::from_secs_f64(self.map.pan_duration_secs)
    }

    /// Get the form redisplay delay as a Duration.
    #[must_use]
    pub fn redisplay_delay(&self) -> Duration {
        Duration::from_millis(self.form.redisplay_delay_ms)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}
