// Engine settings
// Loaded from ~/.config/nattable/settings.toml

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nattable_core::{CalendarField, TextMatchMode};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default sizing of the base data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Column width in unscaled pixels
    pub default_column_width: u32,

    /// Row height in unscaled pixels
    pub default_row_height: u32,

    /// DPI scale applied to every size
    pub dpi_scale: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            default_column_width: 100,
            default_row_height: 20,
            dpi_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillHandleSettings {
    /// Field a date series steps by
    pub date_field: CalendarField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Splits one filter text into several tokens (e.g. "," for "a,b")
    pub text_delimiter: Option<String>,

    pub text_match_mode: TextMatchMode,

    pub case_sensitive: bool,

    /// Tick of the background change conflater, in milliseconds
    pub conflation_interval_ms: u64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            text_delimiter: None,
            text_match_mode: TextMatchMode::Contains,
            case_sensitive: false,
            conflation_interval_ms: 100,
        }
    }
}

impl FilterSettings {
    pub fn conflation_interval(&self) -> Duration {
        Duration::from_millis(self.conflation_interval_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid: GridSettings,
    pub fill_handle: FillHandleSettings,
    pub filter: FilterSettings,
}

impl Settings {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid.dpi_scale.is_finite() && self.grid.dpi_scale > 0.0) {
            return Err(ConfigError::Invalid {
                key: "grid.dpi_scale",
                reason: format!("must be a positive number, got {}", self.grid.dpi_scale),
            });
        }
        if self.filter.conflation_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "filter.conflation_interval_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if matches!(self.filter.text_delimiter.as_deref(), Some("")) {
            return Err(ConfigError::Invalid {
                key: "filter.text_delimiter",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nattable");
        config_dir.join("settings.toml")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from the default path, falling back to defaults
    pub fn load_or_default() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}: {e}; using default settings", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
