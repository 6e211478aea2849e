//! SmartMach Configuration - operator-tunable TOML values
//!
//! Covers the sensor table, the assessment window and the cost optimizer's
//! penalty terms. Health band edges and RUL breakpoints are deliberately
//! absent: they are fixed in [`super::defaults`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::defaults;
use crate::registry::{default_sensor_definitions, SensorRegistry};
use crate::types::SensorDefinition;

/// Environment variable naming the config file to load.
pub const CONFIG_ENV_VAR: &str = "SMARTMACH_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "smartmach.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `SmartMachConfig::load()` which searches:
/// 1. `$SMARTMACH_CONFIG` env var
/// 2. `./smartmach.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartMachConfig {
    /// Assessment window
    #[serde(default)]
    pub data: DataConfig,

    /// Maintenance cost optimizer
    #[serde(default)]
    pub cost: CostConfig,

    /// Monitored channels; replaces the built-in table when present
    #[serde(default = "default_sensor_definitions")]
    pub sensors: Vec<SensorDefinition>,
}

impl Default for SmartMachConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            cost: CostConfig::default(),
            sensors: default_sensor_definitions(),
        }
    }
}

impl SmartMachConfig {
    /// Load configuration using the standard search order.
    ///
    /// A file that fails to load is logged and skipped, never fatal.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), sensors = config.sensors.len(), "Loaded config from SMARTMACH_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from SMARTMACH_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "SMARTMACH_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./smartmach.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(sensors = config.sensors.len(), "Loaded config from ./smartmach.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./smartmach.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No smartmach.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        for w in super::validation::review_sensor_scale(&config) {
            warn!(field = %w.field, "{}", w);
        }
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Validate every section, collecting all problems.
    ///
    /// Rules:
    /// - `data.sequence_length` must be > 0
    /// - Cost penalty must be finite and non-negative, day offsets non-negative
    /// - The sensor table must build a valid [`SensorRegistry`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.data.sequence_length == 0 {
            errors.push("data.sequence_length must be > 0".to_string());
        }

        let c = &self.cost;
        if !c.penalty_per_day.is_finite() || c.penalty_per_day < 0.0 {
            errors.push(format!(
                "cost.penalty_per_day = {} must be finite and >= 0",
                c.penalty_per_day
            ));
        }
        if c.emergency_delay_days < 0 {
            errors.push(format!(
                "cost.emergency_delay_days = {} cannot be negative",
                c.emergency_delay_days
            ));
        }
        if c.preventive_lead_days < 0 {
            errors.push(format!(
                "cost.preventive_lead_days = {} cannot be negative",
                c.preventive_lead_days
            ));
        }

        if let Err(e) = SensorRegistry::new(self.sensors.clone()) {
            errors.push(format!("sensors: {e}"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build the shared sensor registry from the configured table.
    pub fn registry(&self) -> Result<Arc<SensorRegistry>, ConfigError> {
        SensorRegistry::new(self.sensors.clone())
            .map(Arc::new)
            .map_err(|e| ConfigError::Validation(vec![format!("sensors: {e}")]))
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Data Window
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Number of most recent cycles fed to the RUL model and the sensor evaluator
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,
}

fn default_sequence_length() -> usize { defaults::SEQUENCE_LENGTH }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sequence_length: default_sequence_length(),
        }
    }
}

// ============================================================================
// Cost Optimizer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Downtime penalty per day of unplanned outage
    #[serde(default = "default_penalty_per_day")]
    pub penalty_per_day: f64,

    /// Days an emergency repair lands after predicted failure
    #[serde(default = "default_emergency_delay_days")]
    pub emergency_delay_days: i64,

    /// Days ahead of predicted failure a preventive repair is scheduled
    #[serde(default = "default_preventive_lead_days")]
    pub preventive_lead_days: i64,
}

fn default_penalty_per_day() -> f64 { defaults::PENALTY_PER_DAY }
fn default_emergency_delay_days() -> i64 { defaults::EMERGENCY_DELAY_DAYS }
fn default_preventive_lead_days() -> i64 { defaults::PREVENTIVE_LEAD_DAYS }

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            penalty_per_day: default_penalty_per_day(),
            emergency_delay_days: default_emergency_delay_days(),
            preventive_lead_days: default_preventive_lead_days(),
        }
    }
}
