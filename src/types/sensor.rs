//! Sensor definitions and per-sensor assessment types

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Sensor Identity
// ============================================================================

/// Stable machine identifier of a monitored channel (e.g. `sensor_2`).
///
/// Every map in the health pipeline is keyed by this id. Display names are
/// carried as attributes and never used as keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SensorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SensorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for SensorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Sensor Definition
// ============================================================================

/// Display conversion range for a normalized reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealisticRange {
    /// Engineering unit shown next to the converted value (may be empty)
    #[serde(default)]
    pub unit: String,
    /// Value corresponding to a normalized reading of 0.0
    pub min: f64,
    /// Value corresponding to a normalized reading of 1.0
    pub max: f64,
}

impl RealisticRange {
    pub fn new(unit: &str, min: f64, max: f64) -> Self {
        Self {
            unit: unit.to_string(),
            min,
            max,
        }
    }

    /// Width of the range in engineering units.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// One monitored channel: identity, normalized thresholds and display range.
///
/// Thresholds live on the normalized 0-1 scale. `0 < low < high` is enforced
/// when the registry is built, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDefinition {
    pub id: SensorId,
    pub display_name: String,
    pub low_threshold: f64,
    pub high_threshold: f64,
    /// Absent range means readings are shown unconverted with no unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realistic_range: Option<RealisticRange>,
}

impl SensorDefinition {
    pub fn new(id: &str, display_name: &str, low: f64, high: f64, range: RealisticRange) -> Self {
        Self {
            id: SensorId::new(id),
            display_name: display_name.to_string(),
            low_threshold: low,
            high_threshold: high,
            realistic_range: Some(range),
        }
    }

    /// Ideal operating point: the midpoint of the threshold band.
    pub fn midpoint(&self) -> f64 {
        (self.low_threshold + self.high_threshold) / 2.0
    }

    /// Width of the threshold band.
    pub fn band_width(&self) -> f64 {
        self.high_threshold - self.low_threshold
    }
}

// ============================================================================
// Sensor Status
// ============================================================================

/// Classification of the current reading against its thresholds.
///
/// LOW readings feed the warning list, HIGH readings the critical list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorStatus {
    Ok,
    Low,
    High,
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorStatus::Ok => write!(f, "OK"),
            SensorStatus::Low => write!(f, "LOW"),
            SensorStatus::High => write!(f, "HIGH"),
        }
    }
}

// ============================================================================
// Sensor Assessment
// ============================================================================

/// Evaluation result for one sensor over its history window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorAssessment {
    pub sensor_id: SensorId,
    pub display_name: String,
    /// Current reading converted to engineering units (2dp)
    pub current_value: f64,
    pub unit: String,
    /// Based on the current reading only
    pub current_status: SensorStatus,
    /// Mean per-cycle anomaly over the whole window (2dp, unbounded above)
    pub anomaly_level: f64,
    /// `max(0, 100 - anomaly_level)` (2dp)
    pub score: f64,
    /// Number of history cycles the anomaly level was averaged over
    pub cycles_analyzed: usize,
}
