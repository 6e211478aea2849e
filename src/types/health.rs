//! Engine-level health types: status bands, sensor summary, health record

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::sensor::{SensorAssessment, SensorId};
use crate::config::defaults::{GOOD_BAND_MIN, WARNING_BAND_MIN};

// ============================================================================
// Health Status
// ============================================================================

/// Categorical engine health derived from the overall score.
///
/// Bands (lower edge inclusive):
/// - Critical: [0, 41)
/// - Warning: [41, 65)
/// - Good: [65, 100]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Critical,
    Warning,
    Good,
}

impl HealthStatus {
    /// Classify an overall health score into its band.
    ///
    /// Shared by the health aggregator and the fleet classifier so the two
    /// can never disagree on an edge.
    pub fn from_score(score: f64) -> Self {
        if score >= GOOD_BAND_MIN {
            HealthStatus::Good
        } else if score >= WARNING_BAND_MIN {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Good => write!(f, "GOOD"),
            HealthStatus::Warning => write!(f, "WARNING"),
            HealthStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ============================================================================
// Sensor Health Summary
// ============================================================================

/// Output of the sensor health evaluator for one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorHealthSummary {
    /// Mean of all assessment scores (2dp), or 100.0 when nothing was evaluable
    pub average_health: f64,
    /// False when every sensor was skipped and `average_health` is the fallback
    pub sensor_data_available: bool,
    pub assessments: BTreeMap<SensorId, SensorAssessment>,
    /// Display names of sensors whose current reading is above the high threshold
    pub critical_sensors: Vec<String>,
    /// Display names of sensors whose current reading is below the low threshold
    pub warning_sensors: Vec<String>,
    /// Registered sensors that could not be evaluated (no history or no current value)
    pub skipped_sensors: Vec<SensorId>,
}

// ============================================================================
// Engine Health Record
// ============================================================================

/// Complete health assessment of one engine.
///
/// Built once per analysis request and never mutated afterward; callers
/// re-run the analysis to refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineHealthRecord {
    /// RUL predicted by the sequence model (cycles)
    pub predicted_rul: i64,
    /// Ground-truth RUL when the data source carries it (display/validation only)
    pub actual_rul: Option<i64>,
    /// Banded score derived from `predicted_rul`
    pub rul_health: f64,
    /// Mean sensor score (2dp)
    pub sensor_health: f64,
    /// False when `sensor_health` is the no-data fallback rather than a measurement
    pub sensor_data_available: bool,
    /// `round(0.6 * rul_health + 0.4 * sensor_health, 2)`
    pub overall_health: f64,
    pub health_status: HealthStatus,
    pub critical_sensors: Vec<String>,
    pub warning_sensors: Vec<String>,
    pub assessments: BTreeMap<SensorId, SensorAssessment>,
    pub skipped_sensors: Vec<SensorId>,
}

impl EngineHealthRecord {
    /// Attach the ground-truth RUL from the data source.
    #[must_use]
    pub fn with_actual_rul(mut self, actual_rul: Option<i64>) -> Self {
        self.actual_rul = actual_rul;
        self
    }

    /// Number of sensors that produced an assessment.
    pub fn total_sensors(&self) -> usize {
        self.assessments.len()
    }

    /// Sensors whose current reading is inside its band.
    ///
    /// Warning and critical lists are disjoint and drawn from the assessment
    /// map, so this never underflows for records produced by the aggregator.
    pub fn good_sensor_count(&self) -> usize {
        self.total_sensors()
            .saturating_sub(self.warning_sensors.len() + self.critical_sensors.len())
    }

    /// Mean anomaly level over all assessments (2dp), 0.0 when there are none.
    pub fn mean_anomaly_level(&self) -> f64 {
        if self.assessments.is_empty() {
            return 0.0;
        }
        let total: f64 = self.assessments.values().map(|a| a.anomaly_level).sum();
        crate::processing::round2(total / self.assessments.len() as f64)
    }

    /// Mean assessment score (2dp), 0.0 when there are none.
    ///
    /// Unlike `sensor_health` this has no 100.0 fallback.
    pub fn mean_sensor_score(&self) -> f64 {
        if self.assessments.is_empty() {
            return 0.0;
        }
        let total: f64 = self.assessments.values().map(|a| a.score).sum();
        crate::processing::round2(total / self.assessments.len() as f64)
    }
}
