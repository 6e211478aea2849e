//! Health Scoring Module
//!
//! Deterministic, rule-based overall health for one engine. Combines the
//! RUL predicted by the sequence model with the sensor evaluator's average
//! into a single 0-100 score and a GOOD / WARNING / CRITICAL status.
//!
//! The RUL model only supplies a number of cycles. Everything that turns it
//! into a score lives here so that fleet views, single-engine reports and
//! the cost optimizer all see identical values.

use std::sync::Arc;
use tracing::{debug, warn};

use super::round2;
use super::sensor_health::{SensorHealthEvaluator, SensorHistory, SensorSnapshot};
use crate::config::defaults::{
    RUL_BREAKPOINT_DEGRADED, RUL_BREAKPOINT_EXCELLENT, RUL_BREAKPOINT_FAILING, RUL_BREAKPOINT_GOOD,
    RUL_HEALTH_DEGRADED, RUL_HEALTH_EXCELLENT, RUL_HEALTH_FAILED, RUL_HEALTH_FAILING, RUL_HEALTH_GOOD,
    RUL_WEIGHT, SENSOR_WEIGHT,
};
use crate::registry::SensorRegistry;
use crate::types::{EngineHealthRecord, HealthStatus};

/// Band a predicted RUL into a health score.
///
/// # Bands
///
/// | predicted RUL | health |
/// |---|---|
/// | > 150 | 100 |
/// | 51 - 150 | 70 |
/// | 21 - 50 | 40 |
/// | 2 - 20 | 5 |
/// | <= 1 | 0 |
///
/// No interpolation between bands.
pub fn rul_health(predicted_rul: i64) -> f64 {
    if predicted_rul > RUL_BREAKPOINT_EXCELLENT {
        RUL_HEALTH_EXCELLENT
    } else if predicted_rul > RUL_BREAKPOINT_GOOD {
        RUL_HEALTH_GOOD
    } else if predicted_rul > RUL_BREAKPOINT_DEGRADED {
        RUL_HEALTH_DEGRADED
    } else if predicted_rul > RUL_BREAKPOINT_FAILING {
        RUL_HEALTH_FAILING
    } else {
        RUL_HEALTH_FAILED
    }
}

/// Weighted overall score: `round(0.6 * rul_health + 0.4 * sensor_health, 2)`.
///
/// Clamped to 0-100 so out-of-range inputs cannot leak past the band edges.
pub fn overall_score(rul_health: f64, sensor_health: f64) -> f64 {
    round2(RUL_WEIGHT * rul_health + SENSOR_WEIGHT * sensor_health).clamp(0.0, 100.0)
}

/// Turns a resolved RUL prediction plus sensor windows into a health record.
#[derive(Debug, Clone)]
pub struct HealthScoreCalculator {
    evaluator: SensorHealthEvaluator,
}

impl HealthScoreCalculator {
    pub fn new(registry: Arc<SensorRegistry>) -> Self {
        Self {
            evaluator: SensorHealthEvaluator::new(registry),
        }
    }

    pub fn evaluator(&self) -> &SensorHealthEvaluator {
        &self.evaluator
    }

    pub fn registry(&self) -> &SensorRegistry {
        self.evaluator.registry()
    }

    /// Build the health record for one engine.
    ///
    /// Sensor gaps are tolerated. When no sensor is evaluable the sensor
    /// health is the 100.0 fallback and `sensor_data_available` is false on
    /// the record; the overall score is still computed from it.
    pub fn aggregate(
        &self,
        predicted_rul: i64,
        history: &SensorHistory,
        current: &SensorSnapshot,
    ) -> EngineHealthRecord {
        let rul_health = rul_health(predicted_rul);
        let sensors = self.evaluator.evaluate(history, current);
        let overall_health = overall_score(rul_health, sensors.average_health);
        let health_status = HealthStatus::from_score(overall_health);

        if !sensors.sensor_data_available {
            warn!(
                predicted_rul,
                "No sensor could be evaluated; sensor health is the 100.0 fallback"
            );
        }

        debug!(
            predicted_rul,
            rul_health,
            sensor_health = sensors.average_health,
            overall_health,
            status = %health_status,
            critical = sensors.critical_sensors.len(),
            warning = sensors.warning_sensors.len(),
            "Engine health aggregated"
        );

        EngineHealthRecord {
            predicted_rul,
            actual_rul: None,
            rul_health,
            sensor_health: sensors.average_health,
            sensor_data_available: sensors.sensor_data_available,
            overall_health,
            health_status,
            critical_sensors: sensors.critical_sensors,
            warning_sensors: sensors.warning_sensors,
            assessments: sensors.assessments,
            skipped_sensors: sensors.skipped_sensors,
        }
    }
}
