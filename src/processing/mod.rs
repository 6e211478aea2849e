//! Health processing core: value realism, sensor evaluation, overall scoring

mod health_scoring;
pub mod realism;
mod sensor_health;

pub use health_scoring::{overall_score, rul_health, HealthScoreCalculator};
pub use realism::{to_realistic, RealisticValue};
pub use sensor_health::{
    anomaly_for_reading, classify_current, window_anomaly, SensorHealthEvaluator, SensorHistory,
    SensorSnapshot,
};

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
