//! Sensor Health Evaluator
//!
//! Scores every registered sensor of one engine from its recent history
//! window and classifies its current reading.
//!
//! # Per-cycle anomaly
//!
//! For a reading `v` against thresholds `(low, high)`:
//! - below band: `(low - v) / low * 100`
//! - above band: `(v - high) / high * 100`
//! - in band: `|v - mid| / (high - low) * 50`, at most 25 at either edge
//!
//! The sensor's anomaly level is the plain mean over the window, so it is
//! order-independent and unbounded above. Only the derived score is clamped:
//! `score = max(0, 100 - anomaly_level)`.
//!
//! # Skipping
//!
//! Sensors without a current value or without any usable history are
//! skipped, never failed. When nothing at all is evaluable the average health
//! falls back to 100.0 and `sensor_data_available` is false.

use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::realism::to_realistic;
use super::round2;
use crate::config::defaults::{IN_RANGE_ANOMALY_SCALE, NO_SENSOR_DATA_HEALTH};
use crate::registry::SensorRegistry;
use crate::types::{SensorAssessment, SensorDefinition, SensorHealthSummary, SensorId, SensorStatus};

/// Per-sensor ordered history window (normalized readings, oldest first).
pub type SensorHistory = BTreeMap<SensorId, Vec<f64>>;

/// Per-sensor current reading (normalized).
pub type SensorSnapshot = BTreeMap<SensorId, f64>;

/// Anomaly contributed by a single reading.
pub fn anomaly_for_reading(sensor: &SensorDefinition, value: f64) -> f64 {
    let (low, high) = (sensor.low_threshold, sensor.high_threshold);
    if value < low {
        (low - value) / low * 100.0
    } else if value > high {
        (value - high) / high * 100.0
    } else {
        (value - sensor.midpoint()).abs() / sensor.band_width() * IN_RANGE_ANOMALY_SCALE
    }
}

/// Classify a current reading against its band (both edges inclusive).
pub fn classify_current(sensor: &SensorDefinition, value: f64) -> SensorStatus {
    if value < sensor.low_threshold {
        SensorStatus::Low
    } else if value > sensor.high_threshold {
        SensorStatus::High
    } else {
        SensorStatus::Ok
    }
}

/// Mean anomaly over a window, or `None` when it holds no finite reading.
///
/// Non-finite readings are dropped as data gaps.
pub fn window_anomaly(sensor: &SensorDefinition, window: &[f64]) -> Option<(f64, usize)> {
    let anomalies: Vec<f64> = window
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .map(|v| anomaly_for_reading(sensor, v))
        .collect();
    if anomalies.is_empty() {
        return None;
    }
    let count = anomalies.len();
    Some((anomalies.mean(), count))
}

/// Evaluates sensor health against a shared, validated registry.
#[derive(Debug, Clone)]
pub struct SensorHealthEvaluator {
    registry: Arc<SensorRegistry>,
}

impl SensorHealthEvaluator {
    pub fn new(registry: Arc<SensorRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    /// Evaluate one sensor, or `None` when it must be skipped.
    ///
    /// Returns the assessment together with the unrounded score used for
    /// the engine average.
    pub fn assess_sensor(
        &self,
        sensor: &SensorDefinition,
        window: &[f64],
        current: f64,
    ) -> Option<(SensorAssessment, f64)> {
        if !current.is_finite() {
            return None;
        }
        let (anomaly_level, cycles_analyzed) = window_anomaly(sensor, window)?;
        let score = (100.0 - anomaly_level).max(0.0);
        let display = to_realistic(&self.registry, sensor.id.as_str(), current);

        let assessment = SensorAssessment {
            sensor_id: sensor.id.clone(),
            display_name: sensor.display_name.clone(),
            current_value: display.value,
            unit: display.unit,
            current_status: classify_current(sensor, current),
            anomaly_level: round2(anomaly_level),
            score: round2(score),
            cycles_analyzed,
        };
        Some((assessment, score))
    }

    /// Evaluate every registered sensor present in both maps.
    pub fn evaluate(&self, history: &SensorHistory, current: &SensorSnapshot) -> SensorHealthSummary {
        let mut assessments = BTreeMap::new();
        let mut critical_sensors = Vec::new();
        let mut warning_sensors = Vec::new();
        let mut skipped_sensors = Vec::new();
        let mut scores = Vec::new();

        for sensor in self.registry.iter() {
            let (Some(&value), Some(window)) = (current.get(&sensor.id), history.get(&sensor.id)) else {
                debug!(sensor = %sensor.id, "No current value or history, skipping sensor");
                skipped_sensors.push(sensor.id.clone());
                continue;
            };

            let Some((assessment, score)) = self.assess_sensor(sensor, window, value) else {
                debug!(sensor = %sensor.id, cycles = window.len(), "No usable readings, skipping sensor");
                skipped_sensors.push(sensor.id.clone());
                continue;
            };

            match assessment.current_status {
                SensorStatus::Low => warning_sensors.push(sensor.display_name.clone()),
                SensorStatus::High => critical_sensors.push(sensor.display_name.clone()),
                SensorStatus::Ok => {}
            }
            scores.push(score);
            assessments.insert(sensor.id.clone(), assessment);
        }

        let sensor_data_available = !scores.is_empty();
        let average_health = if sensor_data_available {
            round2(scores.iter().mean())
        } else {
            NO_SENSOR_DATA_HEALTH
        };

        SensorHealthSummary {
            average_health,
            sensor_data_available,
            assessments,
            critical_sensors,
            warning_sensors,
            skipped_sensors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RealisticRange;

    fn sensor(low: f64, high: f64) -> SensorDefinition {
        SensorDefinition::new("s1", "Test Sensor", low, high, RealisticRange::new("u", 0.0, 100.0))
    }

    fn evaluator() -> SensorHealthEvaluator {
        SensorHealthEvaluator::new(Arc::new(SensorRegistry::default()))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_anomaly_below_band() {
        let s = sensor(0.2, 0.8);
        // (0.2 - 0.1) / 0.2 * 100 = 50
        assert!(approx(anomaly_for_reading(&s, 0.1), 50.0));
    }

    #[test]
    fn test_anomaly_above_band() {
        let s = sensor(0.2, 0.8);
        // (1.0 - 0.8) / 0.8 * 100 = 25
        assert!(approx(anomaly_for_reading(&s, 1.0), 25.0));
    }

    #[test]
    fn test_anomaly_in_band() {
        let s = sensor(0.2, 0.8);
        assert!(approx(anomaly_for_reading(&s, 0.5), 0.0));
        // |0.65 - 0.5| / 0.6 * 50 = 12.5
        assert!(approx(anomaly_for_reading(&s, 0.65), 12.5));
        // Band edges reach the in-band maximum: 0.3 / 0.6 * 50 = 25
        assert!(approx(anomaly_for_reading(&s, 0.2), 25.0));
        assert!(approx(anomaly_for_reading(&s, 0.8), 25.0));
    }

    #[test]
    fn test_anomaly_is_unbounded() {
        let s = sensor(0.05, 0.8);
        // (0.05 - (-1.0)) / 0.05 * 100 = 2100
        let a = anomaly_for_reading(&s, -1.0);
        assert!(a > 100.0, "anomaly: {a}");
    }

    #[test]
    fn test_classify_current_edges_inclusive() {
        let s = sensor(0.2, 0.8);
        assert_eq!(classify_current(&s, 0.2), SensorStatus::Ok);
        assert_eq!(classify_current(&s, 0.8), SensorStatus::Ok);
        assert_eq!(classify_current(&s, 0.199), SensorStatus::Low);
        assert_eq!(classify_current(&s, 0.801), SensorStatus::High);
    }

    #[test]
    fn test_window_mean_is_order_independent() {
        let s = sensor(0.2, 0.8);
        let a = window_anomaly(&s, &[0.1, 0.5, 1.0]).unwrap();
        let b = window_anomaly(&s, &[1.0, 0.1, 0.5]).unwrap();
        assert!(approx(a.0, b.0));
        // (50 + 0 + 25) / 3
        assert!(approx(a.0, 25.0));
        assert_eq!(a.1, 3);
    }

    #[test]
    fn test_window_drops_non_finite_readings() {
        let s = sensor(0.2, 0.8);
        let (level, n) = window_anomaly(&s, &[0.5, f64::NAN, 0.5]).unwrap();
        assert_eq!(n, 2);
        assert!(approx(level, 0.0));
        assert!(window_anomaly(&s, &[f64::NAN]).is_none());
        assert!(window_anomaly(&s, &[]).is_none());
    }

    #[test]
    fn test_midpoint_history_scores_100() {
        let ev = evaluator();
        let id = SensorId::new("sensor_2"); // 0.1 - 0.9, mid 0.5
        let history = SensorHistory::from([(id.clone(), vec![0.5; 50])]);
        let current = SensorSnapshot::from([(id.clone(), 0.5)]);

        let summary = ev.evaluate(&history, &current);
        let a = &summary.assessments[&id];
        assert_eq!(a.anomaly_level, 0.0);
        assert_eq!(a.score, 100.0);
        assert_eq!(a.current_status, SensorStatus::Ok);
        assert_eq!(a.cycles_analyzed, 50);
        assert_eq!(summary.average_health, 100.0);
        assert!(summary.sensor_data_available);
    }

    #[test]
    fn test_extreme_anomaly_clamps_score_at_zero() {
        let ev = evaluator();
        let id = SensorId::new("sensor_7"); // 0.05 - 0.8
        let history = SensorHistory::from([(id.clone(), vec![5.0; 10])]);
        let current = SensorSnapshot::from([(id.clone(), 5.0)]);

        let summary = ev.evaluate(&history, &current);
        let a = &summary.assessments[&id];
        // (5.0 - 0.8) / 0.8 * 100 = 525
        assert!(approx(a.anomaly_level, 525.0));
        assert_eq!(a.score, 0.0);
        assert_eq!(summary.average_health, 0.0);
    }

    #[test]
    fn test_status_lists_use_display_names() {
        let ev = evaluator();
        let low = SensorId::new("sensor_3"); // Pressure, 0.1 - 0.8
        let high = SensorId::new("sensor_4"); // RPM, 0.2 - 0.7
        let ok = SensorId::new("sensor_2");
        let history = SensorHistory::from([
            (low.clone(), vec![0.5; 5]),
            (high.clone(), vec![0.5; 5]),
            (ok.clone(), vec![0.5; 5]),
        ]);
        let current = SensorSnapshot::from([(low.clone(), 0.05), (high.clone(), 0.95), (ok.clone(), 0.5)]);

        let summary = ev.evaluate(&history, &current);
        assert_eq!(summary.warning_sensors, vec!["Pressure".to_string()]);
        assert_eq!(summary.critical_sensors, vec!["RPM".to_string()]);
        assert_eq!(summary.assessments[&low].current_status, SensorStatus::Low);
        assert_eq!(summary.assessments[&high].current_status, SensorStatus::High);
        // Status comes from the current value only; the history stays in band
        // |0.5 - 0.45| / 0.5 * 50 = 5
        assert!(approx(summary.assessments[&high].anomaly_level, 5.0));
        assert_eq!(summary.assessments[&high].current_status, SensorStatus::High);
        assert_eq!(summary.assessments[&ok].anomaly_level, 0.0);
    }

    #[test]
    fn test_current_value_converted_to_units() {
        let ev = evaluator();
        let id = SensorId::new("sensor_13"); // Exhaust Temp 300-600 °C
        let history = SensorHistory::from([(id.clone(), vec![0.5; 3])]);
        let current = SensorSnapshot::from([(id.clone(), 0.5)]);
        let a = &ev.evaluate(&history, &current).assessments[&id];
        assert_eq!(a.current_value, 450.0);
        assert_eq!(a.unit, "°C");
        assert_eq!(a.display_name, "Exhaust Temp");
    }

    #[test]
    fn test_missing_history_falls_back_and_is_flagged() {
        let ev = evaluator();
        let current: SensorSnapshot = ev
            .registry()
            .ids()
            .map(|id| (id.clone(), 0.5))
            .collect();

        let summary = ev.evaluate(&SensorHistory::new(), &current);
        assert_eq!(summary.average_health, 100.0);
        assert!(!summary.sensor_data_available, "fallback score must be flagged");
        assert!(summary.assessments.is_empty());
        assert_eq!(summary.skipped_sensors.len(), 15);
    }

    #[test]
    fn test_empty_window_and_unregistered_sensor_skipped() {
        let ev = evaluator();
        let good = SensorId::new("sensor_2");
        let empty = SensorId::new("sensor_3");
        let unknown = SensorId::new("sensor_1");
        let history = SensorHistory::from([
            (good.clone(), vec![0.5]),
            (empty.clone(), Vec::new()),
            (unknown.clone(), vec![0.5]),
        ]);
        let current = SensorSnapshot::from([(good.clone(), 0.5), (empty.clone(), 0.5), (unknown.clone(), 0.5)]);

        let summary = ev.evaluate(&history, &current);
        assert_eq!(summary.assessments.len(), 1);
        assert!(summary.assessments.contains_key(&good));
        assert!(summary.skipped_sensors.contains(&empty));
        // Unregistered ids are never reported, not even as skipped
        assert!(!summary.skipped_sensors.contains(&unknown));
        assert!(summary.sensor_data_available);
    }

    #[test]
    fn test_average_is_mean_of_scores() {
        let ev = evaluator();
        let a = SensorId::new("sensor_2"); // 0.1 - 0.9, band 0.8
        let b = SensorId::new("sensor_11"); // 0.1 - 0.9
        // a: |0.9 - 0.5| / 0.8 * 50 = 25 → score 75; b: mid → score 100
        let history = SensorHistory::from([(a.clone(), vec![0.9; 4]), (b.clone(), vec![0.5; 4])]);
        let current = SensorSnapshot::from([(a.clone(), 0.5), (b.clone(), 0.5)]);
        let summary = ev.evaluate(&history, &current);
        assert_eq!(summary.assessments[&a].score, 75.0);
        assert_eq!(summary.average_health, 87.5);
    }
}
