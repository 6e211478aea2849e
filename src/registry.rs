//! Sensor Registry
//!
//! Immutable table of monitored channels, built once at startup and shared
//! by `Arc` with every evaluator. All definition problems are rejected here,
//! at load time, so evaluation never has to guard against them.
//!
//! ## Validation rules
//!
//! - At least one sensor, ids non-empty and unique
//! - Display names unique (two sensors must never merge in a report)
//! - Thresholds finite with `0 < low < high` (the below-band anomaly ratio divides by `low`)
//! - Realistic ranges finite with `min < max`

use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

use crate::types::{RealisticRange, SensorDefinition, SensorId};

/// Errors raised while building a [`SensorRegistry`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Sensor registry is empty")]
    Empty,

    #[error("Sensor #{0} has an empty id")]
    EmptyId(usize),

    #[error("Duplicate sensor id: {0}")]
    DuplicateId(SensorId),

    #[error("Display name '{name}' is used by both {first} and {second}")]
    DuplicateDisplayName {
        name: String,
        first: SensorId,
        second: SensorId,
    },

    #[error("Sensor {id}: thresholds must be finite (got low={low}, high={high})")]
    NonFiniteThreshold { id: SensorId, low: f64, high: f64 },

    #[error("Sensor {id}: low threshold must be > 0 (got {low})")]
    NonPositiveLow { id: SensorId, low: f64 },

    #[error("Sensor {id}: low threshold ({low}) must be < high threshold ({high})")]
    InvertedThresholds { id: SensorId, low: f64, high: f64 },

    #[error("Sensor {id}: realistic range must be finite with min < max (got min={min}, max={max})")]
    InvalidRange { id: SensorId, min: f64, max: f64 },
}

/// Validated, read-only sensor table.
///
/// Iteration follows definition order, which is also the order of the
/// warning and critical lists in every health record.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRegistry {
    sensors: Vec<SensorDefinition>,
    index: BTreeMap<SensorId, usize>,
}

impl SensorRegistry {
    /// Build a registry, rejecting the first invalid definition.
    pub fn new(sensors: Vec<SensorDefinition>) -> Result<Self, RegistryError> {
        validate_definitions(&sensors)?;
        Ok(Self::from_validated(sensors))
    }

    fn from_validated(sensors: Vec<SensorDefinition>) -> Self {
        let index = sensors
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self { sensors, index }
    }

    pub fn get(&self, id: &str) -> Option<&SensorDefinition> {
        self.index.get(id).map(|&i| &self.sensors[i])
    }

    /// Display name for a sensor id, if registered.
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.get(id).map(|s| s.display_name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorDefinition> {
        self.sensors.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SensorId> {
        self.sensors.iter().map(|s| &s.id)
    }

    pub fn definitions(&self) -> &[SensorDefinition] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::from_validated(default_sensor_definitions())
    }
}

fn validate_definitions(sensors: &[SensorDefinition]) -> Result<(), RegistryError> {
    if sensors.is_empty() {
        return Err(RegistryError::Empty);
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_names: HashMap<&str, &SensorId> = HashMap::new();

    for (i, s) in sensors.iter().enumerate() {
        if s.id.as_str().trim().is_empty() {
            return Err(RegistryError::EmptyId(i));
        }
        if !seen_ids.insert(s.id.as_str()) {
            return Err(RegistryError::DuplicateId(s.id.clone()));
        }
        if let Some(first) = seen_names.insert(s.display_name.as_str(), &s.id) {
            return Err(RegistryError::DuplicateDisplayName {
                name: s.display_name.clone(),
                first: first.clone(),
                second: s.id.clone(),
            });
        }

        let (low, high) = (s.low_threshold, s.high_threshold);
        // NaN comparisons silently pass, so check finiteness first
        if !low.is_finite() || !high.is_finite() {
            return Err(RegistryError::NonFiniteThreshold {
                id: s.id.clone(),
                low,
                high,
            });
        }
        if low <= 0.0 {
            return Err(RegistryError::NonPositiveLow {
                id: s.id.clone(),
                low,
            });
        }
        if low >= high {
            return Err(RegistryError::InvertedThresholds {
                id: s.id.clone(),
                low,
                high,
            });
        }

        if let Some(range) = &s.realistic_range {
            if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
                return Err(RegistryError::InvalidRange {
                    id: s.id.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
        }
    }

    Ok(())
}

/// The 15 turbofan channels monitored by default.
///
/// Thresholds are on the min-max normalized scale produced by the data
/// preprocessing step; ranges convert back to plausible engineering values.
pub fn default_sensor_definitions() -> Vec<SensorDefinition> {
    vec![
        SensorDefinition::new("sensor_2", "Temperature", 0.1, 0.9, RealisticRange::new("°C", 20.0, 120.0)),
        SensorDefinition::new("sensor_3", "Pressure", 0.1, 0.8, RealisticRange::new("PSI", 0.0, 100.0)),
        SensorDefinition::new("sensor_4", "RPM", 0.2, 0.7, RealisticRange::new("RPM", 0.0, 3000.0)),
        SensorDefinition::new("sensor_6", "Fuel Flow", 0.1, 0.85, RealisticRange::new("L/min", 0.0, 50.0)),
        SensorDefinition::new("sensor_7", "Vibration X", 0.05, 0.8, RealisticRange::new("mm/s", 0.0, 10.0)),
        SensorDefinition::new("sensor_8", "Vibration Y", 0.05, 0.8, RealisticRange::new("mm/s", 0.0, 10.0)),
        SensorDefinition::new("sensor_9", "Vibration Z", 0.05, 0.8, RealisticRange::new("mm/s", 0.0, 10.0)),
        SensorDefinition::new("sensor_11", "Oil Temp", 0.1, 0.9, RealisticRange::new("°C", 60.0, 120.0)),
        SensorDefinition::new("sensor_12", "Oil Pressure", 0.1, 0.85, RealisticRange::new("PSI", 20.0, 80.0)),
        SensorDefinition::new("sensor_13", "Exhaust Temp", 0.1, 0.9, RealisticRange::new("°C", 300.0, 600.0)),
        SensorDefinition::new("sensor_14", "Compressor Temp", 0.1, 0.9, RealisticRange::new("°C", 100.0, 300.0)),
        SensorDefinition::new("sensor_15", "Fan Speed", 0.1, 0.9, RealisticRange::new("RPM", 0.0, 2000.0)),
        SensorDefinition::new("sensor_17", "Throttle Position", 0.1, 0.85, RealisticRange::new("%", 0.0, 100.0)),
        SensorDefinition::new("sensor_20", "Fuel Temp", 0.1, 0.9, RealisticRange::new("°C", 15.0, 50.0)),
        SensorDefinition::new("sensor_21", "Engine Load", 0.1, 0.9, RealisticRange::new("%", 0.0, 100.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(id: &str, name: &str, low: f64, high: f64) -> SensorDefinition {
        SensorDefinition::new(id, name, low, high, RealisticRange::new("u", 0.0, 1.0))
    }

    #[test]
    fn test_default_table_validates() {
        let defs = default_sensor_definitions();
        assert_eq!(defs.len(), 15);
        let registry = SensorRegistry::new(defs).expect("default table must validate");
        assert_eq!(registry, SensorRegistry::default());
    }

    #[test]
    fn test_lookup_by_id() {
        let registry = SensorRegistry::default();
        assert_eq!(registry.display_name("sensor_4"), Some("RPM"));
        assert_eq!(registry.get("sensor_4").map(|s| s.low_threshold), Some(0.2));
        assert!(registry.get("sensor_1").is_none());
    }

    #[test]
    fn test_iteration_keeps_definition_order() {
        let registry = SensorRegistry::default();
        let first: Vec<&str> = registry.ids().take(3).map(SensorId::as_str).collect();
        assert_eq!(first, vec!["sensor_2", "sensor_3", "sensor_4"]);
    }

    #[test]
    fn test_zero_low_threshold_rejected() {
        let err = SensorRegistry::new(vec![def("s1", "A", 0.0, 0.5)]).unwrap_err();
        assert!(matches!(err, RegistryError::NonPositiveLow { .. }), "{err}");
    }

    #[test]
    fn test_inverted_and_equal_thresholds_rejected() {
        let err = SensorRegistry::new(vec![def("s1", "A", 0.8, 0.2)]).unwrap_err();
        assert!(matches!(err, RegistryError::InvertedThresholds { .. }));
        let err = SensorRegistry::new(vec![def("s1", "A", 0.5, 0.5)]).unwrap_err();
        assert!(matches!(err, RegistryError::InvertedThresholds { .. }));
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let err = SensorRegistry::new(vec![def("s1", "A", f64::NAN, 0.5)]).unwrap_err();
        assert!(matches!(err, RegistryError::NonFiniteThreshold { .. }));
    }

    #[test]
    fn test_duplicate_display_name_rejected() {
        let err = SensorRegistry::new(vec![def("s1", "Temp", 0.1, 0.9), def("s2", "Temp", 0.1, 0.9)])
            .unwrap_err();
        match err {
            RegistryError::DuplicateDisplayName { name, first, second } => {
                assert_eq!(name, "Temp");
                assert_eq!(first.as_str(), "s1");
                assert_eq!(second.as_str(), "s2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = SensorRegistry::new(vec![def("s1", "A", 0.1, 0.9), def("s1", "B", 0.1, 0.9)])
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId(SensorId::new("s1")));
    }

    #[test]
    fn test_bad_range_rejected() {
        let mut d = def("s1", "A", 0.1, 0.9);
        d.realistic_range = Some(RealisticRange::new("C", 100.0, 20.0));
        let err = SensorRegistry::new(vec![d]).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRange { .. }));
    }

    #[test]
    fn test_missing_range_is_allowed() {
        let mut d = def("s1", "A", 0.1, 0.9);
        d.realistic_range = None;
        assert!(SensorRegistry::new(vec![d]).is_ok());
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert_eq!(SensorRegistry::new(Vec::new()).unwrap_err(), RegistryError::Empty);
    }
}
