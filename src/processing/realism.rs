//! Value realism conversion
//!
//! Readings travel through the pipeline on the normalized 0-1 scale. For
//! display they are mapped linearly back onto a plausible engineering range:
//!
//! `value = scaled * (max - min) + min`, rounded to 2 decimals.

use serde::{Deserialize, Serialize};

use super::round2;
use crate::registry::SensorRegistry;
use crate::types::RealisticRange;

/// A reading converted to engineering units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealisticValue {
    pub value: f64,
    pub unit: String,
}

/// Convert a normalized reading with an explicit range.
///
/// With no range the reading passes through unchanged (not rounded) with an
/// empty unit.
pub fn convert(range: Option<&RealisticRange>, scaled: f64) -> RealisticValue {
    match range {
        Some(r) => RealisticValue {
            value: round2(scaled * r.span() + r.min),
            unit: r.unit.clone(),
        },
        None => RealisticValue {
            value: scaled,
            unit: String::new(),
        },
    }
}

/// Convert a normalized reading for a registered sensor.
///
/// Unknown sensor ids are a graceful passthrough, not an error.
pub fn to_realistic(registry: &SensorRegistry, sensor_id: &str, scaled: f64) -> RealisticValue {
    let range = registry
        .get(sensor_id)
        .and_then(|s| s.realistic_range.as_ref());
    convert(range, scaled)
}

/// Map an engineering value back onto the normalized scale.
pub fn to_normalized(range: &RealisticRange, value: f64) -> f64 {
    (value - range.min) / range.span()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_conversion() {
        let registry = SensorRegistry::default();
        // Exhaust Temp: 300-600 °C
        let v = to_realistic(&registry, "sensor_13", 0.5);
        assert_eq!(v.value, 450.0);
        assert_eq!(v.unit, "°C");

        let v = to_realistic(&registry, "sensor_13", 0.0);
        assert_eq!(v.value, 300.0);
        let v = to_realistic(&registry, "sensor_13", 1.0);
        assert_eq!(v.value, 600.0);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let registry = SensorRegistry::default();
        // RPM: 0-3000 → 0.123456 * 3000 = 370.368
        let v = to_realistic(&registry, "sensor_4", 0.123_456);
        assert_eq!(v.value, 370.37);
        assert_eq!(v.unit, "RPM");
    }

    #[test]
    fn test_unknown_sensor_passes_through() {
        let registry = SensorRegistry::default();
        let v = to_realistic(&registry, "sensor_99", 0.123_456);
        assert_eq!(v.value, 0.123_456);
        assert!(v.unit.is_empty());
    }

    #[test]
    fn test_out_of_unit_range_extrapolates() {
        let range = RealisticRange::new("PSI", 20.0, 80.0);
        let v = convert(Some(&range), 1.5);
        assert_eq!(v.value, 110.0);
    }

    #[test]
    fn test_normalize_recovers_scaled_within_rounding() {
        let registry = SensorRegistry::default();
        for def in registry.iter() {
            let range = def.realistic_range.as_ref().unwrap();
            let tolerance = 0.005 / range.span() + 1e-12;
            for i in 0..=20 {
                let scaled = f64::from(i) * 0.05 + 0.0013;
                let v = convert(Some(range), scaled);
                let back = to_normalized(range, v.value);
                assert!(
                    (back - scaled).abs() <= tolerance,
                    "{}: {scaled} -> {} -> {back}",
                    def.id,
                    v.value
                );
            }
        }
    }
}
