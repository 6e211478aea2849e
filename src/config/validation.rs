//! Config validation: unknown-key detection with Levenshtein suggestions
//! and normalized-scale checks on the sensor table.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for SmartMachConfig.
///
/// Array-of-tables entries (`[[sensors]]`) share one path without an index.
/// Any new field added to SmartMachConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [data]
        "data",
        "data.sequence_length",
        // [cost]
        "cost",
        "cost.penalty_per_day",
        "cost.emergency_delay_days",
        "cost.preventive_lead_days",
        // [[sensors]]
        "sensors",
        "sensors.id",
        "sensors.display_name",
        "sensors.low_threshold",
        "sensors.high_threshold",
        "sensors.realistic_range",
        "sensors.realistic_range.unit",
        "sensors.realistic_range.min",
        "sensors.realistic_range.max",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`. Tables inside arrays are walked under the
/// array's own path, so each distinct path is reported once.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            match v {
                toml::Value::Table(_) => keys.extend(walk_toml_keys(v, &path)),
                toml::Value::Array(items) => {
                    for item in items.iter().filter(|i| i.is_table()) {
                        for nested in walk_toml_keys(item, &path) {
                            if !keys.contains(&nested) {
                                keys.push(nested);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties go to the alphabetically first key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Sensor Table Review
// ============================================================================

/// Flag sensor thresholds that sit outside the normalized 0-1 scale.
///
/// Such values are legal but usually mean a threshold was copied in
/// engineering units instead of normalized form.
pub fn review_sensor_scale(config: &super::SmartMachConfig) -> Vec<ValidationWarning> {
    let on_scale = |v: f64| (0.0..=1.0).contains(&v);
    config
        .sensors
        .iter()
        .filter(|s| !on_scale(s.low_threshold) || !on_scale(s.high_threshold))
        .map(|s| ValidationWarning {
            field: format!("sensors.{}", s.id),
            message: format!(
                "Sensor {} thresholds ({}, {}) are outside the normalized 0-1 scale",
                s.id, s.low_threshold, s.high_threshold
            ),
            suggestion: None,
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmartMachConfig;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_small_edits() {
        assert_eq!(levenshtein("penalty_per_dya", "penalty_per_day"), 2);
        assert_eq!(levenshtein("sequence_lenght", "sequence_length"), 2);
        assert_eq!(levenshtein("low_treshold", "low_threshold"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("°C", "C"), 1);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [cost]
            penalty_per_day = 1.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert_eq!(keys, vec!["cost".to_string(), "cost.penalty_per_day".to_string()]);
    }

    #[test]
    fn test_walk_toml_keys_array_of_tables() {
        let toml: toml::Value = r#"
            [[sensors]]
            id = "a"
            [sensors.realistic_range]
            min = 0.0

            [[sensors]]
            id = "b"
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"sensors".to_string()));
        assert!(keys.contains(&"sensors.id".to_string()));
        assert!(keys.contains(&"sensors.realistic_range.min".to_string()));
        assert_eq!(keys.iter().filter(|k| *k == "sensors.id").count(), 1);
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[data]
sequence_lenght = 40
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("sequence_lenght"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("data.sequence_length")
        );
        assert!(warnings[0].to_string().contains("did you mean 'data.sequence_length'"));
    }

    #[test]
    fn test_typo_inside_sensor_entry() {
        let toml_str = r#"
[[sensors]]
id = "s1"
display_name = "Temp"
low_treshold = 0.1
high_threshold = 0.9
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].suggestion.as_deref(), Some("sensors.low_threshold"));
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = SmartMachConfig::default().to_toml().unwrap();
        let warnings = validate_unknown_keys(&toml_str);
        assert!(
            warnings.is_empty(),
            "Expected 0 warnings, got: {:?}",
            warnings
        );
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let toml_str = r#"
[server]
addr = "0.0.0.0:8080"
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.iter().any(|w| w.field == "server"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        let suggestion = suggest_correction("completely_unrelated_garbage_key_xyz", &known);
        assert!(suggestion.is_none());
    }

    #[test]
    fn test_sensor_scale_review() {
        let mut config = SmartMachConfig::default();
        assert!(review_sensor_scale(&config).is_empty());

        config.sensors[0].high_threshold = 90.0;
        let warnings = review_sensor_scale(&config);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "sensors.sensor_2");
    }
}
