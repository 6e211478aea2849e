//! Fleet-wide roll-ups: cohort statistics and recurring sensor issues
//!
//! These are the numbers every fleet view and fleet report shares, computed
//! once from a [`FleetAssessment`] so consumers never re-derive them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::classifier::classify_records;
use crate::registry::SensorRegistry;
use crate::types::{EngineHealthRecord, FleetCohort};

/// Outcome of assessing every engine in a dataset.
///
/// Engines that could not be assessed (too few cycles, predictor failure)
/// are listed in `skipped` with the reason, never given a partial record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetAssessment {
    pub records: BTreeMap<u32, EngineHealthRecord>,
    pub skipped: BTreeMap<u32, String>,
}

impl FleetAssessment {
    pub fn cohort(&self) -> FleetCohort<u32> {
        classify_records(&self.records)
    }

    /// Overall health score per evaluated engine.
    pub fn scores(&self) -> BTreeMap<u32, f64> {
        self.records
            .iter()
            .map(|(id, r)| (*id, r.overall_health))
            .collect()
    }
}

/// Size of one cohort and its share of the evaluated fleet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortStats {
    pub count: usize,
    /// Percentage of evaluated engines (1dp), 0.0 for an empty fleet
    pub percent: f64,
}

impl CohortStats {
    fn new(count: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64 * 1000.0).round() / 10.0
        };
        Self { count, percent }
    }
}

/// Headline numbers for a fleet overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub generated_at: DateTime<Utc>,
    pub evaluated: usize,
    pub skipped: usize,
    pub good: CohortStats,
    pub warning: CohortStats,
    pub critical: CohortStats,
    /// Evaluated engines whose sensor health is the no-data fallback
    pub without_sensor_data: usize,
}

impl FleetSummary {
    pub fn from_assessment(assessment: &FleetAssessment) -> Self {
        let cohort = assessment.cohort();
        let total = cohort.len();
        Self {
            generated_at: Utc::now(),
            evaluated: total,
            skipped: assessment.skipped.len(),
            good: CohortStats::new(cohort.good.len(), total),
            warning: CohortStats::new(cohort.warning.len(), total),
            critical: CohortStats::new(cohort.critical.len(), total),
            without_sensor_data: assessment
                .records
                .values()
                .filter(|r| !r.sensor_data_available)
                .count(),
        }
    }
}

/// How many engines currently flag a given sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorIssueCount {
    pub display_name: String,
    pub engines: usize,
}

/// Recurring sensor problems across the fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorIssues {
    /// Sensors reading above their band, most frequent first
    pub critical: Vec<SensorIssueCount>,
    /// Sensors reading below their band, most frequent first
    pub warning: Vec<SensorIssueCount>,
}

/// Count, per sensor, how many engines list it as critical or warning.
///
/// Sensors never flagged are omitted. Ties keep registry order.
pub fn sensor_issue_counts<'a>(
    records: impl IntoIterator<Item = &'a EngineHealthRecord>,
    registry: &SensorRegistry,
) -> SensorIssues {
    let mut critical: BTreeMap<&str, usize> = BTreeMap::new();
    let mut warning: BTreeMap<&str, usize> = BTreeMap::new();

    for record in records {
        for name in &record.critical_sensors {
            *critical.entry(name.as_str()).or_default() += 1;
        }
        for name in &record.warning_sensors {
            *warning.entry(name.as_str()).or_default() += 1;
        }
    }

    let rank = |counts: &BTreeMap<&str, usize>| -> Vec<SensorIssueCount> {
        let mut ranked: Vec<SensorIssueCount> = registry
            .iter()
            .filter_map(|s| {
                counts.get(s.display_name.as_str()).map(|&engines| SensorIssueCount {
                    display_name: s.display_name.clone(),
                    engines,
                })
            })
            .collect();
        // Stable sort keeps registry order among equal counts
        ranked.sort_by(|a, b| b.engines.cmp(&a.engines));
        ranked
    };

    SensorIssues {
        critical: rank(&critical),
        warning: rank(&warning),
    }
}
