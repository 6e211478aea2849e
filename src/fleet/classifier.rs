//! Fleet classification by overall health band

use std::collections::BTreeMap;

use crate::types::{EngineHealthRecord, FleetCohort, HealthStatus};

/// Partition engines by overall health score.
///
/// Uses the same band edges as the health aggregator (lower edge
/// inclusive): Critical < 41 <= Warning < 65 <= Good. Every key lands in
/// exactly one set.
pub fn classify<K: Ord + Clone>(scores: &BTreeMap<K, f64>) -> FleetCohort<K> {
    let mut cohort = FleetCohort::new();
    for (engine_id, &score) in scores {
        cohort.insert(engine_id.clone(), HealthStatus::from_score(score));
    }
    cohort
}

/// Partition full health records by their overall score.
pub fn classify_records<K: Ord + Clone>(records: &BTreeMap<K, EngineHealthRecord>) -> FleetCohort<K> {
    let scores: BTreeMap<K, f64> = records
        .iter()
        .map(|(k, r)| (k.clone(), r.overall_health))
        .collect();
    classify(&scores)
}
