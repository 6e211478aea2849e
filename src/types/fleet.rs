//! Fleet cohort partition

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::health::HealthStatus;

/// Engines partitioned by overall health band.
///
/// The three sets are disjoint and together cover every classified engine.
/// Computed on demand; never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetCohort<K: Ord> {
    pub critical: BTreeSet<K>,
    pub warning: BTreeSet<K>,
    pub good: BTreeSet<K>,
}

impl<K: Ord> FleetCohort<K> {
    pub fn new() -> Self {
        Self {
            critical: BTreeSet::new(),
            warning: BTreeSet::new(),
            good: BTreeSet::new(),
        }
    }

    /// Place an engine into the set for `status`.
    pub fn insert(&mut self, key: K, status: HealthStatus) {
        match status {
            HealthStatus::Critical => self.critical.insert(key),
            HealthStatus::Warning => self.warning.insert(key),
            HealthStatus::Good => self.good.insert(key),
        };
    }

    /// Set of engines in the given band.
    pub fn members(&self, status: HealthStatus) -> &BTreeSet<K> {
        match status {
            HealthStatus::Critical => &self.critical,
            HealthStatus::Warning => &self.warning,
            HealthStatus::Good => &self.good,
        }
    }

    pub fn len(&self) -> usize {
        self.critical.len() + self.warning.len() + self.good.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
