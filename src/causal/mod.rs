//! Root-Cause Attribution
//!
//! Ranks model features by how strongly they drive the predicted RUL, with
//! sensor ids translated to display names for reports.
//!
//! ## Algorithm
//!
//! - Ask the [`AttributionModel`] for `(feature, importance)` pairs
//! - Drop the elapsed-time feature (needed by the model, meaningless as a cause)
//! - Map registered sensor ids to display names; other features keep their name
//! - Sort by importance descending and keep the top N
//!
//! The attribution model itself is opaque: a tree ensemble's impurity
//! importances, SHAP values for one engine, or a fixed table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::config::defaults::{HIDDEN_ATTRIBUTION_FEATURE, ROOT_CAUSE_TOP_N};
use crate::registry::SensorRegistry;

#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("Failed to read importance file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid importance table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of per-feature importances.
pub trait AttributionModel {
    fn importances(&self) -> Vec<(String, f64)>;
}

/// Fixed importance table, typically exported from a trained model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticAttribution {
    table: BTreeMap<String, f64>,
}

impl StaticAttribution {
    pub fn new(table: BTreeMap<String, f64>) -> Self {
        Self { table }
    }

    /// Parse a JSON object of `"feature": importance` pairs.
    pub fn from_json(json: &str) -> Result<Self, AttributionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, AttributionError> {
        let json = std::fs::read_to_string(path).map_err(|e| AttributionError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let model = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), features = model.table.len(), "Loaded importance table");
        Ok(model)
    }
}

impl AttributionModel for StaticAttribution {
    fn importances(&self) -> Vec<(String, f64)> {
        self.table.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

/// One ranked contributing factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFactor {
    /// Model feature name (sensor id for registered sensors)
    pub feature: String,
    /// Display name for registered sensors, the feature name otherwise
    pub display_name: String,
    pub importance: f64,
}

/// Rank the model's features as root-cause candidates.
///
/// NaN importances compare equal to everything, so they keep their input
/// position relative to their neighbours.
pub fn rank_factors<A: AttributionModel + ?Sized>(
    model: &A,
    registry: &SensorRegistry,
    top_n: usize,
) -> Vec<RankedFactor> {
    let mut factors: Vec<RankedFactor> = model
        .importances()
        .into_iter()
        .filter(|(feature, _)| feature != HIDDEN_ATTRIBUTION_FEATURE)
        .map(|(feature, importance)| RankedFactor {
            display_name: registry
                .display_name(&feature)
                .map_or_else(|| feature.clone(), str::to_string),
            feature,
            importance,
        })
        .collect();

    factors.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    factors.truncate(top_n);
    factors
}

/// [`rank_factors`] with the standard report length.
pub fn top_factors<A: AttributionModel + ?Sized>(model: &A, registry: &SensorRegistry) -> Vec<RankedFactor> {
    rank_factors(model, registry, ROOT_CAUSE_TOP_N)
}
