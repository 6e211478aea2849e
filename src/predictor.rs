//! Engine assessment pipeline
//!
//! Ties the opaque RUL model to the health scoring core:
//!
//! 1. Take the last `sequence_length` cycles of an engine (fail fast if it has fewer)
//! 2. Ask the [`RulPredictor`] for a remaining-life estimate over that window
//! 3. Build per-sensor history windows and current readings
//! 4. Aggregate into an [`EngineHealthRecord`]
//!
//! Overall health is never computed without a resolved RUL. Engines that
//! cannot be predicted are reported as skipped, not scored.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::defaults::SEQUENCE_LENGTH;
use crate::fleet::FleetAssessment;
use crate::processing::{HealthScoreCalculator, SensorHistory, SensorSnapshot};
use crate::sensors::{EngineCycle, EngineDataset};
use crate::types::EngineHealthRecord;

/// Errors that prevent an engine from being assessed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssessmentError {
    #[error("Engine {0} not found in dataset")]
    UnknownEngine(u32),

    #[error("Engine {engine_id}: not enough data, need {needed} cycles, have {available}")]
    InsufficientCycles {
        engine_id: u32,
        needed: usize,
        available: usize,
    },

    #[error("RUL prediction failed: {0}")]
    Prediction(String),

    #[error("RUL prediction is not a finite number: {0}")]
    NonFinitePrediction(f64),
}

/// Remaining-useful-life model seen as a black box.
///
/// Receives the most recent cycles of one engine, oldest first, and returns
/// a remaining-life estimate in cycles. Implementations may block.
pub trait RulPredictor: Send + Sync {
    /// Estimate remaining cycles from the window.
    fn predict(&self, window: &[EngineCycle]) -> Result<f64, AssessmentError>;

    /// Minimum number of cycles the model needs.
    fn required_window(&self) -> usize {
        SEQUENCE_LENGTH
    }
}

/// Demo-mode predictor: echoes the ground-truth RUL of the latest cycle.
///
/// Useful when no trained model is available; fails if the dataset has no
/// RUL column.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundTruthPredictor;

impl RulPredictor for GroundTruthPredictor {
    fn predict(&self, window: &[EngineCycle]) -> Result<f64, AssessmentError> {
        window
            .last()
            .and_then(|c| c.rul)
            .map(|r| r as f64)
            .ok_or_else(|| AssessmentError::Prediction("dataset carries no RUL column".to_string()))
    }

    /// Only the last cycle is read; the configured window length governs.
    fn required_window(&self) -> usize {
        1
    }
}

/// Per-sensor history windows and last-cycle readings for every registered sensor.
///
/// Sensors absent from a cycle simply contribute fewer history points.
pub fn sensor_windows(
    window: &[EngineCycle],
    calculator: &HealthScoreCalculator,
) -> (SensorHistory, SensorSnapshot) {
    let mut history = SensorHistory::new();
    let mut current = SensorSnapshot::new();

    for id in calculator.registry().ids() {
        let values: Vec<f64> = window.iter().filter_map(|c| c.reading(id.as_str())).collect();
        if !values.is_empty() {
            history.insert(id.clone(), values);
        }
        if let Some(v) = window.last().and_then(|c| c.reading(id.as_str())) {
            current.insert(id.clone(), v);
        }
    }

    (history, current)
}

/// Runs RUL prediction and health scoring for engines of a dataset.
#[derive(Clone)]
pub struct EngineAssessor {
    calculator: HealthScoreCalculator,
    predictor: Arc<dyn RulPredictor>,
    sequence_length: usize,
}

impl std::fmt::Debug for EngineAssessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineAssessor")
            .field("sequence_length", &self.sequence_length)
            .finish_non_exhaustive()
    }
}

impl EngineAssessor {
    /// Window length is the larger of `sequence_length` and what the model requires.
    pub fn new(
        calculator: HealthScoreCalculator,
        predictor: Arc<dyn RulPredictor>,
        sequence_length: usize,
    ) -> Self {
        let sequence_length = sequence_length.max(predictor.required_window()).max(1);
        Self {
            calculator,
            predictor,
            sequence_length,
        }
    }

    pub fn calculator(&self) -> &HealthScoreCalculator {
        &self.calculator
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Assess one engine from its full cycle history.
    pub fn assess_engine(
        &self,
        engine_id: u32,
        cycles: &[EngineCycle],
    ) -> Result<EngineHealthRecord, AssessmentError> {
        if cycles.len() < self.sequence_length {
            return Err(AssessmentError::InsufficientCycles {
                engine_id,
                needed: self.sequence_length,
                available: cycles.len(),
            });
        }
        let window = &cycles[cycles.len() - self.sequence_length..];

        let raw = self.predictor.predict(window)?;
        if !raw.is_finite() {
            return Err(AssessmentError::NonFinitePrediction(raw));
        }
        // Halfway predictions go to the even cycle count
        let predicted_rul = raw.round_ties_even() as i64;
        let actual_rul = window.last().and_then(|c| c.rul);

        let (history, current) = sensor_windows(window, &self.calculator);
        Ok(self
            .calculator
            .aggregate(predicted_rul, &history, &current)
            .with_actual_rul(actual_rul))
    }

    /// Assess one engine of a dataset.
    pub fn assess(
        &self,
        dataset: &EngineDataset,
        engine_id: u32,
    ) -> Result<EngineHealthRecord, AssessmentError> {
        let cycles = dataset
            .cycles(engine_id)
            .ok_or(AssessmentError::UnknownEngine(engine_id))?;
        self.assess_engine(engine_id, cycles)
    }

    /// Assess every engine, in parallel.
    ///
    /// Engines are independent, so evaluation order does not matter; results
    /// are keyed by engine id for deterministic output.
    pub fn assess_fleet(&self, dataset: &EngineDataset) -> FleetAssessment {
        let ids: Vec<u32> = dataset.engine_ids().collect();
        let outcomes: Vec<(u32, Result<EngineHealthRecord, AssessmentError>)> = ids
            .par_iter()
            .map(|&id| (id, self.assess(dataset, id)))
            .collect();

        let mut records = BTreeMap::new();
        let mut skipped = BTreeMap::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(record) => {
                    records.insert(id, record);
                }
                Err(e) => {
                    warn!(engine_id = id, error = %e, "Engine skipped");
                    skipped.insert(id, e.to_string());
                }
            }
        }

        info!(
            evaluated = records.len(),
            skipped = skipped.len(),
            "Fleet assessment complete"
        );
        FleetAssessment { records, skipped }
    }
}
