//! SmartMach: Predictive Maintenance Health Scoring
//!
//! Turns per-cycle engine sensor histories plus a RUL prediction into a
//! classified health assessment, and builds fleet views on top of it.
//!
//! ## Architecture
//!
//! - **Sensor Registry**: validated, immutable sensor table shared by `Arc`
//! - **Sensor Health Evaluator**: per-sensor anomaly level, score and status
//! - **Health Score Calculator**: banded RUL health blended with sensor health
//! - **Fleet Classifier**: Critical / Warning / Good cohorts on the same bands
//! - **Engine Assessor**: windowing, opaque RUL model, parallel fleet runs
//! - **Cost Optimizer** and **Root-Cause Attribution**: consumers of the health record
//! - **Trend Analyzer**: short sensor forecasts with direction and band alerts

pub mod causal;
pub mod config;
pub mod fleet;
pub mod forecast;
pub mod optimization;
pub mod predictor;
pub mod processing;
pub mod registry;
pub mod report;
pub mod sensors;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, SmartMachConfig};

// Re-export commonly used types
pub use types::{
    EngineHealthRecord, FleetCohort, HealthStatus, RealisticRange, SensorAssessment,
    SensorDefinition, SensorHealthSummary, SensorId, SensorStatus,
};

// Re-export the scoring pipeline
pub use fleet::{classify, FleetAssessment, FleetSummary};
pub use forecast::{trend_and_alerts, Forecaster, TrendAnalyzer, TrendDirection};
pub use predictor::{AssessmentError, EngineAssessor, GroundTruthPredictor, RulPredictor};
pub use processing::{HealthScoreCalculator, SensorHealthEvaluator};
pub use registry::{RegistryError, SensorRegistry};
pub use sensors::{EngineCycle, EngineDataset};
