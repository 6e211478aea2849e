//! Shared data structures for engine health assessment
//!
//! This module defines the core types for the health scoring pipeline:
//! - Sensor registry entries: SensorId, SensorDefinition, RealisticRange
//! - Per-sensor output: SensorStatus, SensorAssessment
//! - Per-engine output: SensorHealthSummary, EngineHealthRecord, HealthStatus
//! - Fleet output: FleetCohort

mod fleet;
mod health;
mod sensor;

pub use fleet::*;
pub use health::*;
pub use sensor::*;
