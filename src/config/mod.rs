//! Configuration Module
//!
//! Operator-tunable settings loaded from TOML files, plus the fixed
//! constants every consumer of a health record must share.
//!
//! ## Loading Order
//!
//! 1. `SMARTMACH_CONFIG` environment variable (path to TOML file)
//! 2. `smartmach.toml` in the current working directory
//! 3. Built-in defaults (the standard 15-sensor table)
//!
//! ## Usage
//!
//! Load once at startup and hand the pieces out by `Arc`:
//!
//! ```ignore
//! let config = Arc::new(SmartMachConfig::load());
//! let calculator = HealthScoreCalculator::new(config.registry()?);
//! ```

mod app_config;
pub mod defaults;
pub mod validation;

pub use app_config::*;
