//! System-wide default constants.
//!
//! Band edges and RUL breakpoints are a shared contract between the health
//! aggregator, the fleet classifier and every report consumer. They are not
//! operator-tunable; change them here or nowhere.

// ============================================================================
// Health Bands
// ============================================================================

/// Overall health at or above this score is GOOD.
pub const GOOD_BAND_MIN: f64 = 65.0;

/// Overall health at or above this score (and below [`GOOD_BAND_MIN`]) is WARNING.
/// Anything below is CRITICAL.
pub const WARNING_BAND_MIN: f64 = 41.0;

// ============================================================================
// RUL Banding
// ============================================================================

/// Predicted RUL strictly above this maps to [`RUL_HEALTH_EXCELLENT`].
pub const RUL_BREAKPOINT_EXCELLENT: i64 = 150;
/// Predicted RUL strictly above this maps to [`RUL_HEALTH_GOOD`].
pub const RUL_BREAKPOINT_GOOD: i64 = 50;
/// Predicted RUL strictly above this maps to [`RUL_HEALTH_DEGRADED`].
pub const RUL_BREAKPOINT_DEGRADED: i64 = 20;
/// Predicted RUL strictly above this maps to [`RUL_HEALTH_FAILING`]; at or below is 0.
pub const RUL_BREAKPOINT_FAILING: i64 = 1;

pub const RUL_HEALTH_EXCELLENT: f64 = 100.0;
pub const RUL_HEALTH_GOOD: f64 = 70.0;
pub const RUL_HEALTH_DEGRADED: f64 = 40.0;
pub const RUL_HEALTH_FAILING: f64 = 5.0;
pub const RUL_HEALTH_FAILED: f64 = 0.0;

// ============================================================================
// Weights
// ============================================================================

/// Weight of the banded RUL health in the overall score.
pub const RUL_WEIGHT: f64 = 0.6;

/// Weight of the averaged sensor health in the overall score.
pub const SENSOR_WEIGHT: f64 = 0.4;

/// Sensor health reported when no sensor could be evaluated.
pub const NO_SENSOR_DATA_HEALTH: f64 = 100.0;

/// Scale for in-range deviation from the midpoint, relative to the band width.
/// A reading on either band edge contributes half of this value.
pub const IN_RANGE_ANOMALY_SCALE: f64 = 50.0;

// ============================================================================
// Data Window
// ============================================================================

/// Number of most recent cycles fed to the RUL model and the sensor evaluator.
pub const SEQUENCE_LENGTH: usize = 50;

/// Feature column that the attribution model consumes but reports must hide.
pub const HIDDEN_ATTRIBUTION_FEATURE: &str = "time_laps";

/// Number of root-cause factors reported by default.
pub const ROOT_CAUSE_TOP_N: usize = 10;

// ============================================================================
// Cost Optimizer
// ============================================================================

/// Downtime penalty charged per day of unplanned outage (currency units).
pub const PENALTY_PER_DAY: f64 = 200_000.0;

/// Days ahead of schedule for the preventive scenario.
pub const PREVENTIVE_LEAD_DAYS: i64 = 10;

/// Days of delay for the emergency scenario.
pub const EMERGENCY_DELAY_DAYS: i64 = 10;

// ============================================================================
// Trend Forecast
// ============================================================================

/// Most recent readings of one sensor handed to the forecaster.
pub const FORECAST_HISTORY: usize = 100;

/// Number of future cycles forecast per sensor.
pub const FORECAST_HORIZON: usize = 10;

/// Trailing points that decide the trend direction.
pub const TREND_POINTS: usize = 3;

// ============================================================================
// Maintenance Recommendations
// ============================================================================

/// Predicted RUL below this calls for immediate maintenance.
pub const IMMEDIATE_MAINTENANCE_RUL: i64 = 20;

/// Predicted RUL below this (and at or above the immediate limit) calls for planned maintenance.
pub const PLANNED_MAINTENANCE_RUL: i64 = 50;
