//! Sensor trend forecasting
//!
//! Projects one sensor of one engine a few cycles ahead and flags where the
//! trajectory is heading:
//!
//! 1. Take up to `history_len` most recent finite readings (normalized)
//! 2. Ask the [`Forecaster`] for the next `horizon` values
//! 3. Read the trend from the last [`TREND_POINTS`] historical readings
//! 4. Classify every forecast point against the sensor band
//!
//! The forecaster is a black box, like the RUL model. [`LinearTrendForecaster`]
//! is the deterministic stand-in used by the CLI.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::defaults::{FORECAST_HISTORY, FORECAST_HORIZON, TREND_POINTS};
use crate::processing::classify_current;
use crate::processing::realism::convert;
use crate::registry::SensorRegistry;
use crate::sensors::EngineCycle;
use crate::types::{SensorDefinition, SensorId, SensorStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Sensor '{0}' is not registered")]
    UnknownSensor(String),

    #[error("Sensor '{sensor}': not enough data, need {needed} readings, have {available}")]
    InsufficientHistory {
        sensor: String,
        needed: usize,
        available: usize,
    },

    #[error("Forecast failed: {0}")]
    Model(String),

    #[error("Forecast step {0} is not a finite number")]
    NonFinite(usize),
}

/// Single-sensor forecasting model seen as a black box.
pub trait Forecaster: Send + Sync {
    /// Forecast the next `horizon` values from a history, oldest first.
    fn forecast(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>, ForecastError>;

    /// Minimum number of readings the model needs.
    fn required_history(&self) -> usize {
        2
    }
}

/// Least-squares line through the history, extended forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTrendForecaster;

impl Forecaster for LinearTrendForecaster {
    fn forecast(&self, history: &[f64], horizon: usize) -> Result<Vec<f64>, ForecastError> {
        if history.len() < self.required_history() {
            return Err(ForecastError::Model(format!(
                "line fit needs at least {} points",
                self.required_history()
            )));
        }

        let n = history.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = history.iter().copied().mean();
        let (num, den) = history
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(num, den), (i, y)| {
                let dx = i as f64 - x_mean;
                (num + dx * (y - y_mean), den + dx * dx)
            });
        let slope = num / den;

        Ok((0..horizon)
            .map(|k| y_mean + slope * ((n + k as f64) - x_mean))
            .collect())
    }
}

// ============================================================================
// Trend
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "Increasing"),
            TrendDirection::Decreasing => write!(f, "Decreasing"),
            TrendDirection::Stable => write!(f, "Stable"),
            TrendDirection::InsufficientData => write!(f, "Insufficient Data"),
        }
    }
}

/// Direction of the latest readings and whether the last one is already out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendAlert {
    pub direction: TrendDirection,
    pub will_cross_high: bool,
    pub will_cross_low: bool,
}

/// Classify the last [`TREND_POINTS`] values of `points` against `sensor`.
///
/// Only strictly monotonic runs count as a direction. With fewer points
/// there is no direction and no alert.
pub fn trend_and_alerts(points: &[f64], sensor: &SensorDefinition) -> TrendAlert {
    if points.len() < TREND_POINTS {
        return TrendAlert {
            direction: TrendDirection::InsufficientData,
            will_cross_high: false,
            will_cross_low: false,
        };
    }

    let tail = &points[points.len() - TREND_POINTS..];
    let direction = if tail.windows(2).all(|w| w[1] > w[0]) {
        TrendDirection::Increasing
    } else if tail.windows(2).all(|w| w[1] < w[0]) {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    let status = classify_current(sensor, tail[TREND_POINTS - 1]);
    TrendAlert {
        direction,
        will_cross_high: status == SensorStatus::High,
        will_cross_low: status == SensorStatus::Low,
    }
}

// ============================================================================
// Sensor Forecast
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Cycles ahead of the last reading, starting at 1
    pub step: usize,
    /// Engineering units when the sensor has a realistic range
    pub value: f64,
    pub status: SensorStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorForecast {
    pub sensor: SensorId,
    pub display_name: String,
    pub unit: String,
    pub history_used: usize,
    pub low_threshold: f64,
    pub high_threshold: f64,
    pub trend: TrendAlert,
    pub points: Vec<ForecastPoint>,
}

impl SensorForecast {
    /// Mean, minimum and maximum of the forecast values.
    pub fn value_stats(&self) -> Option<(f64, f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let values: Vec<f64> = self.points.iter().map(|p| p.value).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((values.iter().mean(), min, max))
    }

    pub fn out_of_band_steps(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.status != SensorStatus::Ok)
            .count()
    }
}

/// Runs a [`Forecaster`] over registered sensors of an engine.
#[derive(Clone)]
pub struct TrendAnalyzer {
    registry: Arc<SensorRegistry>,
    model: Arc<dyn Forecaster>,
    history_len: usize,
    horizon: usize,
}

impl std::fmt::Debug for TrendAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendAnalyzer")
            .field("history_len", &self.history_len)
            .field("horizon", &self.horizon)
            .finish_non_exhaustive()
    }
}

impl TrendAnalyzer {
    pub fn new(registry: Arc<SensorRegistry>, model: Arc<dyn Forecaster>) -> Self {
        Self {
            registry,
            model,
            history_len: FORECAST_HISTORY,
            horizon: FORECAST_HORIZON,
        }
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// History length never drops below what the model requires.
    pub fn with_history(mut self, history_len: usize) -> Self {
        self.history_len = history_len;
        self
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Forecast one sensor from an engine's cycle history (oldest first).
    pub fn forecast_sensor(
        &self,
        sensor_id: &str,
        cycles: &[EngineCycle],
    ) -> Result<SensorForecast, ForecastError> {
        let sensor = self
            .registry
            .get(sensor_id)
            .ok_or_else(|| ForecastError::UnknownSensor(sensor_id.to_string()))?;

        let window = self.history_len.max(self.model.required_history());
        let readings: Vec<f64> = cycles
            .iter()
            .filter_map(|c| c.reading(sensor_id))
            .filter(|v| v.is_finite())
            .collect();
        let history = &readings[readings.len().saturating_sub(window)..];

        let needed = self.model.required_history();
        if history.len() < needed {
            return Err(ForecastError::InsufficientHistory {
                sensor: sensor_id.to_string(),
                needed,
                available: history.len(),
            });
        }

        let forecast = self.model.forecast(history, self.horizon)?;
        if forecast.len() != self.horizon {
            return Err(ForecastError::Model(format!(
                "expected {} steps, got {}",
                self.horizon,
                forecast.len()
            )));
        }
        if let Some(step) = forecast.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::NonFinite(step + 1));
        }

        let range = sensor.realistic_range.as_ref();
        let points = forecast
            .iter()
            .enumerate()
            .map(|(i, &v)| ForecastPoint {
                step: i + 1,
                value: convert(range, v).value,
                status: classify_current(sensor, v),
            })
            .collect();

        let trend = trend_and_alerts(history, sensor);
        debug!(
            sensor = sensor_id,
            history = history.len(),
            direction = %trend.direction,
            "Sensor forecast complete"
        );

        Ok(SensorForecast {
            sensor: sensor.id.clone(),
            display_name: sensor.display_name.clone(),
            unit: range.map(|r| r.unit.clone()).unwrap_or_default(),
            history_used: history.len(),
            low_threshold: convert(range, sensor.low_threshold).value,
            high_threshold: convert(range, sensor.high_threshold).value,
            trend,
            points,
        })
    }
}
