//! Scenario pricing and recommendation

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::config::CostConfig;
use crate::types::EngineHealthRecord;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CostError {
    #[error("Cost model returned a non-finite base cost for the {scenario} scenario: {cost}")]
    NonFiniteCost { scenario: Scenario, cost: f64 },
}

// ============================================================================
// Inputs
// ============================================================================

/// Cost model features derived from one engine's health record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    pub predicted_rul: i64,
    pub warning_sensors: usize,
    pub critical_sensors: usize,
    /// `total - warning - critical`
    pub good_sensors: usize,
    /// Mean assessment score (2dp), 0 when no sensor was evaluated
    pub sensor_health: f64,
    /// Mean assessment anomaly level (2dp), 0 when no sensor was evaluated
    pub anomaly_level: f64,
}

impl CostInputs {
    pub fn from_record(record: &EngineHealthRecord) -> Self {
        Self {
            predicted_rul: record.predicted_rul,
            warning_sensors: record.warning_sensors.len(),
            critical_sensors: record.critical_sensors.len(),
            good_sensors: record.good_sensor_count(),
            sensor_health: record.mean_sensor_score(),
            anomaly_level: record.mean_anomaly_level(),
        }
    }

    pub fn total_sensors(&self) -> usize {
        self.good_sensors + self.warning_sensors + self.critical_sensors
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// Repair timing options, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    /// Repair ahead of the predicted failure by the preventive lead time
    Preventive,
    /// Repair now, with the predicted RUL still remaining
    Current,
    /// Run to the predicted end of life, then repair
    EndOfLife,
    /// Run past failure; repair lands after the emergency delay
    Emergency,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Preventive,
        Scenario::Current,
        Scenario::EndOfLife,
        Scenario::Emergency,
    ];

    /// Repair day fed to the cost model.
    ///
    /// Preventive is `-lead`, Current is the predicted RUL, EndOfLife is 0
    /// and Emergency is `+delay`.
    pub fn repair_day(self, predicted_rul: i64, config: &CostConfig) -> i64 {
        match self {
            Scenario::Preventive => -config.preventive_lead_days,
            Scenario::Current => predicted_rul,
            Scenario::EndOfLife => 0,
            Scenario::Emergency => config.emergency_delay_days,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Preventive => write!(f, "Preventive"),
            Scenario::Current => write!(f, "Current"),
            Scenario::EndOfLife => write!(f, "End-of-Life"),
            Scenario::Emergency => write!(f, "Emergency"),
        }
    }
}

/// Downtime penalty for a repair day.
///
/// Day 0 costs one day of downtime; the emergency delay day costs the whole
/// delay plus the failure day. Every other day carries no penalty. The
/// penalty follows the repair day, so a Current scenario whose predicted RUL
/// happens to equal 0 or the delay is charged the same way.
pub fn downtime_penalty(repair_day: i64, config: &CostConfig) -> f64 {
    if repair_day == 0 {
        config.penalty_per_day
    } else if repair_day == config.emergency_delay_days {
        (config.emergency_delay_days + 1) as f64 * config.penalty_per_day
    } else {
        0.0
    }
}

// ============================================================================
// Cost Model
// ============================================================================

/// Base maintenance cost of repairing on a given day.
///
/// Treated as opaque: a trained regressor, a lookup table or the linear
/// default below. Implementations must return finite values.
pub trait CostModel: Send + Sync {
    fn base_cost(&self, repair_day: i64, inputs: &CostInputs) -> f64;
}

/// Deterministic linear cost model.
///
/// `fixed + per_critical * critical + per_warning * warning
///  + per_anomaly_point * anomaly + per_health_deficit_point * (100 - sensor_health)
///  + per_day_offset * |repair_day|`, floored at 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearCostModel {
    pub fixed: f64,
    pub per_critical: f64,
    pub per_warning: f64,
    pub per_anomaly_point: f64,
    pub per_health_deficit_point: f64,
    /// Cost of moving the repair one day away from the predicted failure
    pub per_day_offset: f64,
}

impl Default for LinearCostModel {
    fn default() -> Self {
        Self {
            fixed: 150_000.0,
            per_critical: 40_000.0,
            per_warning: 15_000.0,
            per_anomaly_point: 2_000.0,
            per_health_deficit_point: 1_000.0,
            per_day_offset: 1_500.0,
        }
    }
}

impl CostModel for LinearCostModel {
    fn base_cost(&self, repair_day: i64, inputs: &CostInputs) -> f64 {
        let cost = self.fixed
            + self.per_critical * inputs.critical_sensors as f64
            + self.per_warning * inputs.warning_sensors as f64
            + self.per_anomaly_point * inputs.anomaly_level
            + self.per_health_deficit_point * (100.0 - inputs.sensor_health).max(0.0)
            + self.per_day_offset * repair_day.unsigned_abs() as f64;
        cost.max(0.0)
    }
}

// ============================================================================
// Optimizer
// ============================================================================

/// Priced scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioCost {
    pub scenario: Scenario,
    pub repair_day: i64,
    pub base_cost: f64,
    pub downtime_penalty: f64,
    pub final_cost: f64,
}

/// All priced scenarios plus the cheapest one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecommendation {
    pub inputs: CostInputs,
    /// In [`Scenario::ALL`] order
    pub scenarios: Vec<ScenarioCost>,
    pub recommended: Scenario,
    pub recommended_cost: f64,
    /// Most expensive final cost minus the recommended one
    pub savings: f64,
}

impl CostRecommendation {
    pub fn get(&self, scenario: Scenario) -> Option<&ScenarioCost> {
        self.scenarios.iter().find(|s| s.scenario == scenario)
    }
}

/// Prices scenarios with a cost model and the configured penalty terms.
#[derive(Debug, Clone)]
pub struct MaintenanceOptimizer<M: CostModel> {
    model: M,
    config: CostConfig,
}

impl<M: CostModel> MaintenanceOptimizer<M> {
    pub fn new(model: M, config: CostConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Price every scenario and pick the cheapest.
    ///
    /// Ties keep the earlier scenario in [`Scenario::ALL`] order.
    pub fn optimize(&self, inputs: &CostInputs) -> Result<CostRecommendation, CostError> {
        let mut scenarios = Vec::with_capacity(Scenario::ALL.len());
        for scenario in Scenario::ALL {
            let repair_day = scenario.repair_day(inputs.predicted_rul, &self.config);
            let base_cost = self.model.base_cost(repair_day, inputs);
            if !base_cost.is_finite() {
                return Err(CostError::NonFiniteCost {
                    scenario,
                    cost: base_cost,
                });
            }
            let penalty = downtime_penalty(repair_day, &self.config);
            scenarios.push(ScenarioCost {
                scenario,
                repair_day,
                base_cost,
                downtime_penalty: penalty,
                final_cost: base_cost + penalty,
            });
        }

        let mut best = &scenarios[0];
        let mut worst_cost = best.final_cost;
        for s in &scenarios[1..] {
            if s.final_cost < best.final_cost {
                best = s;
            }
            worst_cost = worst_cost.max(s.final_cost);
        }
        let (recommended, recommended_cost) = (best.scenario, best.final_cost);

        debug!(
            recommended = %recommended,
            cost = recommended_cost,
            savings = worst_cost - recommended_cost,
            "Maintenance scenarios priced"
        );

        Ok(CostRecommendation {
            inputs: inputs.clone(),
            scenarios,
            recommended,
            recommended_cost,
            savings: worst_cost - recommended_cost,
        })
    }

    /// Derive inputs from a health record and optimize.
    pub fn optimize_record(&self, record: &EngineHealthRecord) -> Result<CostRecommendation, CostError> {
        self.optimize(&CostInputs::from_record(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HealthStatus, SensorAssessment, SensorId, SensorStatus};
    use std::collections::BTreeMap;

    /// Base cost depends only on the repair day.
    struct DayTable([f64; 4]);

    impl CostModel for DayTable {
        fn base_cost(&self, repair_day: i64, _inputs: &CostInputs) -> f64 {
            match repair_day {
                -10 => self.0[0],
                0 => self.0[2],
                10 => self.0[3],
                _ => self.0[1],
            }
        }
    }

    fn inputs(predicted_rul: i64) -> CostInputs {
        CostInputs {
            predicted_rul,
            warning_sensors: 2,
            critical_sensors: 1,
            good_sensors: 12,
            sensor_health: 88.5,
            anomaly_level: 11.5,
        }
    }

    #[test]
    fn test_repair_days() {
        let config = CostConfig::default();
        let days: Vec<i64> = Scenario::ALL.iter().map(|s| s.repair_day(37, &config)).collect();
        assert_eq!(days, vec![-10, 37, 0, 10]);
    }

    #[test]
    fn test_downtime_penalty() {
        let config = CostConfig::default();
        assert_eq!(downtime_penalty(0, &config), 200_000.0);
        assert_eq!(downtime_penalty(10, &config), 2_200_000.0);
        assert_eq!(downtime_penalty(-10, &config), 0.0);
        assert_eq!(downtime_penalty(37, &config), 0.0);
    }

    #[test]
    fn test_recommendation_and_savings() {
        let optimizer = MaintenanceOptimizer::new(
            DayTable([300_000.0, 250_000.0, 200_000.0, 100_000.0]),
            CostConfig::default(),
        );
        let rec = optimizer.optimize(&inputs(37)).unwrap();

        let finals: Vec<f64> = rec.scenarios.iter().map(|s| s.final_cost).collect();
        assert_eq!(finals, vec![300_000.0, 250_000.0, 400_000.0, 2_300_000.0]);
        assert_eq!(rec.recommended, Scenario::Current);
        assert_eq!(rec.recommended_cost, 250_000.0);
        assert_eq!(rec.savings, 2_050_000.0);
    }

    #[test]
    fn test_ties_keep_first_scenario() {
        let optimizer = MaintenanceOptimizer::new(
            DayTable([100_000.0, 100_000.0, 500_000.0, 500_000.0]),
            CostConfig::default(),
        );
        let rec = optimizer.optimize(&inputs(37)).unwrap();
        assert_eq!(rec.recommended, Scenario::Preventive);
    }

    #[test]
    fn test_current_scenario_at_zero_rul_is_penalised() {
        let optimizer = MaintenanceOptimizer::new(DayTable([1.0, 1.0, 1.0, 1.0]), CostConfig::default());
        let rec = optimizer.optimize(&inputs(0)).unwrap();
        let current = rec.get(Scenario::Current).unwrap();
        assert_eq!(current.repair_day, 0);
        assert_eq!(current.downtime_penalty, 200_000.0);
    }

    #[test]
    fn test_non_finite_base_cost_is_an_error() {
        let optimizer = MaintenanceOptimizer::new(
            DayTable([1.0, f64::NAN, 1.0, 1.0]),
            CostConfig::default(),
        );
        let err = optimizer.optimize(&inputs(37)).unwrap_err();
        assert!(matches!(err, CostError::NonFiniteCost { scenario: Scenario::Current, .. }));
    }

    #[test]
    fn test_linear_model_grows_with_damage() {
        let model = LinearCostModel::default();
        let healthy = CostInputs {
            predicted_rul: 100,
            warning_sensors: 0,
            critical_sensors: 0,
            good_sensors: 15,
            sensor_health: 100.0,
            anomaly_level: 0.0,
        };
        let damaged = inputs(100);
        assert_eq!(model.base_cost(0, &healthy), 150_000.0);
        assert!(model.base_cost(0, &damaged) > model.base_cost(0, &healthy));
        assert_eq!(
            model.base_cost(-10, &healthy),
            model.base_cost(10, &healthy),
            "day offset is symmetric"
        );
    }

    fn assessment(id: &str, status: SensorStatus, anomaly: f64) -> (SensorId, SensorAssessment) {
        let sensor_id = SensorId::new(id);
        (
            sensor_id.clone(),
            SensorAssessment {
                sensor_id,
                display_name: id.to_uppercase(),
                current_value: 1.0,
                unit: String::new(),
                current_status: status,
                anomaly_level: anomaly,
                score: 100.0 - anomaly,
                cycles_analyzed: 50,
            },
        )
    }

    #[test]
    fn test_inputs_from_record_counts_partition_sensors() {
        let assessments: BTreeMap<_, _> = [
            assessment("a", SensorStatus::Ok, 10.0),
            assessment("b", SensorStatus::Low, 20.0),
            assessment("c", SensorStatus::High, 60.0),
            assessment("d", SensorStatus::Ok, 0.0),
        ]
        .into_iter()
        .collect();
        let record = EngineHealthRecord {
            predicted_rul: 42,
            actual_rul: None,
            rul_health: 40.0,
            sensor_health: 77.5,
            sensor_data_available: true,
            overall_health: 55.0,
            health_status: HealthStatus::Warning,
            critical_sensors: vec!["C".to_string()],
            warning_sensors: vec!["B".to_string()],
            assessments,
            skipped_sensors: Vec::new(),
        };

        let inputs = CostInputs::from_record(&record);
        assert_eq!(inputs.predicted_rul, 42);
        assert_eq!(inputs.good_sensors, 2);
        assert_eq!(inputs.total_sensors(), record.total_sensors());
        assert_eq!(inputs.sensor_health, 77.5);
        assert_eq!(inputs.anomaly_level, 22.5);
    }

    #[test]
    fn test_inputs_from_record_without_assessments() {
        let record = EngineHealthRecord {
            predicted_rul: 5,
            actual_rul: None,
            rul_health: 5.0,
            sensor_health: 100.0,
            sensor_data_available: false,
            overall_health: 43.0,
            health_status: HealthStatus::Warning,
            critical_sensors: Vec::new(),
            warning_sensors: Vec::new(),
            assessments: BTreeMap::new(),
            skipped_sensors: Vec::new(),
        };
        let inputs = CostInputs::from_record(&record);
        assert_eq!(inputs.good_sensors, 0);
        assert_eq!(inputs.sensor_health, 0.0);
        assert_eq!(inputs.anomaly_level, 0.0);
    }
}
