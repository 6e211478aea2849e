//! Maintenance Cost Optimizer
//!
//! Prices four repair-timing scenarios for one engine and recommends the
//! cheapest. The base cost comes from a pluggable [`CostModel`]; the
//! downtime penalty on top of it is fixed arithmetic.

mod cost;

pub use cost::{
    downtime_penalty, CostError, CostInputs, CostModel, CostRecommendation, LinearCostModel,
    MaintenanceOptimizer, Scenario, ScenarioCost,
};
