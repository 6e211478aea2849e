//! Fleet views: cohort classification and fleet-wide roll-ups
//!
//! ## Architecture
//!
//! - **classify**: partitions engines into Critical / Warning / Good cohorts
//!   using the shared overall-health band edges
//! - **FleetAssessment**: evaluated records plus engines skipped for lack of data
//! - **FleetSummary**: cohort counts and percentages for overviews and reports
//! - **sensor_issue_counts**: which sensors are most often out of band fleet-wide

pub mod classifier;
pub mod summary;

pub use classifier::{classify, classify_records};
pub use summary::{
    sensor_issue_counts, CohortStats, FleetAssessment, FleetSummary, SensorIssueCount, SensorIssues,
};
