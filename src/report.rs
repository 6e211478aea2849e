//! Fleet report export and per-engine maintenance advice
//!
//! One row per evaluated engine in ascending id order. Sensor columns carry
//! counts; the full lists are available through the JSON form of the record.

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::config::defaults::{IMMEDIATE_MAINTENANCE_RUL, PLANNED_MAINTENANCE_RUL};
use crate::fleet::FleetAssessment;
use crate::types::{EngineHealthRecord, HealthStatus};

pub const CSV_HEADER: &str =
    "Engine_ID,Health_Score_Percent,Status,Predicted_RUL,Actual_RUL,Critical_Sensors,Warning_Sensors";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetReportRow {
    pub engine_id: u32,
    pub health_score_percent: f64,
    pub status: HealthStatus,
    pub predicted_rul: i64,
    pub actual_rul: Option<i64>,
    pub critical_sensors: usize,
    pub warning_sensors: usize,
}

impl FleetReportRow {
    pub fn from_record(engine_id: u32, record: &EngineHealthRecord) -> Self {
        Self {
            engine_id,
            health_score_percent: record.overall_health,
            status: record.health_status,
            predicted_rul: record.predicted_rul,
            actual_rul: record.actual_rul,
            critical_sensors: record.critical_sensors.len(),
            warning_sensors: record.warning_sensors.len(),
        }
    }

    /// Missing ground truth is an empty cell.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{:.2},{},{},{},{},{}",
            self.engine_id,
            self.health_score_percent,
            self.status,
            self.predicted_rul,
            self.actual_rul.map_or_else(String::new, |r| r.to_string()),
            self.critical_sensors,
            self.warning_sensors
        )
    }
}

pub fn report_rows(assessment: &FleetAssessment) -> Vec<FleetReportRow> {
    assessment
        .records
        .iter()
        .map(|(id, record)| FleetReportRow::from_record(*id, record))
        .collect()
}

/// Write the fleet CSV report. Skipped engines do not appear.
pub fn write_fleet_csv<W: Write>(assessment: &FleetAssessment, mut out: W) -> std::io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for row in report_rows(assessment) {
        writeln!(out, "{}", row.to_csv_line())?;
    }
    out.flush()
}

// ============================================================================
// Maintenance Recommendations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaintenanceUrgency {
    Immediate,
    Planned,
    Routine,
}

impl MaintenanceUrgency {
    pub fn from_rul(predicted_rul: i64) -> Self {
        if predicted_rul < IMMEDIATE_MAINTENANCE_RUL {
            MaintenanceUrgency::Immediate
        } else if predicted_rul < PLANNED_MAINTENANCE_RUL {
            MaintenanceUrgency::Planned
        } else {
            MaintenanceUrgency::Routine
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            MaintenanceUrgency::Immediate => "Engine nearing failure, immediate maintenance required.",
            MaintenanceUrgency::Planned => "Plan maintenance within the next few cycles.",
            MaintenanceUrgency::Routine => "Engine is healthy. Continue normal operation.",
        }
    }
}

/// Human-readable maintenance advice for one engine.
///
/// The first line always comes from the predicted RUL. Sensor lines follow:
/// critical, then warning, or a single all-clear when both lists are empty.
pub fn maintenance_recommendations(record: &EngineHealthRecord) -> Vec<String> {
    let mut recs = vec![MaintenanceUrgency::from_rul(record.predicted_rul)
        .advice()
        .to_string()];

    if !record.critical_sensors.is_empty() {
        recs.push(format!("Critical Sensors: {}.", record.critical_sensors.join(", ")));
    }
    if !record.warning_sensors.is_empty() {
        recs.push(format!("Warning Sensors: {}.", record.warning_sensors.join(", ")));
    }
    if record.critical_sensors.is_empty() && record.warning_sensors.is_empty() {
        recs.push("All sensors operating within safe ranges.".to_string());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(overall: f64, actual: Option<i64>, critical: usize) -> EngineHealthRecord {
        EngineHealthRecord {
            predicted_rul: 64,
            actual_rul: actual,
            rul_health: 70.0,
            sensor_health: 90.0,
            sensor_data_available: true,
            overall_health: overall,
            health_status: HealthStatus::from_score(overall),
            critical_sensors: (0..critical).map(|i| format!("S{i}")).collect(),
            warning_sensors: vec!["Pressure".to_string()],
            assessments: BTreeMap::new(),
            skipped_sensors: Vec::new(),
        }
    }

    #[test]
    fn test_csv_rows_sorted_by_engine() {
        let mut assessment = FleetAssessment::default();
        assessment.records.insert(12, record(38.5, None, 2));
        assessment.records.insert(3, record(78.0, Some(61), 0));
        assessment.skipped.insert(7, "not enough data".to_string());

        let mut buf = Vec::new();
        write_fleet_csv(&assessment, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3, "skipped engines are not reported");
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "3,78.00,GOOD,64,61,0,1");
        assert_eq!(lines[2], "12,38.50,CRITICAL,64,,2,1");
    }

    #[test]
    fn test_row_serializes_status_uppercase() {
        let row = FleetReportRow::from_record(1, &record(50.0, None, 0));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["status"], "WARNING");
        assert!(json["actual_rul"].is_null());
    }

    #[test]
    fn test_urgency_breakpoints() {
        assert_eq!(MaintenanceUrgency::from_rul(0), MaintenanceUrgency::Immediate);
        assert_eq!(MaintenanceUrgency::from_rul(19), MaintenanceUrgency::Immediate);
        assert_eq!(MaintenanceUrgency::from_rul(20), MaintenanceUrgency::Planned);
        assert_eq!(MaintenanceUrgency::from_rul(49), MaintenanceUrgency::Planned);
        assert_eq!(MaintenanceUrgency::from_rul(50), MaintenanceUrgency::Routine);
    }

    #[test]
    fn test_recommendations_immediate_with_both_lists() {
        let mut r = record(30.0, None, 2);
        r.predicted_rul = 12;
        assert_eq!(
            maintenance_recommendations(&r),
            vec![
                "Engine nearing failure, immediate maintenance required.".to_string(),
                "Critical Sensors: S0, S1.".to_string(),
                "Warning Sensors: Pressure.".to_string(),
            ]
        );
    }

    #[test]
    fn test_recommendations_planned_warning_only() {
        let mut r = record(60.0, None, 0);
        r.predicted_rul = 35;
        let recs = maintenance_recommendations(&r);
        assert_eq!(recs[0], "Plan maintenance within the next few cycles.");
        assert_eq!(recs[1..], ["Warning Sensors: Pressure.".to_string()]);
    }

    #[test]
    fn test_recommendations_all_clear() {
        let mut r = record(90.0, None, 0);
        r.warning_sensors.clear();
        assert_eq!(
            maintenance_recommendations(&r),
            vec![
                "Engine is healthy. Continue normal operation.".to_string(),
                "All sensors operating within safe ranges.".to_string(),
            ]
        );
    }
}
