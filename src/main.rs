//! SmartMach - predictive maintenance health scoring CLI
//!
//! # Usage
//!
//! ```bash
//! # Generate a synthetic fleet and review it
//! ./simulation --engines 20 > fleet.csv
//! smartmach fleet --data fleet.csv --csv fleet_report.csv
//!
//! # Drill into one engine
//! smartmach engine --data fleet.csv --id 7
//! smartmach cost --data fleet.csv --id 7
//! smartmach trend --data fleet.csv --id 7 --sensor sensor_21
//!
//! # Rank root causes from an exported importance table
//! smartmach causes --importance importance.json --top 5
//!
//! # Validate a config file
//! smartmach check-config --config smartmach.toml
//! ```
//!
//! # Environment Variables
//!
//! - `SMARTMACH_CONFIG`: Path to the TOML config file
//! - `RUST_LOG`: Logging level (default: info)
//!
//! Logs go to stderr; reports go to stdout.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use smartmach::causal::{rank_factors, StaticAttribution};
use smartmach::config::{defaults, SmartMachConfig, CONFIG_ENV_VAR, LOCAL_CONFIG_FILE};
use smartmach::fleet::{sensor_issue_counts, FleetSummary};
use smartmach::forecast::{LinearTrendForecaster, TrendAnalyzer};
use smartmach::optimization::{LinearCostModel, MaintenanceOptimizer};
use smartmach::predictor::{EngineAssessor, GroundTruthPredictor};
use smartmach::processing::HealthScoreCalculator;
use smartmach::report::{maintenance_recommendations, write_fleet_csv};
use smartmach::sensors::EngineDataset;
use smartmach::types::{EngineHealthRecord, HealthStatus};

#[derive(Parser, Debug)]
#[command(name = "smartmach")]
#[command(about = "Predictive maintenance health scoring for engine fleets")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides SMARTMACH_CONFIG and ./smartmach.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Assess every engine in a dataset and summarize the fleet
    Fleet {
        /// Normalized engine CSV
        #[arg(long)]
        data: PathBuf,
        /// Also write the fleet report CSV here
        #[arg(long, value_name = "OUT")]
        csv: Option<PathBuf>,
        /// Print the full assessment as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detailed health report for one engine
    Engine {
        #[arg(long)]
        data: PathBuf,
        /// Engine (unit) number
        #[arg(long)]
        id: u32,
        #[arg(long)]
        json: bool,
    },
    /// Maintenance cost scenarios and recommendation for one engine
    Cost {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        id: u32,
        #[arg(long)]
        json: bool,
    },
    /// Short-term forecast, trend and band alerts for one sensor of one engine
    Trend {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        id: u32,
        /// Sensor id (column name)
        #[arg(long, default_value = "sensor_21")]
        sensor: String,
        /// Cycles to forecast
        #[arg(long, default_value_t = defaults::FORECAST_HORIZON)]
        horizon: usize,
        #[arg(long)]
        json: bool,
    },
    /// Rank root-cause factors from a feature importance table (JSON object)
    Causes {
        #[arg(long)]
        importance: PathBuf,
        #[arg(long, default_value_t = defaults::ROOT_CAUSE_TOP_N)]
        top: usize,
    },
    /// Validate configuration and print the effective settings
    CheckConfig,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.json_logs);

    match args.command {
        SubCommand::CheckConfig => check_config(args.config.as_deref()),
        SubCommand::Causes { importance, top } => {
            let config = load_config(args.config.as_deref())?;
            run_causes(&config, &importance, top)
        }
        SubCommand::Fleet { data, csv, json } => {
            let config = load_config(args.config.as_deref())?;
            run_fleet(&config, &data, csv.as_deref(), json)
        }
        SubCommand::Engine { data, id, json } => {
            let config = load_config(args.config.as_deref())?;
            run_engine(&config, &data, id, json)
        }
        SubCommand::Cost { data, id, json } => {
            let config = load_config(args.config.as_deref())?;
            run_cost(&config, &data, id, json)
        }
        SubCommand::Trend {
            data,
            id,
            sensor,
            horizon,
            json,
        } => {
            let config = load_config(args.config.as_deref())?;
            run_trend(&config, &data, id, &sensor, horizon, json)
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// An explicit `--config` must load; otherwise the standard search order applies.
fn load_config(path: Option<&Path>) -> Result<Arc<SmartMachConfig>> {
    let config = match path {
        Some(p) => SmartMachConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => SmartMachConfig::load(),
    };
    Ok(Arc::new(config))
}

fn assessor(config: &SmartMachConfig) -> Result<EngineAssessor> {
    let registry = config.registry().context("Invalid sensor table")?;
    let calculator = HealthScoreCalculator::new(registry);
    Ok(EngineAssessor::new(
        calculator,
        Arc::new(GroundTruthPredictor),
        config.data.sequence_length,
    ))
}

fn load_dataset(path: &Path) -> Result<EngineDataset> {
    EngineDataset::load(path).with_context(|| format!("Failed to load dataset {}", path.display()))
}

fn assess_one(config: &SmartMachConfig, data: &Path, id: u32) -> Result<EngineHealthRecord> {
    let dataset = load_dataset(data)?;
    let assessor = assessor(config)?;
    assessor
        .assess(&dataset, id)
        .with_context(|| format!("Engine {id} could not be assessed"))
}

// ============================================================================
// Subcommands
// ============================================================================

fn run_fleet(config: &SmartMachConfig, data: &Path, csv: Option<&Path>, json: bool) -> Result<()> {
    let dataset = load_dataset(data)?;
    let assessor = assessor(config)?;
    let assessment = assessor.assess_fleet(&dataset);

    if let Some(out) = csv {
        let file = std::fs::File::create(out)
            .with_context(|| format!("Failed to create {}", out.display()))?;
        write_fleet_csv(&assessment, std::io::BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", out.display()))?;
        info!(path = %out.display(), engines = assessment.records.len(), "Fleet report written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
        return Ok(());
    }

    let summary = FleetSummary::from_assessment(&assessment);
    let cohort = assessment.cohort();
    let issues = sensor_issue_counts(assessment.records.values(), assessor.calculator().registry());

    println!("Fleet overview ({} engines evaluated, {} skipped)", summary.evaluated, summary.skipped);
    for (label, stats, status) in [
        ("Good", summary.good, HealthStatus::Good),
        ("Warning", summary.warning, HealthStatus::Warning),
        ("Critical", summary.critical, HealthStatus::Critical),
    ] {
        let members: Vec<String> = cohort.members(status).iter().map(u32::to_string).collect();
        println!(
            "  {:<9} {:>4} ({:>5.1}%)  [{}]",
            label,
            stats.count,
            stats.percent,
            members.join(", ")
        );
    }
    if summary.without_sensor_data > 0 {
        println!(
            "  {} engine(s) scored without sensor data (sensor health is the 100.0 fallback)",
            summary.without_sensor_data
        );
    }
    for (id, reason) in &assessment.skipped {
        println!("  Engine {id} skipped: {reason}");
    }

    if !issues.critical.is_empty() {
        println!("\nMost frequent critical sensors:");
        for issue in &issues.critical {
            println!("  {:<18} {} engine(s)", issue.display_name, issue.engines);
        }
    }
    if !issues.warning.is_empty() {
        println!("\nMost frequent warning sensors:");
        for issue in &issues.warning {
            println!("  {:<18} {} engine(s)", issue.display_name, issue.engines);
        }
    }
    Ok(())
}

fn run_engine(config: &SmartMachConfig, data: &Path, id: u32, json: bool) -> Result<()> {
    let record = assess_one(config, data, id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("Engine {id}: {} ({:.2}%)", record.health_status, record.overall_health);
    match record.actual_rul {
        Some(actual) => println!("  Predicted RUL: {} cycles (actual {actual})", record.predicted_rul),
        None => println!("  Predicted RUL: {} cycles", record.predicted_rul),
    }
    println!("  RUL health:    {:.2}", record.rul_health);
    if record.sensor_data_available {
        println!("  Sensor health: {:.2}", record.sensor_health);
    } else {
        println!("  Sensor health: {:.2} (no sensor data, fallback value)", record.sensor_health);
    }

    println!("\n  {:<18} {:>10} {:<6} {:<5} {:>8} {:>7}", "Sensor", "Value", "Unit", "State", "Anomaly", "Score");
    for a in record.assessments.values() {
        println!(
            "  {:<18} {:>10.2} {:<6} {:<5} {:>8.2} {:>7.2}",
            a.display_name,
            a.current_value,
            a.unit,
            a.current_status.to_string(),
            a.anomaly_level,
            a.score
        );
    }
    if !record.skipped_sensors.is_empty() {
        let skipped: Vec<&str> = record.skipped_sensors.iter().map(|s| s.as_str()).collect();
        println!("  Not evaluated: {}", skipped.join(", "));
    }

    println!("\n  Recommendations:");
    for rec in maintenance_recommendations(&record) {
        println!("  - {rec}");
    }
    Ok(())
}

fn run_cost(config: &SmartMachConfig, data: &Path, id: u32, json: bool) -> Result<()> {
    let record = assess_one(config, data, id)?;
    let optimizer = MaintenanceOptimizer::new(LinearCostModel::default(), config.cost.clone());
    let rec = optimizer.optimize_record(&record)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rec)?);
        return Ok(());
    }

    let i = &rec.inputs;
    println!("Engine {id} maintenance cost scenarios");
    println!(
        "  Predicted RUL {} | sensor score {:.2} | anomaly {:.2} | good/warning/critical {}/{}/{}",
        i.predicted_rul, i.sensor_health, i.anomaly_level, i.good_sensors, i.warning_sensors, i.critical_sensors
    );
    println!("\n  {:<12} {:>10} {:>14} {:>14} {:>14}", "Scenario", "Repair day", "Base", "Downtime", "Total");
    for s in &rec.scenarios {
        println!(
            "  {:<12} {:>10} {:>14.0} {:>14.0} {:>14.0}",
            s.scenario.to_string(),
            s.repair_day,
            s.base_cost,
            s.downtime_penalty,
            s.final_cost
        );
    }
    println!(
        "\n  Recommended: {} at {:.0} (saves up to {:.0})",
        rec.recommended, rec.recommended_cost, rec.savings
    );
    Ok(())
}

fn run_trend(
    config: &SmartMachConfig,
    data: &Path,
    id: u32,
    sensor: &str,
    horizon: usize,
    json: bool,
) -> Result<()> {
    if horizon == 0 {
        bail!("--horizon must be at least 1");
    }
    let dataset = load_dataset(data)?;
    let cycles = dataset
        .cycles(id)
        .with_context(|| format!("Engine {id} not found in dataset"))?;
    let analyzer = TrendAnalyzer::new(config.registry()?, Arc::new(LinearTrendForecaster))
        .with_horizon(horizon);
    let forecast = analyzer
        .forecast_sensor(sensor, cycles)
        .with_context(|| format!("Engine {id} sensor {sensor} could not be forecast"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    println!(
        "Engine {id}: {} ({}) over {} readings",
        forecast.display_name,
        forecast.sensor.as_str(),
        forecast.history_used
    );
    println!(
        "  Band: {:.2} to {:.2} {}",
        forecast.low_threshold, forecast.high_threshold, forecast.unit
    );
    println!("  Trend: {}", forecast.trend.direction);
    if forecast.trend.will_cross_high {
        println!("  Alert: above high threshold");
    } else if forecast.trend.will_cross_low {
        println!("  Alert: below low threshold");
    } else {
        println!("  Within normal range");
    }

    println!("\n  {:>4} {:>10} {:<6} {:<5}", "Step", "Value", "Unit", "State");
    for p in &forecast.points {
        println!(
            "  {:>4} {:>10.2} {:<6} {:<5}",
            p.step,
            p.value,
            forecast.unit,
            p.status.to_string()
        );
    }
    if let Some((mean, min, max)) = forecast.value_stats() {
        println!("\n  Forecast mean {mean:.2}, min {min:.2}, max {max:.2} {}", forecast.unit);
    }
    Ok(())
}

fn run_causes(config: &SmartMachConfig, importance: &Path, top: usize) -> Result<()> {
    let model = StaticAttribution::load(importance)?;
    let registry = config.registry()?;
    let ranked = rank_factors(&model, &registry, top);
    if ranked.is_empty() {
        bail!("No rankable features in {}", importance.display());
    }

    println!("Top {} factors influencing remaining useful life", ranked.len());
    for (rank, f) in ranked.iter().enumerate() {
        println!("  {:>2}. {:<18} {:.4}", rank + 1, f.display_name, f.importance);
    }
    Ok(())
}

fn check_config(path: Option<&Path>) -> Result<()> {
    let source = match path {
        Some(p) => Some(p.to_path_buf()),
        None => std::env::var(CONFIG_ENV_VAR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(LOCAL_CONFIG_FILE)).filter(|p| p.exists())),
    };

    let config = match &source {
        Some(p) => SmartMachConfig::load_from_file(p)
            .with_context(|| format!("Config {} is invalid", p.display()))?,
        None => SmartMachConfig::default(),
    };

    match &source {
        Some(p) => println!("Config {} is valid", p.display()),
        None => println!("No config file found; built-in defaults are valid"),
    }
    println!("  sequence_length:      {}", config.data.sequence_length);
    println!("  penalty_per_day:      {:.0}", config.cost.penalty_per_day);
    println!("  preventive_lead_days: {}", config.cost.preventive_lead_days);
    println!("  emergency_delay_days: {}", config.cost.emergency_delay_days);
    println!("  sensors:              {}", config.sensors.len());
    for s in &config.sensors {
        let unit = s.realistic_range.as_ref().map_or("", |r| r.unit.as_str());
        println!(
            "    {:<10} {:<18} [{:.2}, {:.2}] {}",
            s.id.as_str(),
            s.display_name,
            s.low_threshold,
            s.high_threshold,
            unit
        );
    }
    Ok(())
}
