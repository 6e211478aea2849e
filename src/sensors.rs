//! Engine run data ingestion from CSV files
//!
//! Expected CSV format (normalized readings, one row per engine per cycle):
//! `unit_number,time_in_cycles,<feature columns...>[,RUL]`
//!
//! Every column other than `unit_number`, `time_in_cycles` and `RUL` is a
//! model feature. Registered sensors are looked up among the features by id.

use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

use crate::registry::SensorRegistry;
use crate::types::SensorId;

const UNIT_COLUMN: &str = "unit_number";
const CYCLE_COLUMN: &str = "time_in_cycles";
const RUL_COLUMN: &str = "RUL";

/// Errors raised while loading a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset {0} is empty")]
    Empty(String),

    #[error("Header is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// One cycle of one engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCycle {
    pub unit_number: u32,
    pub time_in_cycles: u32,
    /// Feature values keyed by column name
    pub readings: BTreeMap<SensorId, f64>,
    /// Ground-truth remaining cycles, when the file carries it
    pub rul: Option<i64>,
}

impl EngineCycle {
    pub fn reading(&self, id: &str) -> Option<f64> {
        self.readings.get(id).copied()
    }
}

/// All engines of a dataset, each with its cycles in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineDataset {
    engines: BTreeMap<u32, Vec<EngineCycle>>,
    feature_columns: Vec<SensorId>,
    skipped_lines: usize,
}

impl EngineDataset {
    /// Load a dataset from a CSV file.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|e| DatasetError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let dataset = Self::from_reader(BufReader::new(file), &path.display().to_string())?;
        tracing::info!(
            path = %path.display(),
            engines = dataset.engines.len(),
            features = dataset.feature_columns.len(),
            skipped_lines = dataset.skipped_lines,
            "Loaded engine dataset"
        );
        Ok(dataset)
    }

    /// Parse a dataset from any buffered reader.
    ///
    /// Malformed rows are logged and skipped; a missing header or a missing
    /// required column fails the whole load.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> Result<Self, DatasetError> {
        let mut lines = reader.lines();

        let header = loop {
            match lines.next() {
                Some(Ok(l)) if l.trim().is_empty() => continue,
                Some(Ok(l)) => break l,
                Some(Err(e)) => {
                    return Err(DatasetError::Io {
                        path: source.to_string(),
                        source: e,
                    })
                }
                None => return Err(DatasetError::Empty(source.to_string())),
            }
        };
        let layout = ColumnLayout::from_header(&header)?;

        let mut engines: BTreeMap<u32, Vec<EngineCycle>> = BTreeMap::new();
        let mut skipped_lines = 0;

        // Header is line 1
        for (line_num, line_result) in (2..).zip(lines) {
            let line = match line_result {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!(line = line_num, error = %e, "Error reading CSV line");
                    skipped_lines += 1;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match layout.parse_line(&line, line_num) {
                Ok(cycle) => engines.entry(cycle.unit_number).or_default().push(cycle),
                Err(e) => {
                    tracing::warn!(line = line_num, error = %e, "Error parsing CSV line");
                    skipped_lines += 1;
                }
            }
        }

        for cycles in engines.values_mut() {
            cycles.sort_by_key(|c| c.time_in_cycles);
        }

        Ok(Self {
            engines,
            feature_columns: layout.features.into_iter().map(|(_, id)| id).collect(),
            skipped_lines,
        })
    }

    /// Build a dataset directly from cycles (used by tests and the simulator).
    pub fn from_cycles(cycles: Vec<EngineCycle>) -> Self {
        let mut engines: BTreeMap<u32, Vec<EngineCycle>> = BTreeMap::new();
        let mut feature_columns: Vec<SensorId> = Vec::new();
        for cycle in cycles {
            for id in cycle.readings.keys() {
                if !feature_columns.contains(id) {
                    feature_columns.push(id.clone());
                }
            }
            engines.entry(cycle.unit_number).or_default().push(cycle);
        }
        for cycles in engines.values_mut() {
            cycles.sort_by_key(|c| c.time_in_cycles);
        }
        Self {
            engines,
            feature_columns,
            skipped_lines: 0,
        }
    }

    pub fn engine_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.engines.keys().copied()
    }

    /// Cycles of one engine in time order.
    pub fn cycles(&self, unit_number: u32) -> Option<&[EngineCycle]> {
        self.engines.get(&unit_number).map(Vec::as_slice)
    }

    pub fn feature_columns(&self) -> &[SensorId] {
        &self.feature_columns
    }

    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Write the dataset back out in the CSV format it is read from.
    pub fn write_csv<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        let mut header = vec![UNIT_COLUMN.to_string(), CYCLE_COLUMN.to_string()];
        header.extend(self.feature_columns.iter().map(ToString::to_string));
        header.push(RUL_COLUMN.to_string());
        writeln!(out, "{}", header.join(","))?;

        for cycles in self.engines.values() {
            for c in cycles {
                let mut row = vec![c.unit_number.to_string(), c.time_in_cycles.to_string()];
                row.extend(self.feature_columns.iter().map(|id| {
                    c.reading(id.as_str()).map_or_else(String::new, |v| format!("{v:.6}"))
                }));
                row.push(c.rul.map_or_else(String::new, |r| r.to_string()));
                writeln!(out, "{}", row.join(","))?;
            }
        }
        out.flush()
    }
}

/// Column positions resolved from the header line.
struct ColumnLayout {
    unit: usize,
    cycle: usize,
    rul: Option<usize>,
    features: Vec<(usize, SensorId)>,
    width: usize,
}

impl ColumnLayout {
    fn from_header(header: &str) -> Result<Self, DatasetError> {
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let find = |name: &str| names.iter().position(|n| *n == name);

        let unit = find(UNIT_COLUMN).ok_or(DatasetError::MissingColumn(UNIT_COLUMN))?;
        let cycle = find(CYCLE_COLUMN).ok_or(DatasetError::MissingColumn(CYCLE_COLUMN))?;
        let rul = find(RUL_COLUMN);

        let features = names
            .iter()
            .enumerate()
            .filter(|(i, n)| *i != unit && *i != cycle && Some(*i) != rul && !n.is_empty())
            .map(|(i, n)| (i, SensorId::new(*n)))
            .collect();

        Ok(Self {
            unit,
            cycle,
            rul,
            features,
            width: names.len(),
        })
    }

    /// Parse a single CSV line into an EngineCycle
    fn parse_line(&self, line: &str, line_num: usize) -> Result<EngineCycle, String> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < self.width {
            return Err(format!(
                "Expected {} fields, got {} on line {}",
                self.width,
                fields.len(),
                line_num
            ));
        }

        let unit_number = parse_count(fields[self.unit], UNIT_COLUMN)?;
        let time_in_cycles = parse_count(fields[self.cycle], CYCLE_COLUMN)?;

        // Blank RUL cells are allowed; garbage is not
        let rul = match self.rul.map(|i| fields[i].trim()) {
            None | Some("") => None,
            Some(s) => Some(parse_rul(s)?),
        };

        let mut readings = BTreeMap::new();
        for (i, id) in &self.features {
            let raw = fields[*i].trim();
            // Empty cells are gaps, not zeros
            if raw.is_empty() {
                continue;
            }
            readings.insert(id.clone(), parse_f64(raw, id.as_str())?);
        }

        Ok(EngineCycle {
            unit_number,
            time_in_cycles,
            readings,
            rul,
        })
    }
}

/// Parse a string to f64 with field name for error messages
fn parse_f64(s: &str, field: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| format!("Cannot parse {} as f64: '{}'", field, s))
}

/// Fractional RUL cells truncate toward zero.
fn parse_rul(s: &str) -> Result<i64, String> {
    let v = parse_f64(s, RUL_COLUMN)?;
    if !v.is_finite() {
        return Err(format!("Cannot parse {} as a cycle count: '{}'", RUL_COLUMN, s));
    }
    Ok(v.trunc() as i64)
}

/// Integer columns are sometimes exported as floats ("3.0")
fn parse_count(s: &str, field: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Ok(n);
    }
    let v = parse_f64(s, field)?;
    if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Ok(v as u32)
    } else {
        Err(format!("Cannot parse {} as a cycle count: '{}'", field, s))
    }
}

// ============================================================================
// Synthetic Data
// ============================================================================

/// Parameters for synthetic run-to-failure data.
#[derive(Debug, Clone)]
pub struct SyntheticFleet {
    pub engines: u32,
    pub min_cycles: u32,
    pub max_cycles: u32,
    /// Cycles each engine still has left at the end of the recording
    pub max_remaining: u32,
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for SyntheticFleet {
    fn default() -> Self {
        Self {
            engines: 20,
            min_cycles: 60,
            max_cycles: 250,
            max_remaining: 200,
            noise_std: 0.02,
            seed: 42,
        }
    }
}

/// Generate synthetic engine data for the registered sensors.
///
/// Each engine starts near mid-band and drifts toward its thresholds as it
/// approaches failure: odd sensors drift upward, even sensors downward.
/// Readings carry Gaussian noise. The output is deterministic for a seed.
/// Fails only for a negative or NaN `noise_std`.
pub fn generate_synthetic_fleet(
    params: &SyntheticFleet,
    registry: &SensorRegistry,
) -> Result<EngineDataset, rand_distr::NormalError> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let noise = Normal::new(0.0, params.noise_std)?;
    let (lo, hi) = if params.min_cycles <= params.max_cycles {
        (params.min_cycles, params.max_cycles)
    } else {
        (params.max_cycles, params.min_cycles)
    };

    let mut cycles = Vec::new();
    for unit in 1..=params.engines {
        let recorded = rng.gen_range(lo..=hi).max(1);
        let remaining = rng.gen_range(0..=params.max_remaining);
        let life = recorded + remaining;

        for t in 1..=recorded {
            let wear = f64::from(t) / f64::from(life);
            let rul = i64::from(life - t);
            let readings = registry
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    // Reach the band edge at 80% of life, overshoot afterwards
                    let drift = wear / 0.8 * (s.band_width() / 2.0);
                    let base = if i % 2 == 1 {
                        s.midpoint() + drift
                    } else {
                        s.midpoint() - drift
                    };
                    (s.id.clone(), base + noise.sample(&mut rng))
                })
                .collect();
            cycles.push(EngineCycle {
                unit_number: unit,
                time_in_cycles: t,
                readings,
                rul: Some(rul),
            });
        }
    }

    Ok(EngineDataset::from_cycles(cycles))
}
