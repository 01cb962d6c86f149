//! Per-session recording of presence over time.
//!
//! One row per tick is kept so the session can be exported as a two-column
//! time series, alongside running statistics for the end-of-run summary.

use crate::core::TickReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Header of the exported presence time series.
pub const CSV_HEADER: [&str; 2] = ["time(sec)", "presence(1=True)"];

/// One recorded tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionRow {
    pub elapsed_secs: f64,
    pub presence: bool,
}

/// Accumulates rows and statistics for the current run.
#[derive(Debug)]
pub struct SessionLog {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    source: String,
    rows: Vec<SessionRow>,
    /// Smoothed distances seen (cm), for summary statistics
    distances: Vec<f64>,
    present_ticks: u64,
    hunched_ticks: u64,
    no_data_ticks: u64,
    read_failures: u64,
    min_vitality: Option<f64>,
    final_vitality: Option<f64>,
    asset_switches: u64,
    last_asset: Option<usize>,
}

impl SessionLog {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            source: source.into(),
            rows: Vec::new(),
            distances: Vec::new(),
            present_ticks: 0,
            hunched_ticks: 0,
            no_data_ticks: 0,
            read_failures: 0,
            min_vitality: None,
            final_vitality: None,
            asset_switches: 0,
            last_asset: None,
        }
    }

    /// Record one tick.
    pub fn record(&mut self, report: &TickReport) {
        self.rows.push(SessionRow {
            elapsed_secs: report.elapsed_secs,
            presence: report.presence(),
        });

        match report.smoothed_cm {
            Some(d) => self.distances.push(d),
            None => self.no_data_ticks += 1,
        }
        if report.classification.presence {
            self.present_ticks += 1;
        }
        if report.classification.hunched {
            self.hunched_ticks += 1;
        }

        self.min_vitality = Some(match self.min_vitality {
            Some(v) => v.min(report.vitality),
            None => report.vitality,
        });
        self.final_vitality = Some(report.vitality);

        if self.last_asset != Some(report.asset_index) {
            self.asset_switches += 1;
            self.last_asset = Some(report.asset_index);
        }
    }

    /// Record a failed source read.
    pub fn record_read_failure(&mut self) {
        self.read_failures += 1;
    }

    pub fn rows(&self) -> &[SessionRow] {
        &self.rows
    }

    /// Statistics for the session so far.
    pub fn summary(&self) -> SessionSummary {
        let ticks = self.rows.len() as u64;
        let (mean_distance_cm, distance_std_dev_cm) = if self.distances.is_empty() {
            (None, None)
        } else {
            let mean = self.distances.iter().mean();
            let std_dev = if self.distances.len() > 1 {
                Some(self.distances.iter().std_dev())
            } else {
                None
            };
            (Some(mean), std_dev)
        };

        SessionSummary {
            session_id: self.session_id,
            source: self.source.clone(),
            started_at: self.started_at,
            ended_at: Utc::now(),
            ticks,
            elapsed_secs: self.rows.last().map(|r| r.elapsed_secs).unwrap_or(0.0),
            present_ticks: self.present_ticks,
            hunched_ticks: self.hunched_ticks,
            no_data_ticks: self.no_data_ticks,
            read_failures: self.read_failures,
            presence_ratio: if ticks == 0 {
                0.0
            } else {
                self.present_ticks as f64 / ticks as f64
            },
            mean_distance_cm,
            distance_std_dev_cm,
            min_vitality: self.min_vitality,
            final_vitality: self.final_vitality,
            asset_switches: self.asset_switches,
        }
    }

    /// Write the presence time series as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::IoError(e.to_string()))?;
        }
        let mut writer =
            csv::Writer::from_path(path).map_err(|e| SessionError::CsvError(e.to_string()))?;
        writer
            .write_record(CSV_HEADER)
            .map_err(|e| SessionError::CsvError(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record([
                    format!("{:.3}", row.elapsed_secs),
                    u8::from(row.presence).to_string(),
                ])
                .map_err(|e| SessionError::CsvError(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| SessionError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// End-of-session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub present_ticks: u64,
    pub hunched_ticks: u64,
    pub no_data_ticks: u64,
    pub read_failures: u64,
    pub presence_ratio: f64,
    pub mean_distance_cm: Option<f64>,
    pub distance_std_dev_cm: Option<f64>,
    pub min_vitality: Option<f64>,
    pub final_vitality: Option<f64>,
    pub asset_switches: u64,
}

impl SessionSummary {
    /// Human-readable summary for the console.
    pub fn display(&self) -> String {
        let fmt_opt = |v: Option<f64>, unit: &str| match v {
            Some(v) => format!("{v:.1}{unit}"),
            None => "n/a".to_string(),
        };
        format!(
            "Session Statistics:\n\
             - Source: {}\n\
             - Ticks: {} ({:.1} seconds)\n\
             - Present: {} ticks ({:.0}%)\n\
             - Hunched: {} ticks\n\
             - No data: {} ticks\n\
             - Read failures: {}\n\
             - Mean distance: {}\n\
             - Distance std dev: {}\n\
             - Lowest vitality: {}\n\
             - Final vitality: {}\n\
             - Asset switches: {}",
            self.source,
            self.ticks,
            self.elapsed_secs,
            self.present_ticks,
            self.presence_ratio * 100.0,
            self.hunched_ticks,
            self.no_data_ticks,
            self.read_failures,
            fmt_opt(self.mean_distance_cm, "cm"),
            fmt_opt(self.distance_std_dev_cm, "cm"),
            fmt_opt(self.min_vitality, ""),
            fmt_opt(self.final_vitality, ""),
            self.asset_switches
        )
    }

    /// Save as pretty JSON into `dir`, returning the file written.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        std::fs::create_dir_all(dir).map_err(|e| SessionError::IoError(e.to_string()))?;
        let path = dir.join(format!(
            "session_{}.json",
            self.started_at.format("%Y%m%d_%H%M%S")
        ));
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SessionError::SerializeError(e.to_string()))?;
        std::fs::write(&path, json).map_err(|e| SessionError::IoError(e.to_string()))?;
        Ok(path)
    }

    /// Load the most recent summary saved in `dir`, if any.
    pub fn load_latest(dir: &Path) -> Result<Option<SessionSummary>, SessionError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::IoError(e.to_string())),
        };

        let latest = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension().map(|e| e == "json").unwrap_or(false)
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.starts_with("session_"))
                        .unwrap_or(false)
            })
            .max();

        let Some(path) = latest else {
            return Ok(None);
        };
        let content =
            std::fs::read_to_string(&path).map_err(|e| SessionError::IoError(e.to_string()))?;
        let summary =
            serde_json::from_str(&content).map_err(|e| SessionError::ParseError(e.to_string()))?;
        Ok(Some(summary))
    }
}

/// Session export errors.
#[derive(Debug)]
pub enum SessionError {
    IoError(String),
    CsvError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::IoError(e) => write!(f, "IO error: {e}"),
            SessionError::CsvError(e) => write!(f, "CSV error: {e}"),
            SessionError::ParseError(e) => write!(f, "Parse error: {e}"),
            SessionError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}
