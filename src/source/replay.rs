//! Replay of recorded sweeps as a [`ScanDevice`].
//!
//! Recordings are JSON Lines, one sweep per line:
//!
//! ```text
//! {"points":[{"angle":0.0,"range":0.42},{"angle":0.5,"range":0.43}]}
//! {"error":"checksum mismatch"}
//! ```
//!
//! An `error` line replays as a failed read. Blank lines are skipped. The
//! device goes offline after the last line.

use crate::source::lidar::{Scan, ScanDevice, ScanPoint};
use crate::source::types::SourceError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;

/// One line of a recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayRecord {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<ScanPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplayRecord {
    pub fn scan(points: Vec<ScanPoint>) -> Self {
        Self {
            points,
            error: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            points: Vec::new(),
            error: Some(reason.into()),
        }
    }

    fn into_result(self) -> Result<Scan, SourceError> {
        match self.error {
            Some(reason) => Err(SourceError::ReadFailed(reason)),
            None => Ok(Scan {
                points: self.points,
            }),
        }
    }
}

enum Feed {
    File {
        path: PathBuf,
        lines: Option<Lines<BufReader<File>>>,
    },
    Memory(VecDeque<ReplayRecord>),
}

/// Plays back a recording one sweep per read.
pub struct ReplayDevice {
    feed: Feed,
    /// Next record, read ahead so `is_ok` can report exhaustion
    pending: Option<ReplayRecord>,
    exhausted: bool,
    powered: bool,
}

impl ReplayDevice {
    /// Replay a JSON Lines recording from disk.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            feed: Feed::File {
                path: path.into(),
                lines: None,
            },
            pending: None,
            exhausted: false,
            powered: false,
        }
    }

    /// Replay records held in memory.
    pub fn from_records(records: Vec<ReplayRecord>) -> Self {
        Self {
            feed: Feed::Memory(records.into()),
            pending: None,
            exhausted: false,
            powered: false,
        }
    }

    /// Parse a recording line. Blank lines yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<ReplayRecord>, SourceError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(line)
            .map(Some)
            .map_err(|e| SourceError::ReadFailed(format!("bad recording line: {e}")))
    }

    /// Pull the next record from the feed.
    fn advance(&mut self) -> Option<Result<ReplayRecord, SourceError>> {
        match &mut self.feed {
            Feed::Memory(records) => records.pop_front().map(Ok),
            Feed::File { lines, .. } => {
                let lines = lines.as_mut()?;
                for line in lines.by_ref() {
                    let parsed = line
                        .map_err(|e| SourceError::ReadFailed(e.to_string()))
                        .and_then(|l| Self::parse_line(&l));
                    match parsed {
                        Ok(Some(record)) => return Some(Ok(record)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(e)),
                    }
                }
                None
            }
        }
    }

    fn fill_pending(&mut self) {
        if self.pending.is_some() || self.exhausted {
            return;
        }
        match self.advance() {
            Some(Ok(record)) => self.pending = Some(record),
            Some(Err(SourceError::ReadFailed(reason))) => {
                self.pending = Some(ReplayRecord::failure(reason));
            }
            Some(Err(_)) | None => self.exhausted = true,
        }
    }
}

impl ScanDevice for ReplayDevice {
    fn initialize(&mut self) -> Result<(), SourceError> {
        if let Feed::File { path, lines } = &mut self.feed {
            let file = File::open(&*path)
                .map_err(|e| SourceError::Init(format!("{}: {e}", path.display())))?;
            *lines = Some(BufReader::new(file).lines());
        }
        self.fill_pending();
        Ok(())
    }

    fn turn_on(&mut self) -> Result<(), SourceError> {
        self.powered = true;
        Ok(())
    }

    fn read_scan(&mut self) -> Result<Scan, SourceError> {
        if !self.powered {
            return Err(SourceError::Offline);
        }
        self.fill_pending();
        let record = self.pending.take().ok_or(SourceError::Offline)?;
        self.fill_pending();
        record.into_result()
    }

    fn is_ok(&self) -> bool {
        self.powered && self.pending.is_some()
    }

    fn turn_off(&mut self) {
        self.powered = false;
    }

    fn disconnect(&mut self) {
        if let Feed::File { lines, .. } = &mut self.feed {
            *lines = None;
        }
        self.pending = None;
        self.exhausted = true;
    }
}
