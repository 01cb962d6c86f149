//! Range source abstraction shared by every input variant.
//!
//! A source hands the pipeline one optional distance per tick, already
//! converted to centimeters. "No reading" is a normal outcome, not an error.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One tick's distance in centimeters, absent when nothing valid was seen.
pub type RangeSample = Option<f64>;

/// Errors reported by range sources.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The device or generator could not be brought up
    Init(String),
    /// A single read failed; the tick proceeds without a sample
    ReadFailed(String),
    /// The source has gone away or has nothing more to give
    Offline,
    /// `start` called twice
    AlreadyRunning,
}

impl SourceError {
    /// Whether the loop may continue after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::ReadFailed(_))
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Init(e) => write!(f, "Source initialization failed: {e}"),
            SourceError::ReadFailed(e) => write!(f, "Failed to read range data: {e}"),
            SourceError::Offline => write!(f, "Source is offline"),
            SourceError::AlreadyRunning => write!(f, "Source is already running"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A supplier of per-tick range samples.
pub trait RangeSource {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Acquire the underlying device or generator.
    fn start(&mut self) -> Result<(), SourceError>;

    /// Produce the next sample. May block briefly waiting for the device.
    fn next_sample(&mut self) -> Result<RangeSample, SourceError>;

    /// Whether more samples can be expected.
    fn is_online(&self) -> bool;

    /// Release the underlying device. Must be safe to call more than once.
    fn stop(&mut self);
}

impl<S: RangeSource + ?Sized> RangeSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn start(&mut self) -> Result<(), SourceError> {
        (**self).start()
    }

    fn next_sample(&mut self) -> Result<RangeSample, SourceError> {
        (**self).next_sample()
    }

    fn is_online(&self) -> bool {
        (**self).is_online()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Input variants selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Scan-based range finder (replayed from a recording)
    Lidar,
    /// Waveform-driven presence generator
    Synthetic,
    /// Fixed on/off presence script
    Pattern,
    /// Keyboard-steered point in a 2-D arena
    Interactive,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Lidar => "lidar",
            SourceKind::Synthetic => "synthetic",
            SourceKind::Pattern => "pattern",
            SourceKind::Interactive => "interactive",
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lidar" | "replay" => Ok(SourceKind::Lidar),
            "synthetic" | "sim" | "waveform" => Ok(SourceKind::Synthetic),
            "pattern" | "scripted" => Ok(SourceKind::Pattern),
            "interactive" | "keyboard" => Ok(SourceKind::Interactive),
            other => Err(format!("unknown source '{other}'")),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
