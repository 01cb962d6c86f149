//! Generated presence signals for demos and bench runs without hardware.
//!
//! A presence script is a sequence of on/off ticks. Present ticks emit a
//! distance inside the detection band and absent ticks one beyond it, so the
//! generated signal travels the same smoothing and classification path as a
//! real sensor's.

use crate::source::types::{RangeSample, RangeSource, SourceError};
use serde::{Deserialize, Serialize};

/// Distances emitted for the two script states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Reading while someone is "there" (cm)
    pub present_cm: f64,
    /// Reading while nobody is (cm)
    pub absent_cm: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            present_cm: 40.0,
            absent_cm: 150.0,
        }
    }
}

/// Ticks in the default waveform script.
pub const WAVEFORM_LENGTH: usize = 200;

/// Angular frequency of the default waveform (rad per tick).
pub const WAVEFORM_FREQUENCY: f64 = 0.1;

/// Presence from the sign of `sin(f t) * cos(2 f t) * sin(2 f t)`.
pub fn waveform_presence(length: usize, frequency: f64) -> Vec<bool> {
    (0..length)
        .map(|t| {
            let t = t as f64;
            let w = frequency * t;
            let value = w.sin() * (2.0 * w).cos() * (2.0 * w).sin();
            value > 0.0
        })
        .collect()
}

/// Concatenate runs of `(present, ticks)`.
pub fn pattern_presence(runs: &[(bool, usize)]) -> Vec<bool> {
    runs.iter()
        .flat_map(|&(present, ticks)| std::iter::repeat(present).take(ticks))
        .collect()
}

/// The default bench script: a long sit, a short break, a short sit, a rest.
pub fn default_pattern() -> Vec<bool> {
    pattern_presence(&[(true, 150), (false, 30), (true, 40), (false, 60)])
}

/// Plays a fixed presence script as range readings.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    name: &'static str,
    script: Vec<RangeSample>,
    cursor: usize,
    running: bool,
}

impl SyntheticSource {
    /// Source driven by [`waveform_presence`].
    pub fn waveform(length: usize, frequency: f64, config: SyntheticConfig) -> Self {
        Self::from_presence("synthetic", &waveform_presence(length, frequency), config)
    }

    /// Source driven by a presence script.
    pub fn from_presence(name: &'static str, presence: &[bool], config: SyntheticConfig) -> Self {
        let script = presence
            .iter()
            .map(|&p| Some(if p { config.present_cm } else { config.absent_cm }))
            .collect();
        Self::from_samples(name, script)
    }

    /// Source replaying raw samples verbatim.
    pub fn from_samples(name: &'static str, script: Vec<RangeSample>) -> Self {
        Self {
            name,
            script,
            cursor: 0,
            running: false,
        }
    }

    /// Ticks left before the source goes offline.
    pub fn remaining(&self) -> usize {
        self.script.len().saturating_sub(self.cursor)
    }
}

impl RangeSource for SyntheticSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn start(&mut self) -> Result<(), SourceError> {
        if self.running {
            return Err(SourceError::AlreadyRunning);
        }
        self.running = true;
        Ok(())
    }

    fn next_sample(&mut self) -> Result<RangeSample, SourceError> {
        if !self.running {
            return Err(SourceError::Offline);
        }
        let sample = *self.script.get(self.cursor).ok_or(SourceError::Offline)?;
        self.cursor += 1;
        Ok(sample)
    }

    fn is_online(&self) -> bool {
        self.running && self.remaining() > 0
    }

    fn stop(&mut self) {
        self.running = false;
    }
}
