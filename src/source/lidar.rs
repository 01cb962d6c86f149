//! Scan-based range source.
//!
//! A scanning range finder reports a sweep of (angle, range) points per
//! revolution. Each sweep is reduced to a single distance: the mean of the
//! nearest few points that are not too close to be trusted, converted from
//! meters to centimeters. Sweeps with too few usable points yield no reading.

use crate::source::types::{RangeSample, RangeSource, SourceError};
use serde::{Deserialize, Serialize};

/// A single point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    /// Bearing in degrees
    pub angle: f64,
    /// Range in meters (0.0 when the device saw nothing)
    pub range: f64,
}

/// One full sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub points: Vec<ScanPoint>,
}

/// Lifecycle and reads of a scanning device.
///
/// Device-specific protocol handling lives behind this trait.
pub trait ScanDevice {
    fn initialize(&mut self) -> Result<(), SourceError>;

    /// Start the motor / laser.
    fn turn_on(&mut self) -> Result<(), SourceError>;

    /// Wait for and return the next sweep.
    fn read_scan(&mut self) -> Result<Scan, SourceError>;

    /// Whether the device is still usable.
    fn is_ok(&self) -> bool;

    fn turn_off(&mut self);

    fn disconnect(&mut self);
}

/// Parameters for reducing a sweep to a distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LidarConfig {
    /// Points closer than this (meters) are ignored
    pub min_range_m: f64,
    /// Number of nearest points averaged
    pub nearest_count: usize,
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            min_range_m: 0.05,
            nearest_count: 5,
        }
    }
}

/// Reduce a sweep to the mean of its nearest usable points, in centimeters.
pub fn nearest_mean_cm(scan: &Scan, config: &LidarConfig) -> RangeSample {
    if config.nearest_count == 0 {
        return None;
    }

    let mut ranges: Vec<f64> = scan
        .points
        .iter()
        .map(|p| p.range)
        .filter(|r| r.is_finite() && *r >= config.min_range_m)
        .collect();

    if ranges.len() < config.nearest_count {
        return None;
    }

    ranges.sort_by(|a, b| a.total_cmp(b));
    let nearest = &ranges[..config.nearest_count];
    let mean_m = nearest.iter().sum::<f64>() / config.nearest_count as f64;
    Some(mean_m * 100.0)
}

/// [`RangeSource`] over any [`ScanDevice`].
pub struct LidarSource<D: ScanDevice> {
    device: D,
    config: LidarConfig,
    running: bool,
}

impl<D: ScanDevice> LidarSource<D> {
    pub fn new(device: D, config: LidarConfig) -> Self {
        Self {
            device,
            config,
            running: false,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: ScanDevice> RangeSource for LidarSource<D> {
    fn name(&self) -> &'static str {
        "lidar"
    }

    fn start(&mut self) -> Result<(), SourceError> {
        if self.running {
            return Err(SourceError::AlreadyRunning);
        }
        if let Err(e) = self.device.initialize() {
            self.device.disconnect();
            return Err(e);
        }
        if let Err(e) = self.device.turn_on() {
            self.device.disconnect();
            return Err(e);
        }
        self.running = true;
        tracing::debug!("lidar device started");
        Ok(())
    }

    fn next_sample(&mut self) -> Result<RangeSample, SourceError> {
        if !self.running || !self.device.is_ok() {
            return Err(SourceError::Offline);
        }
        let scan = self.device.read_scan()?;
        Ok(nearest_mean_cm(&scan, &self.config))
    }

    fn is_online(&self) -> bool {
        self.running && self.device.is_ok()
    }

    fn stop(&mut self) {
        if self.running {
            self.device.turn_off();
            self.device.disconnect();
            self.running = false;
            tracing::debug!("lidar device stopped");
        }
    }
}
