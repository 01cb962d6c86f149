//! Moving-average smoothing of range readings.
//!
//! The filter keeps the most recent valid readings in a bounded history and
//! reports their arithmetic mean. Ticks without a reading leave the history
//! untouched, so the last known distance keeps being reported until newer
//! readings push it out.

use std::collections::VecDeque;

/// Default number of readings averaged by the filter.
pub const DEFAULT_WINDOW: usize = 5;

/// Bounded moving-average filter over distance readings (cm).
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    /// Most recent valid readings, oldest first
    history: VecDeque<f64>,
    /// Maximum number of readings retained
    capacity: usize,
}

impl SmoothingFilter {
    /// Create a filter averaging at most `window` readings.
    ///
    /// A window of zero is treated as one so the filter always has room for
    /// the newest reading.
    pub fn new(window: usize) -> Self {
        let capacity = window.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Feed one tick's reading and return the smoothed value.
    ///
    /// Returns `None` only while no valid reading has ever been seen.
    pub fn ingest(&mut self, sample: Option<f64>) -> Option<f64> {
        if let Some(value) = sample {
            if self.history.len() == self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(value);
        }
        self.current()
    }

    /// Mean of the retained readings without ingesting anything.
    pub fn current(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        Some(self.history.iter().sum::<f64>() / self.history.len() as f64)
    }

    /// Number of readings currently retained.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_has_no_value() {
        let mut filter = SmoothingFilter::default();
        assert_eq!(filter.ingest(None), None);
        assert_eq!(filter.ingest(None), None);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_mean_over_partial_window() {
        let mut filter = SmoothingFilter::new(5);
        assert_eq!(filter.ingest(Some(10.0)), Some(10.0));
        assert_eq!(filter.ingest(Some(20.0)), Some(15.0));
        // A single outlier is averaged over what is available
        assert_eq!(filter.ingest(Some(90.0)), Some(40.0));
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_oldest_reading_is_evicted() {
        let mut filter = SmoothingFilter::new(3);
        for value in [1.0, 2.0, 3.0, 4.0] {
            filter.ingest(Some(value));
        }
        assert_eq!(filter.len(), 3);
        assert_eq!(filter.current(), Some(3.0));
    }

    #[test]
    fn test_missing_reading_keeps_history() {
        let mut filter = SmoothingFilter::new(5);
        filter.ingest(Some(42.0));
        assert_eq!(filter.ingest(None), Some(42.0));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_zero_window_keeps_latest() {
        let mut filter = SmoothingFilter::new(0);
        assert_eq!(filter.capacity(), 1);
        filter.ingest(Some(5.0));
        assert_eq!(filter.ingest(Some(7.0)), Some(7.0));
    }

    #[test]
    fn test_matches_mean_for_every_prefix() {
        let readings = [12.0, 55.5, 31.25, 47.0, 18.0];
        let mut filter = SmoothingFilter::new(readings.len());
        for n in 1..=readings.len() {
            let smoothed = filter.ingest(Some(readings[n - 1])).unwrap();
            let mean = readings[..n].iter().sum::<f64>() / n as f64;
            assert!((smoothed - mean).abs() < 1e-9);
        }
    }
}
