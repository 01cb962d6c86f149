//! Tracks how long the presence flag has held its current value.

use serde::{Deserialize, Serialize};

/// Current presence value and how long it has held, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceState {
    pub presence: bool,
    pub duration: f64,
}

/// Two-state (absent/present) duration accumulator.
///
/// Starts absent with zero duration. On a flip the duration restarts at the
/// flipping tick's `dt`, not at zero.
#[derive(Debug, Clone, Default)]
pub struct OccupancyTracker {
    state: PresenceState,
}

impl OccupancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of `dt` seconds.
    pub fn update(&mut self, presence: bool, dt: f64) -> PresenceState {
        if presence == self.state.presence {
            self.state.duration += dt;
        } else {
            self.state.presence = presence;
            self.state.duration = dt;
        }
        self.state
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_resets_to_dt_on_flip() {
        let mut tracker = OccupancyTracker::new();
        let durations: Vec<f64> = [true, true, false, false, false]
            .into_iter()
            .map(|p| tracker.update(p, 1.0).duration)
            .collect();
        assert_eq!(durations, vec![1.0, 2.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_initial_absent_accumulates() {
        let mut tracker = OccupancyTracker::new();
        tracker.update(false, 0.5);
        let state = tracker.update(false, 0.5);
        assert!(!state.presence);
        assert_eq!(state.duration, 1.0);
    }

    #[test]
    fn test_state_reflects_last_update() {
        let mut tracker = OccupancyTracker::new();
        tracker.update(true, 0.05);
        assert_eq!(
            tracker.state(),
            PresenceState {
                presence: true,
                duration: 0.05
            }
        );
    }
}
