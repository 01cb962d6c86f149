//! Presence and posture classification from a smoothed distance.
//!
//! The detection band is `[near_cm, far_cm)`. Inside it an occupant is
//! present, and a reading at or below `hunched_cm` also raises the posture
//! flag. Readings closer than `near_cm` are treated as spurious (the sensor
//! is blocked or reflecting off something on the desk), not as an occupant.

use serde::{Deserialize, Serialize};

/// Distance thresholds in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Readings below this are discarded as too close
    pub near_cm: f64,
    /// Readings at or beyond this mean nobody is there
    pub far_cm: f64,
    /// Readings at or below this flag a hunched posture
    pub hunched_cm: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            near_cm: 10.0,
            far_cm: 60.0,
            hunched_cm: 30.0,
        }
    }
}

/// Result of classifying one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub presence: bool,
    pub hunched: bool,
}

impl Classification {
    /// Nobody in the detection band.
    pub const ABSENT: Classification = Classification {
        presence: false,
        hunched: false,
    };

    /// Whether anything was detected this tick (presence or posture).
    pub fn detected(&self) -> bool {
        self.presence || self.hunched
    }
}

/// Maps smoothed distances onto [`Classification`]s.
#[derive(Debug, Clone, Default)]
pub struct PresenceClassifier {
    config: ClassifierConfig,
}

impl PresenceClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a smoothed distance.
    ///
    /// The comparisons are evaluated in a fixed order and their
    /// inclusive/exclusive bounds are significant at the thresholds.
    pub fn classify(&self, smoothed: Option<f64>) -> Classification {
        let distance = match smoothed {
            Some(d) if d < self.config.far_cm => d,
            _ => return Classification::ABSENT,
        };

        if distance >= self.config.near_cm {
            Classification {
                presence: true,
                hunched: distance <= self.config.hunched_cm,
            }
        } else {
            Classification::ABSENT
        }
    }
}
