//! Vitality model: a bounded "health" score for the displayed flower.
//!
//! Vitality drains while someone is present and recovers while the space is
//! empty. The clamp to `[0, 100]` after every update is the only bound; the
//! rates themselves are unconstrained so deployments can tune them freely.

use serde::{Deserialize, Serialize};

/// Lowest possible vitality.
pub const VITALITY_MIN: f64 = 0.0;

/// Highest possible vitality.
pub const VITALITY_MAX: f64 = 100.0;

/// Rates are in vitality points per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalityConfig {
    /// Starting vitality
    pub initial: f64,
    /// Loss per second while present
    pub decay_rate: f64,
    /// Gain per second while absent
    pub recover_rate: f64,
}

impl Default for VitalityConfig {
    fn default() -> Self {
        Self {
            initial: VITALITY_MAX,
            decay_rate: 5.0,
            recover_rate: 3.0,
        }
    }
}

impl VitalityConfig {
    /// Symmetric rates used by the interactive simulation.
    pub fn symmetric(rate: f64) -> Self {
        Self {
            initial: VITALITY_MAX,
            decay_rate: rate,
            recover_rate: rate,
        }
    }
}

/// Time-driven decay/recovery of vitality.
#[derive(Debug, Clone)]
pub struct VitalityModel {
    config: VitalityConfig,
    vitality: f64,
}

impl VitalityModel {
    pub fn new(config: VitalityConfig) -> Self {
        Self {
            vitality: clamp_vitality(config.initial),
            config,
        }
    }

    /// Advance by one tick of `dt` seconds and return the new vitality.
    pub fn update(&mut self, presence: bool, dt: f64) -> f64 {
        if presence {
            self.vitality -= self.config.decay_rate * dt;
        } else {
            self.vitality += self.config.recover_rate * dt;
        }
        self.vitality = clamp_vitality(self.vitality);
        self.vitality
    }

    pub fn vitality(&self) -> f64 {
        self.vitality
    }

    pub fn config(&self) -> &VitalityConfig {
        &self.config
    }
}

impl Default for VitalityModel {
    fn default() -> Self {
        Self::new(VitalityConfig::default())
    }
}

fn clamp_vitality(value: f64) -> f64 {
    // NaN would otherwise poison every later update
    if value.is_nan() {
        return VITALITY_MIN;
    }
    value.clamp(VITALITY_MIN, VITALITY_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_full_vitality() {
        let model = VitalityModel::default();
        assert_eq!(model.vitality(), 100.0);
    }

    #[test]
    fn test_decay_and_recovery() {
        let mut model = VitalityModel::default();
        assert_eq!(model.update(true, 1.0), 95.0);
        assert_eq!(model.update(true, 2.0), 85.0);
        assert_eq!(model.update(false, 1.0), 88.0);
    }

    #[test]
    fn test_recovery_from_zero_clamps_at_full() {
        let mut model = VitalityModel::new(VitalityConfig {
            initial: 0.0,
            ..VitalityConfig::default()
        });

        for _ in 0..20 {
            model.update(false, 1.0);
        }
        assert_eq!(model.vitality(), 60.0);

        let mut tick = 20;
        while model.vitality() < 100.0 {
            model.update(false, 1.0);
            tick += 1;
        }
        assert_eq!(tick, 34);

        for _ in 0..10 {
            assert_eq!(model.update(false, 1.0), 100.0);
        }
    }

    #[test]
    fn test_constant_presence_is_non_increasing() {
        let mut model = VitalityModel::default();
        let mut previous = model.vitality();
        for _ in 0..40 {
            let v = model.update(true, 1.0);
            assert!(v <= previous);
            previous = v;
        }
        assert_eq!(previous, 0.0);
        assert_eq!(model.update(true, 1.0), 0.0);
    }

    #[test]
    fn test_clamp_holds_for_extreme_rates() {
        let mut model = VitalityModel::new(VitalityConfig {
            initial: 50.0,
            decay_rate: 1e9,
            recover_rate: 1e12,
        });
        let pattern = [true, false, false, true, true, false];
        for (i, &presence) in pattern.iter().cycle().take(60).enumerate() {
            let v = model.update(presence, 0.001 * (i + 1) as f64);
            assert!((VITALITY_MIN..=VITALITY_MAX).contains(&v));
        }
    }

    #[test]
    fn test_initial_value_is_clamped() {
        let model = VitalityModel::new(VitalityConfig {
            initial: 250.0,
            ..VitalityConfig::default()
        });
        assert_eq!(model.vitality(), 100.0);
    }

    #[test]
    fn test_symmetric_rates() {
        let mut model = VitalityModel::new(VitalityConfig::symmetric(10.0));
        assert_eq!(model.update(true, 0.5), 95.0);
        assert_eq!(model.update(false, 0.5), 100.0);
    }
}
