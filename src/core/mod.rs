//! Core functionality for the Bloom Sensor Agent.
//!
//! This module contains:
//! - Moving-average smoothing of range readings
//! - Presence/posture classification
//! - Occupancy duration and vitality state tracking
//! - Asset selection and the per-tick pipeline tying them together

pub mod classifier;
pub mod occupancy;
pub mod pipeline;
pub mod selector;
pub mod smoothing;
pub mod vitality;

// Re-export commonly used types
pub use classifier::{Classification, ClassifierConfig, PresenceClassifier};
pub use occupancy::{OccupancyTracker, PresenceState};
pub use pipeline::{Pipeline, PipelineConfig, TickReport};
pub use selector::{
    select_by_detection, select_by_vitality, AssetSelector, SelectError, SelectionMode,
};
pub use smoothing::SmoothingFilter;
pub use vitality::{VitalityConfig, VitalityModel};
