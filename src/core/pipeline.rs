//! Per-tick orchestration of the presence pipeline.
//!
//! ```text
//! sample ──▶ SmoothingFilter ──▶ PresenceClassifier ──┬─▶ OccupancyTracker
//!                                                      ├─▶ VitalityModel
//!                                                      └─▶ AssetSelector ──▶ index
//! ```
//!
//! Each stage is touched exactly once per tick, in that order.

use crate::core::classifier::{Classification, ClassifierConfig, PresenceClassifier};
use crate::core::occupancy::{OccupancyTracker, PresenceState};
use crate::core::selector::{AssetSelector, SelectError, SelectionMode};
use crate::core::smoothing::{SmoothingFilter, DEFAULT_WINDOW};
use crate::core::vitality::{VitalityConfig, VitalityModel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters for every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of readings averaged by the smoothing filter
    pub smoothing_window: usize,
    pub classifier: ClassifierConfig,
    pub vitality: VitalityConfig,
    pub selection: SelectionMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            smoothing_window: DEFAULT_WINDOW,
            classifier: ClassifierConfig::default(),
            vitality: VitalityConfig::default(),
            selection: SelectionMode::default(),
        }
    }
}

/// Everything the pipeline derived during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Zero-based tick counter
    pub tick: u64,
    /// Seconds elapsed since the first tick, including this one
    pub elapsed_secs: f64,
    /// Raw reading fed in this tick (cm)
    pub sample_cm: Option<f64>,
    /// Smoothed distance (cm)
    pub smoothed_cm: Option<f64>,
    pub classification: Classification,
    pub occupancy: PresenceState,
    pub vitality: f64,
    /// Index into the asset catalog
    pub asset_index: usize,
}

impl TickReport {
    pub fn presence(&self) -> bool {
        self.classification.presence
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.2}s ", self.elapsed_secs)?;
        match self.smoothed_cm {
            Some(d) => write!(f, "dist={d:.1}cm ")?,
            None => write!(f, "no data ")?,
        }
        write!(
            f,
            "presence={} hunched={} dur={:.2}s vital={:.1} asset={}",
            self.classification.presence,
            self.classification.hunched,
            self.occupancy.duration,
            self.vitality,
            self.asset_index
        )
    }
}

/// The full smoothing → classification → state → selection chain.
#[derive(Debug, Clone)]
pub struct Pipeline {
    filter: SmoothingFilter,
    classifier: PresenceClassifier,
    occupancy: OccupancyTracker,
    vitality: VitalityModel,
    selector: AssetSelector,
    tick: u64,
    elapsed_secs: f64,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            filter: SmoothingFilter::new(config.smoothing_window),
            classifier: PresenceClassifier::new(config.classifier),
            occupancy: OccupancyTracker::new(),
            vitality: VitalityModel::new(config.vitality),
            selector: AssetSelector::new(config.selection),
            tick: 0,
            elapsed_secs: 0.0,
        }
    }

    /// Run one tick.
    ///
    /// `dt` must be strictly positive; `catalog_len` is the number of assets
    /// the index will address. An empty catalog fails before any state moves.
    pub fn tick(
        &mut self,
        sample_cm: Option<f64>,
        dt: f64,
        catalog_len: usize,
    ) -> Result<TickReport, SelectError> {
        if catalog_len == 0 {
            return Err(SelectError::EmptyCatalog);
        }

        let smoothed_cm = self.filter.ingest(sample_cm);
        let classification = self.classifier.classify(smoothed_cm);
        let occupancy = self.occupancy.update(classification.presence, dt);
        let vitality = self.vitality.update(classification.presence, dt);
        let asset_index = self.selector.select(vitality, classification, catalog_len)?;

        self.elapsed_secs += dt;
        let report = TickReport {
            tick: self.tick,
            elapsed_secs: self.elapsed_secs,
            sample_cm,
            smoothed_cm,
            classification,
            occupancy,
            vitality,
            asset_index,
        };
        self.tick += 1;

        Ok(report)
    }

    pub fn vitality(&self) -> f64 {
        self.vitality.vitality()
    }

    pub fn occupancy(&self) -> PresenceState {
        self.occupancy.state()
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selector.mode()
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }
}
