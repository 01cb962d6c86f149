//! Selection of a display asset from an ordered catalog.
//!
//! Catalogs are ordered from "worst" (index 0, a wilted flower) to
//! "healthiest" (index N-1). Two selection modes exist and are kept
//! separate on purpose:
//!
//! - [`SelectionMode::Vitality`] scales the vitality score onto the catalog.
//! - [`SelectionMode::Detection`] picks by the raw detection outcome of the
//!   tick: 0 when nothing was detected, 1 when presence or the posture flag
//!   was raised, taken modulo the catalog length.

use crate::core::classifier::Classification;
use crate::core::vitality::VITALITY_MAX;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the asset index is chosen each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Scale vitality in `[0, 100]` onto `[0, N-1]`
    #[default]
    Vitality,
    /// Binary detection outcome, modulo N
    Detection,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Vitality => "vitality",
            SelectionMode::Detection => "detection",
        }
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vitality" => Ok(SelectionMode::Vitality),
            "detection" | "binary" => Ok(SelectionMode::Detection),
            other => Err(format!("unknown selection mode '{other}'")),
        }
    }
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while selecting an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// The catalog has no assets to choose from
    EmptyCatalog,
}

impl std::fmt::Display for SelectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectError::EmptyCatalog => write!(f, "Asset catalog is empty"),
        }
    }
}

impl std::error::Error for SelectError {}

/// Picks catalog indices according to a [`SelectionMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetSelector {
    mode: SelectionMode,
}

impl AssetSelector {
    pub fn new(mode: SelectionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Select an index for this tick using the configured mode.
    pub fn select(
        &self,
        vitality: f64,
        classification: Classification,
        catalog_len: usize,
    ) -> Result<usize, SelectError> {
        match self.mode {
            SelectionMode::Vitality => select_by_vitality(vitality, catalog_len),
            SelectionMode::Detection => select_by_detection(classification, catalog_len),
        }
    }
}

/// `floor(vitality / 100 * (N - 1))`.
pub fn select_by_vitality(vitality: f64, catalog_len: usize) -> Result<usize, SelectError> {
    if catalog_len == 0 {
        return Err(SelectError::EmptyCatalog);
    }
    let last = catalog_len - 1;
    let scaled = (vitality / VITALITY_MAX) * last as f64;
    // Float-to-int casts saturate, so out-of-range or NaN input stays in bounds
    Ok((scaled.floor() as usize).min(last))
}

/// 0 for no detection, 1 for presence or posture flag, modulo N.
pub fn select_by_detection(
    classification: Classification,
    catalog_len: usize,
) -> Result<usize, SelectError> {
    if catalog_len == 0 {
        return Err(SelectError::EmptyCatalog);
    }
    let signal = usize::from(classification.detected());
    Ok(signal % catalog_len)
}
