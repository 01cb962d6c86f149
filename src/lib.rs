//! Bloom Sensor Agent - a desk flower that wilts while you sit.
//!
//! This library reads a proximity signal (a range finder, a generated
//! script, or a keyboard-steered simulation), smooths it, decides whether
//! someone is sitting in front of the sensor, and drives a small vitality
//! model whose value picks which flower image to display.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Bloom Sensor Agent                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌────────────┐   ┌───────────┐   │
//! │  │  Source  │──▶│ Smoothing │──▶│ Classifier │──▶│ Occupancy │   │
//! │  │ (range)  │   │  (mean 5) │   │ (10/30/60) │   │ Vitality  │   │
//! │  └──────────┘   └───────────┘   └────────────┘   └───────────┘   │
//! │                                                        │         │
//! │  ┌──────────┐   ┌───────────┐                          ▼         │
//! │  │ Session  │◀──│ Renderer  │◀───────────────── Asset Selector   │
//! │  │  export  │   │           │                                    │
//! │  └──────────┘   └───────────┘                                    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use bloom_sensor_agent::{
//!     agent::{Agent, RunOptions},
//!     catalog::{AssetCatalog, AssetPattern},
//!     config::{Config, Preset},
//!     render::LogRenderer,
//!     source::{synthetic, SyntheticSource},
//! };
//! use std::path::Path;
//! use std::sync::atomic::AtomicBool;
//!
//! let config = Config::default().with_preset(Preset::Synthetic);
//! let catalog = AssetCatalog::discover(Path::new("flowers"), &AssetPattern::default())
//!     .expect("no flower images");
//! let source = SyntheticSource::from_presence(
//!     "pattern",
//!     &synthetic::default_pattern(),
//!     config.synthetic,
//! );
//!
//! let mut agent = Agent::new(config, source, LogRenderer::new(), catalog)
//!     .expect("invalid configuration");
//! let outcome = agent
//!     .run(&AtomicBool::new(false), &RunOptions::default())
//!     .expect("run failed");
//! println!("{}", outcome.session.summary().display());
//! ```

pub mod agent;
pub mod catalog;
pub mod config;
pub mod core;
pub mod render;
pub mod session;
pub mod source;

// Re-export key types at crate root for convenience
pub use agent::{Agent, AgentError, RunOptions, RunOutcome, StopReason};
pub use catalog::{AssetCatalog, AssetPattern, CatalogError};
pub use config::{Config, ConfigError, Preset};
pub use self::core::{
    Classification, Pipeline, PipelineConfig, SelectError, SelectionMode, TickReport,
};
pub use render::{LogRenderer, Renderer};
pub use session::{SessionLog, SessionSummary};
pub use source::{RangeSample, RangeSource, SourceError, SourceKind};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Explanation shown by `bloom-sensor about`.
pub const ABOUT: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║                  BLOOM SENSOR AGENT - HOW IT WORKS               ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  A range sensor watches the space in front of your desk.         ║
║                                                                  ║
║  ✓ SOMEONE 10-60 cm AWAY:                                        ║
║    • The flower slowly wilts                                     ║
║    • Closer than 30 cm also flags a hunched posture              ║
║                                                                  ║
║  ✓ NOBODY THERE (or too far, or no reading):                     ║
║    • The flower recovers                                         ║
║                                                                  ║
║  Only a single smoothed distance is kept per tick. A presence    ║
║  time series can be exported as CSV when the session ends.       ║
║                                                                  ║
║  Stand up now and then. Your flower will thank you.              ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
