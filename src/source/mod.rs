//! Range sources for the Bloom Sensor Agent.
//!
//! Every input variant (scanning range finder, generated scripts, keyboard
//! steering) implements [`RangeSource`] and yields distances in centimeters.

pub mod interactive;
pub mod lidar;
pub mod replay;
pub mod synthetic;
pub mod types;

// Re-export commonly used types
pub use interactive::{InteractiveConfig, InteractiveSource, MoveCommand};
pub use lidar::{nearest_mean_cm, LidarConfig, LidarSource, Scan, ScanDevice, ScanPoint};
pub use replay::{ReplayDevice, ReplayRecord};
pub use synthetic::{SyntheticConfig, SyntheticSource};
pub use types::{RangeSample, RangeSource, SourceError, SourceKind};
