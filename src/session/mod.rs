//! Session recording for the Bloom Sensor Agent.
//!
//! Tracks what happened during a run and exports it once the loop ends.

pub mod log;

// Re-export commonly used types
pub use log::{SessionError, SessionLog, SessionRow, SessionSummary, CSV_HEADER};
