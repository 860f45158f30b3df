//! # Built-in subscribers
//!
//! - [`StatsRecorder`]: aggregates counters and gauges (tests, health checks).
//! - [`LogWriter`]: renders events through `tracing` (feature `logging`).

#[cfg(feature = "logging")]
mod log;
mod stats;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use stats::{Stats, StatsRecorder};
