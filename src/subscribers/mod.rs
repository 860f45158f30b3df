//! # Event subscribers for dispatcher metrics.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out,
//! and built-in implementations.
//!
//! ## Architecture
//! ```text
//! Dispatcher ── emit(Event) ──► SubscriberSet ──► per-subscriber queue ──► Subscribe::on_event(&Event)
//!                                                                  │
//!                                                  ┌───────────────┼──────────────┐
//!                                                  ▼               ▼              ▼
//!                                            StatsRecorder     LogWriter       Custom ...
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** - observe and react to events (logging, alerts)
//! - **Stateful subscribers** - aggregate state from events (StatsRecorder)

mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use embedded::{Stats, StatsRecorder};
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
