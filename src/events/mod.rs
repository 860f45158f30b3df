//! Dispatcher events: types, broadcast bus and emitter.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//! - `Emitter` per-dispatcher sink feeding the bus and the subscriber set
//!
//! ## Quick reference
//! - **Publishers**: the dispatcher critical section (admission, gauges, dequeue),
//!   execution tasks (timings, completion), expiry timers, `SubscriberSet` workers
//!   (overflow/panic).
//! - **Consumers**: `Subscribe` implementations and broadcast receivers.

mod bus;
mod emitter;
mod event;

pub use bus::Bus;
pub(crate) use emitter::Emitter;
pub use event::{Event, EventKind};
