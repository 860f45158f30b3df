//! Dispatcher core: admission, ordering, dispatch and expiry.
//!
//! The only public API from this module is [`Dispatcher`] with its builder,
//! configuration and status types.
//!
//! Internal modules:
//! - [`admission`]: accept / reject / evict decision for a new submission;
//! - [`wait_queue`]: arrival-ordered pending jobs;
//! - [`state`]: everything guarded by the dispatcher mutex;
//! - [`dispatcher`]: submit path and the dispatch loop;
//! - [`staleness`]: per-task expiry timers;
//! - [`builder`], [`config`]: construction.

mod admission;
mod builder;
mod config;
mod dispatcher;
mod staleness;
mod state;
mod wait_queue;

pub use builder::DispatcherBuilder;
pub use config::{DispatcherConfig, DispatcherOptions, Order};
pub use dispatcher::Dispatcher;
pub use state::DispatcherStatus;
