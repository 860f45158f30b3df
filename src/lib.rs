//! # queuevisor
//!
//! **Queuevisor** is an in-process, admission-controlled task dispatcher for tokio.
//!
//! Callers submit units of asynchronous work. The dispatcher bounds how many run
//! at once, how many may wait, and how long a waiting task stays valid. Overload
//! is answered with typed errors instead of unbounded memory growth, and every
//! decision is published as a lifecycle [`Event`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   submit(f)         submit(f)                 submit(key, f)
//!      │                 │                           │
//!      ▼                 ▼                           ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────────────┐
//! │  Dispatcher                  │   │  KeyedDispatcher                 │
//! │  - Admission (accept/reject/ │   │  - one Dispatcher per key        │
//! │    evict front)              │   │  - shared Bus and SubscriberSet  │
//! │  - WaitQueue (arrival order) │   └────────────────┬─────────────────┘
//! │  - dispatch loop (fifo/lifo) │                    │
//! │  - expiry timers (max_age)   │◄───────────────────┘
//! └──────┬───────────────┬───────┘
//!        │ tokio::spawn  │ publishes Events
//!        ▼               ▼
//!   user work     ┌────────────────────────┐
//!   (panic-       │  Bus (broadcast)       │──► Dispatcher::subscribe()
//!   isolated)     │  SubscriberSet         │
//!        │        └───┬────────────────┬───┘
//!        ▼            ▼                ▼
//!   TaskHandle    StatsRecorder     LogWriter / custom
//!   (resolves
//!    exactly once)
//! ```
//!
//! ### Lifecycle
//! ```text
//! submit ──► Arrival
//!   ├─ queue full, fifo ──► Rejected                       ─► Err(MaxSizeExceeded)
//!   ├─ queue full, lifo ──► Evicted(oldest pending)        ─► oldest: Err(MaxSizeExceeded)
//!   └─► Enqueued ──► QueueLength
//!         ├─ waited > max_age ──► Expired ──► QueueLength  ─► Err(Expired)
//!         └─ slot free ──► Dequeued ──► QueueLength ──► InFlight ──► QueueTime
//!               └─ work done ──► InFlight ──► ServiceTime ──► Latency ──► Completed
//!                                                          ─► Ok(T) / Err(Task(E)) / Err(Panicked)
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------------|---------------------------------------------|
//! | **Dispatching**   | Bounded concurrency, bounded queue, fifo/lifo, staleness expiry.  | [`Dispatcher`], [`DispatcherBuilder`]       |
//! | **Keyed**         | Independent dispatchers created lazily per string key.            | [`KeyedDispatcher`]                         |
//! | **Results**       | Awaitable per-submission outcome.                                 | [`TaskHandle`]                              |
//! | **Errors**        | Typed backpressure, expiry, task and configuration errors.        | [`DispatchError`], [`ConfigError`]          |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom).            | [`Subscribe`], [`StatsRecorder`]            |
//! | **Configuration** | Typed config plus raw options loadable from TOML.                 | [`DispatcherConfig`], [`DispatcherOptions`] |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use queuevisor::{DispatchError, Dispatcher, DispatcherConfig, Order, StatsRecorder, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let stats = Arc::new(StatsRecorder::new());
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![stats.clone()];
//!     let dispatcher = Dispatcher::builder(DispatcherConfig {
//!         concurrency: 1,
//!         max_size: 1,
//!         order: Order::Fifo,
//!         ..DispatcherConfig::default()
//!     })
//!     .with_name("uploads")
//!     .with_subscribers(subs)
//!     .build();
//!
//!     let first = dispatcher.submit(|| async { Ok::<_, std::io::Error>(1) });
//!     let second = dispatcher.submit(|| async { Ok::<_, std::io::Error>(2) });
//!     let third = dispatcher.submit(|| async { Ok::<_, std::io::Error>(3) });
//!
//!     assert_eq!(first.await.unwrap(), 1);
//!     assert_eq!(second.await.unwrap(), 2);
//!     assert!(matches!(third.await, Err(DispatchError::MaxSizeExceeded)));
//! }
//! ```
mod core;
mod error;
mod events;
mod registry;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    Dispatcher, DispatcherBuilder, DispatcherConfig, DispatcherOptions, DispatcherStatus, Order,
};
pub use error::{ConfigError, DispatchError};
pub use events::{Bus, Event, EventKind};
pub use registry::KeyedDispatcher;
pub use subscribers::{Stats, StatsRecorder, Subscribe, SubscriberSet};
pub use tasks::TaskHandle;

// Optional: expose a tracing-backed logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
