//! # StatsRecorder – aggregate dispatcher counters
//!
//! Maintains running totals and the latest gauges by listening to every [`EventKind`].
//!
//! ## Why?
//! Tests, health endpoints and dashboards need a cheap snapshot of how a dispatcher
//! (or every dispatcher of a keyed registry) is behaving without wiring a full
//! metrics backend.
//!
//! ## Internal scheme
//! ```text
//! on_event(ev):
//!   ├─ Arrival/Enqueued/Dequeued/Completed/Rejected/Evicted/Expired → counter += 1
//!   ├─ QueueLength  → queue_length = count, peak = max(peak, count)
//!   ├─ InFlight     → in_flight = count
//!   ├─ Latency      → latency_total += duration
//!   └─ otherwise: ignore
//!
//! snapshot() -> Stats   (global)
//! snapshot_for(name)    (per dispatcher name)
//! ```
//!
//! Gauges are only as fresh as the subscriber queue: read them after the
//! dispatcher has gone quiet, or compare counters rather than gauges.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Point-in-time copy of recorded counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub arrivals: u64,
    pub enqueued: u64,
    pub dequeued: u64,
    pub completed: u64,
    pub rejected: u64,
    pub evicted: u64,
    pub expired: u64,
    /// Last observed pending count.
    pub queue_length: usize,
    /// Highest observed pending count.
    pub peak_queue_length: usize,
    /// Last observed in-flight count.
    pub in_flight: usize,
    /// Sum of end-to-end latencies of completed tasks.
    pub latency_total: Duration,
}

impl Stats {
    /// Mean end-to-end latency of completed tasks.
    pub fn mean_latency(&self) -> Option<Duration> {
        if self.completed == 0 {
            return None;
        }
        let n = u32::try_from(self.completed).unwrap_or(u32::MAX);
        Some(self.latency_total / n)
    }

    fn apply(&mut self, ev: &Event) {
        match ev.kind {
            EventKind::Arrival => self.arrivals += 1,
            EventKind::Enqueued => self.enqueued += 1,
            EventKind::Dequeued => self.dequeued += 1,
            EventKind::Completed => self.completed += 1,
            EventKind::Rejected => self.rejected += 1,
            EventKind::Evicted => self.evicted += 1,
            EventKind::Expired => self.expired += 1,
            EventKind::QueueLength => {
                if let Some(n) = ev.count {
                    self.queue_length = n;
                    self.peak_queue_length = self.peak_queue_length.max(n);
                }
            }
            EventKind::InFlight => {
                if let Some(n) = ev.count {
                    self.in_flight = n;
                }
            }
            EventKind::Latency => {
                if let Some(d) = ev.duration {
                    self.latency_total += d;
                }
            }
            _ => {}
        }
    }
}

#[derive(Default)]
struct Inner {
    total: Stats,
    by_dispatcher: HashMap<String, Stats>,
}

/// Subscriber that aggregates dispatcher events into [`Stats`].
pub struct StatsRecorder {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl StatsRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: 4096,
        }
    }

    /// Configure the queue capacity for this subscriber.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Returns totals across every dispatcher feeding this recorder.
    #[must_use]
    pub fn snapshot(&self) -> Stats {
        let g = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        g.total.clone()
    }

    /// Returns counters for one named dispatcher (`None` if it never emitted).
    #[must_use]
    pub fn snapshot_for(&self, dispatcher: &str) -> Option<Stats> {
        let g = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        g.by_dispatcher.get(dispatcher).cloned()
    }
}

impl Default for StatsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for StatsRecorder {
    async fn on_event(&self, ev: &Event) {
        let mut g = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(name) = ev.dispatcher.as_deref() {
            g.by_dispatcher.entry(name.to_owned()).or_default().apply(ev);
        }
        // Gauges of different dispatchers cannot be merged meaningfully; keep
        // the global gauges only for unnamed dispatchers.
        match ev.kind {
            EventKind::QueueLength | EventKind::InFlight if ev.dispatcher.is_some() => {}
            _ => g.total.apply(ev),
        }
    }

    fn name(&self) -> &'static str {
        "StatsRecorder"
    }

    fn queue_capacity(&self) -> usize {
        self.capacity
    }
}
