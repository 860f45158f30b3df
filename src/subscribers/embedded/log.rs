//! # LogWriter - tracing event renderer
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Gauges and timing samples go to `TRACE`, lifecycle transitions to `DEBUG`,
//! shed work and subscriber failures to `WARN`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG queuevisor: enqueue dispatcher="uploads" task=3 pending=2
//! WARN  queuevisor: rejection dispatcher="uploads" task=4
//! WARN  queuevisor: expired dispatcher="uploads" task=1 waited=50ms total=1
//! TRACE queuevisor: latency dispatcher="uploads" task=2 duration=120ms
//! ```

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let dispatcher = e.dispatcher.as_deref().unwrap_or("-");
        let label = e.kind.as_label();
        match e.kind {
            EventKind::QueueLength | EventKind::InFlight => {
                trace!(target: "queuevisor", dispatcher, count = ?e.count, "{label}");
            }
            EventKind::QueueTime | EventKind::ServiceTime | EventKind::Latency => {
                trace!(target: "queuevisor", dispatcher, task = ?e.task_id, duration = ?e.duration, "{label}");
            }
            EventKind::Arrival | EventKind::Dequeued => {
                debug!(target: "queuevisor", dispatcher, task = ?e.task_id, "{label}");
            }
            EventKind::Enqueued => {
                debug!(target: "queuevisor", dispatcher, task = ?e.task_id, pending = ?e.count, "{label}");
            }
            EventKind::Completed => {
                debug!(target: "queuevisor", dispatcher, task = ?e.task_id, err = ?e.reason, "{label}");
            }
            EventKind::Rejected | EventKind::Evicted => {
                warn!(target: "queuevisor", dispatcher, task = ?e.task_id, "{label}");
            }
            EventKind::Expired => {
                warn!(target: "queuevisor", dispatcher, task = ?e.task_id, waited = ?e.duration, total = ?e.count, "{label}");
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                warn!(target: "queuevisor", reason = e.reason.as_deref().unwrap_or("unknown"), "{label}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
