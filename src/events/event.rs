//! # Lifecycle events emitted by a dispatcher.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Admission events**: arrival, enqueue, rejection, eviction
//! - **Execution events**: dequeue, completion, timing samples
//! - **Gauges**: queue length and in-flight count after each change
//!
//! The [`Event`] struct carries metadata such as timestamps, dispatcher name,
//! task id, gauge values and durations.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Events of one dispatcher are emitted from its critical section or from the task
//! that owns the transition, so `seq` restores their order across subscribers.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use queuevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::QueueTime)
//!     .with_dispatcher("uploads")
//!     .with_task_id(7)
//!     .with_duration(Duration::from_millis(12));
//!
//! assert_eq!(ev.kind, EventKind::QueueTime);
//! assert_eq!(ev.dispatcher.as_deref(), Some("uploads"));
//! assert_eq!(ev.duration, Some(Duration::from_millis(12)));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of dispatcher events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Admission ===
    /// A submission arrived (before the admission decision).
    ///
    /// Sets: `task_id`
    Arrival,

    /// A submission was admitted and appended to the queue.
    ///
    /// Sets: `task_id`, `count` (pending after append)
    Enqueued,

    /// A submission was refused by a full fifo queue.
    ///
    /// Sets: `task_id`
    Rejected,

    /// A pending task was evicted from the front of a full lifo queue.
    ///
    /// Sets: `task_id` (the evicted task)
    Evicted,

    /// A pending task waited longer than `max_age` and was removed.
    ///
    /// Sets: `task_id`, `count` (expired so far by this dispatcher), `duration` (time waited)
    Expired,

    // === Gauges ===
    /// Pending count changed.
    ///
    /// Sets: `count`
    QueueLength,

    /// In-flight count changed.
    ///
    /// Sets: `count`
    InFlight,

    // === Execution ===
    /// A task left the queue and started executing.
    ///
    /// Sets: `task_id`
    Dequeued,

    /// Time a dispatched task spent pending.
    ///
    /// Sets: `task_id`, `duration`
    QueueTime,

    /// Time the work itself took.
    ///
    /// Sets: `task_id`, `duration`
    ServiceTime,

    /// End-to-end time from arrival to completion.
    ///
    /// Sets: `task_id`, `duration`
    Latency,

    /// Work finished (success, error or panic; the dispatcher does not distinguish).
    ///
    /// Sets: `task_id`, `reason` (error label when the work did not succeed)
    Completed,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `reason` (`subscriber=<name> info=<panic>`)
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason` (`subscriber=<name> reason=<full|closed>`)
    SubscriberOverflow,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Arrival => "arrival",
            EventKind::Enqueued => "enqueue",
            EventKind::Rejected => "rejection",
            EventKind::Evicted => "eviction",
            EventKind::Expired => "expired",
            EventKind::QueueLength => "queue_length",
            EventKind::InFlight => "in_flight",
            EventKind::Dequeued => "dequeue",
            EventKind::QueueTime => "queue_time",
            EventKind::ServiceTime => "service_time",
            EventKind::Latency => "latency",
            EventKind::Completed => "completion",
            EventKind::SubscriberPanicked => "subscriber_panicked",
            EventKind::SubscriberOverflow => "subscriber_overflow",
        }
    }
}

/// Dispatcher event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the emitting dispatcher (the key, for keyed registries).
    pub dispatcher: Option<Arc<str>>,
    /// Submission id within the dispatcher.
    pub task_id: Option<u64>,
    /// Gauge or counter value.
    pub count: Option<usize>,
    /// Timing sample.
    pub duration: Option<Duration>,
    /// Human-readable reason (error labels, subscriber failures).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            dispatcher: None,
            task_id: None,
            count: None,
            duration: None,
            reason: None,
        }
    }

    /// Attaches the dispatcher name.
    #[inline]
    pub fn with_dispatcher(mut self, name: impl Into<Arc<str>>) -> Self {
        self.dispatcher = Some(name.into());
        self
    }

    /// Attaches a task id.
    #[inline]
    pub fn with_task_id(mut self, id: u64) -> Self {
        self.task_id = Some(id);
        self
    }

    /// Attaches a gauge/counter value.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }

    /// Attaches a timing sample.
    #[inline]
    pub fn with_duration(mut self, d: Duration) -> Self {
        self.duration = Some(d);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
