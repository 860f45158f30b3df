//! # Dispatcher: admission, wait queue and dispatch loop.
//!
//! [`Dispatcher`] accepts submissions, queues them under the configured
//! [`Order`](crate::Order), and runs them on the tokio runtime with at most
//! `concurrency` in flight.
//!
//! ## Architecture
//! ```text
//! submit(f)
//!   ├─► lock(State)
//!   │     ├─► publish Arrival
//!   │     ├─► Admission::decide(pending, cfg)
//!   │     │     ├─ Reject     ─► publish Rejected, resolve MaxSizeExceeded, return
//!   │     │     ├─ EvictFront ─► pop_front, publish Evicted, resolve it MaxSizeExceeded
//!   │     │     └─ Admit
//!   │     ├─► push_back(Job) (+ arm expiry timer when max_age > 0)
//!   │     ├─► publish Enqueued, QueueLength
//!   │     └─► pump()
//!   └─► TaskHandle
//!
//! pump()   (always under the lock)
//!   while in_flight < concurrency && queue not empty:
//!     ├─► take_next(order), in_flight += 1
//!     ├─► publish Dequeued, QueueLength, InFlight, QueueTime
//!     └─► tokio::spawn(execute(job))
//!
//! execute(job)
//!   ├─► run work (panic-isolated)
//!   ├─► lock(State): in_flight -= 1, publish InFlight, pump()
//!   ├─► publish ServiceTime, Latency, Completed
//!   └─► resolve the job's slot
//! ```
//!
//! ## Rules
//! - Admission, queue mutation and slot claiming happen under one mutex; no `.await`
//!   is ever held across it, so the submit and completion paths cannot double-claim
//!   a slot or double-remove a job.
//! - A freed slot is refilled before the completed job's result is delivered.
//! - Every submission resolves exactly once: success, forwarded error, panic,
//!   `MaxSizeExceeded`, or `Expired`.
//! - Executing tasks hold the dispatcher alive; dropping every [`Dispatcher`] clone
//!   lets the backlog drain instead of orphaning it.
//!
//! ## Example
//! ```rust
//! use queuevisor::{Dispatcher, DispatcherConfig, DispatchError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let dispatcher = Dispatcher::new(DispatcherConfig {
//!         concurrency: 2,
//!         max_size: 16,
//!         ..DispatcherConfig::default()
//!     });
//!
//!     let handle = dispatcher.submit(|| async { Ok::<_, std::io::Error>(21 * 2) });
//!     assert_eq!(handle.await.unwrap(), 42);
//!
//!     let failing = dispatcher.submit(|| async { Err::<(), _>("boom") });
//!     assert!(matches!(failing.await, Err(DispatchError::Task("boom"))));
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::sync::{broadcast, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::core::admission::Admission;
use crate::core::builder::DispatcherBuilder;
use crate::core::config::{DispatcherConfig, DispatcherOptions};
use crate::core::staleness;
use crate::core::state::{DispatcherStatus, State};
use crate::error::{DispatchError, Rejection};
use crate::events::{Emitter, Event, EventKind};
use crate::tasks::{Finished, Job, TaskHandle};

/// Shared core of a dispatcher.
pub(crate) struct Inner {
    pub(crate) cfg: DispatcherConfig,
    pub(crate) emitter: Emitter,
    state: Mutex<State>,
    /// Parent of every expiry timer token; cancelled on drop.
    pub(crate) timers: CancellationToken,
}

impl Inner {
    pub(crate) fn new(cfg: DispatcherConfig, emitter: Emitter) -> Self {
        Self {
            cfg,
            emitter,
            state: Mutex::new(State::new()),
            timers: CancellationToken::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn emit(&self, ev: Event) {
        self.emitter.emit(ev);
    }

    /// Claims free slots for pending jobs, in dispatch order.
    fn pump(self: &Arc<Self>, st: &mut State) {
        let limit = self.cfg.concurrency_limit();
        while st.has_capacity(limit) {
            let Some(job) = st.queue.take_next(self.cfg.order) else {
                break;
            };
            st.in_flight += 1;

            let id = job.id();
            trace!(id, in_flight = st.in_flight, pending = st.queue.len(), "dispatching");
            self.emit(Event::new(EventKind::Dequeued).with_task_id(id));
            self.emit(Event::new(EventKind::QueueLength).with_count(st.queue.len()));
            self.emit(Event::new(EventKind::InFlight).with_count(st.in_flight));

            self.spawn_execution(job);
        }
    }

    fn spawn_execution(self: &Arc<Self>, job: Job) {
        let me = Arc::clone(self);
        let id = job.id();
        let arrived = job.arrived();
        let dispatched = Instant::now();
        self.emit(
            Event::new(EventKind::QueueTime)
                .with_task_id(id)
                .with_duration(dispatched.duration_since(arrived)),
        );

        let run = job.start();
        tokio::spawn(async move {
            let finished: Finished = run.await;
            let service = dispatched.elapsed();
            me.complete();

            me.emit(
                Event::new(EventKind::ServiceTime)
                    .with_task_id(id)
                    .with_duration(service),
            );
            me.emit(
                Event::new(EventKind::Latency)
                    .with_task_id(id)
                    .with_duration(arrived.elapsed()),
            );
            let completed = Event::new(EventKind::Completed).with_task_id(id);
            me.emit(match finished.error {
                Some(label) => completed.with_reason(label),
                None => completed,
            });
            finished.resolve();
        });
    }

    /// Frees the slot of a finished job and refills it.
    fn complete(self: &Arc<Self>) {
        let mut st = self.lock();
        st.in_flight = st.in_flight.saturating_sub(1);
        self.emit(Event::new(EventKind::InFlight).with_count(st.in_flight));
        self.pump(&mut st);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.timers.cancel();
    }
}

/// Admission-controlled task dispatcher.
///
/// Cheap to clone: clones share the same queue, counters and subscribers.
/// Must be used from within a tokio runtime (work and expiry timers are spawned).
#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) inner: Arc<Inner>,
}

impl Dispatcher {
    /// Creates a dispatcher without subscribers.
    pub fn new(cfg: DispatcherConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Creates a dispatcher from raw options, validating them first.
    pub fn from_options(opts: DispatcherOptions) -> Result<Self, DispatchError> {
        Ok(DispatcherBuilder::from_options(opts)?.build())
    }

    /// Returns a builder for attaching a name and subscribers.
    pub fn builder(cfg: DispatcherConfig) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// Submits a unit of work.
    ///
    /// `work` is called at most once, when the job is dispatched. The returned
    /// handle resolves exactly once with the work's value, its forwarded error,
    /// or a [`DispatchError`] produced by the dispatcher.
    pub fn submit<F, Fut, T, E>(&self, work: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let inner = &self.inner;
        let (tx, rx) = oneshot::channel();
        let arrived = Instant::now();

        let mut st = inner.lock();
        let id = st.next_id();
        let handle = TaskHandle::new(id, rx);
        inner.emit(Event::new(EventKind::Arrival).with_task_id(id));

        match Admission::decide(st.queue.len(), &inner.cfg) {
            Admission::Admit => {}
            Admission::Reject => {
                debug!(id, pending = st.queue.len(), "queue full; rejecting submission");
                inner.emit(Event::new(EventKind::Rejected).with_task_id(id));
                let _ = tx.send(Err(DispatchError::MaxSizeExceeded));
                return handle;
            }
            Admission::EvictFront => {
                if let Some(oldest) = st.queue.pop_front() {
                    debug!(id, evicted = oldest.id(), "queue full; evicting oldest pending task");
                    inner.emit(Event::new(EventKind::Evicted).with_task_id(oldest.id()));
                    oldest.reject(Rejection::MaxSizeExceeded);
                }
            }
        }

        let mut job = Job::new(id, arrived, work, tx);
        if let Some(max_age) = inner.cfg.expiry() {
            job.set_expiry(staleness::arm(inner, id, max_age));
        }
        st.queue.push_back(job);

        let pending = st.queue.len();
        inner.emit(
            Event::new(EventKind::Enqueued)
                .with_task_id(id)
                .with_count(pending),
        );
        inner.emit(Event::new(EventKind::QueueLength).with_count(pending));

        inner.pump(&mut st);
        handle
    }

    /// Number of pending (admitted, not yet dispatched) tasks.
    pub fn pending(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Number of tasks currently executing.
    pub fn in_flight(&self) -> usize {
        self.inner.lock().in_flight
    }

    /// Current state of the dispatch loop.
    pub fn status(&self) -> DispatcherStatus {
        self.inner
            .lock()
            .status(self.inner.cfg.concurrency_limit())
    }

    /// The immutable configuration of this dispatcher.
    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.cfg
    }

    /// Name attached at build time (the key, for keyed registries).
    pub fn name(&self) -> Option<&str> {
        self.inner.emitter.name()
    }

    /// Attaches a broadcast receiver observing every subsequent event.
    ///
    /// Detach by dropping the receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Event>> {
        self.inner.emitter.bus().subscribe()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.lock();
        f.debug_struct("Dispatcher")
            .field("name", &self.name())
            .field("config", &self.inner.cfg)
            .field("pending", &st.queue.len())
            .field("in_flight", &st.in_flight)
            .finish()
    }
}
