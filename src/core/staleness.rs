//! # Staleness monitor: per-task expiry timers.
//!
//! When `max_age > 0`, every admitted job gets its own timer task:
//! ```text
//! arm(inner, id, max_age)
//!   └─► tokio::spawn
//!         select! {
//!           token.cancelled()  ─► exit  (job dispatched / evicted / dispatcher dropped)
//!           sleep(max_age)     ─► expire(id)
//!         }
//!
//! expire(id)   (under the dispatcher lock)
//!   ├─ job still queued ─► remove(id), publish Expired + QueueLength, resolve Expired
//!   └─ job gone         ─► no-op
//! ```
//!
//! ## Rules
//! - Expiry depends on arrival time only, never on the dispatch order.
//! - Timers hold a `Weak` reference: a pending timer never keeps a dispatcher alive.
//! - Every timer token is a child of the dispatcher's root token, so dropping the
//!   dispatcher core wakes and ends all outstanding timers.
//! - `remove(id)` keeps the queue arrival-ordered, so lifo front-eviction keeps
//!   targeting the oldest pending job.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::dispatcher::Inner;
use crate::error::Rejection;
use crate::events::{Event, EventKind};

/// Starts the expiry timer of job `id` and returns the token that disarms it.
pub(crate) fn arm(inner: &Arc<Inner>, id: u64, max_age: Duration) -> CancellationToken {
    let token = inner.timers.child_token();
    let weak: Weak<Inner> = Arc::downgrade(inner);
    let cancelled = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = cancelled.cancelled() => {}
            _ = tokio::time::sleep(max_age) => {
                if let Some(inner) = weak.upgrade() {
                    expire(&inner, id, max_age);
                }
            }
        }
    });

    token
}

/// Removes job `id` if it is still pending and resolves it with `Expired`.
fn expire(inner: &Inner, id: u64, max_age: Duration) {
    let mut st = inner.lock();
    let Some(job) = st.queue.remove(id) else {
        return;
    };
    st.expired_total += 1;

    let waited = job.arrived().elapsed();
    debug!(id, ?waited, ?max_age, "pending task expired");
    inner.emit(
        Event::new(EventKind::Expired)
            .with_task_id(id)
            .with_count(st.expired_total)
            .with_duration(waited),
    );
    inner.emit(Event::new(EventKind::QueueLength).with_count(st.queue.len()));
    job.reject(Rejection::Expired { max_age });
}
