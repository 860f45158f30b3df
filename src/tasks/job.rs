//! # Pending job: a type-erased submission.
//!
//! The wait queue stores heterogeneous submissions (`FnOnce() -> Future<Output = Result<T, E>>`
//! for any `T`/`E`), so each one is boxed behind the [`Work`] trait together with
//! its result slot.
//!
//! A [`Job`] has exactly two ways out, and consuming `self` makes them mutually exclusive:
//! ```text
//! Job::start(self)  ──► future running the work ──► Finished::resolve()  (value / Task / Panicked)
//! Job::reject(self) ──► slot resolved with MaxSizeExceeded / Expired
//! ```
//! Dropping a `Job` without either drops its slot; the handle then observes `Closed`.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::{DispatchError, Rejection};
use crate::subscribers::panic_message;

/// Result slot of one submission.
pub(crate) type Slot<T, E> = oneshot::Sender<Result<T, DispatchError<E>>>;

/// Outcome of an executed job, ready to be delivered.
///
/// Delivery is deferred so that the dispatcher can release the concurrency slot
/// before the submitter observes the result.
pub(crate) struct Finished {
    /// Error label when the work did not succeed.
    pub(crate) error: Option<&'static str>,
    resolve: Box<dyn FnOnce() + Send>,
}

impl Finished {
    /// Delivers the outcome to the submitter (no-op if the handle was dropped).
    pub(crate) fn resolve(self) {
        (self.resolve)()
    }
}

/// Object-safe view of a submission.
trait Work: Send {
    fn run(self: Box<Self>) -> BoxFuture<'static, Finished>;
    fn reject(self: Box<Self>, reason: Rejection);
}

struct Submission<F, T, E> {
    work: F,
    slot: Slot<T, E>,
}

impl<F, Fut, T, E> Work for Submission<F, T, E>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    fn run(self: Box<Self>) -> BoxFuture<'static, Finished> {
        let Submission { work, slot } = *self;
        Box::pin(async move {
            // Calling `work` inside the future keeps a synchronous panic catchable too.
            let res = AssertUnwindSafe(async move { work().await })
                .catch_unwind()
                .await;

            let outcome = match res {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(DispatchError::Task(e)),
                Err(panic) => Err(DispatchError::Panicked {
                    info: panic_message(panic.as_ref()),
                }),
            };
            let error = outcome.as_ref().err().map(|e| e.as_label());

            Finished {
                error,
                resolve: Box::new(move || {
                    let _ = slot.send(outcome);
                }),
            }
        })
    }

    fn reject(self: Box<Self>, reason: Rejection) {
        let _ = self.slot.send(Err(reason.into()));
    }
}

/// A pending submission owned by the wait queue.
pub(crate) struct Job {
    id: u64,
    arrived: Instant,
    work: Box<dyn Work>,
    expiry: Option<CancellationToken>,
}

impl Job {
    pub(crate) fn new<F, Fut, T, E>(id: u64, arrived: Instant, work: F, slot: Slot<T, E>) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        Self {
            id,
            arrived,
            work: Box::new(Submission { work, slot }),
            expiry: None,
        }
    }

    /// Attaches the cancellation token of this job's expiry timer.
    pub(crate) fn set_expiry(&mut self, token: CancellationToken) {
        self.expiry = Some(token);
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn arrived(&self) -> Instant {
        self.arrived
    }

    /// Leaves the queue for execution; the expiry timer is disarmed.
    pub(crate) fn start(self) -> BoxFuture<'static, Finished> {
        if let Some(token) = &self.expiry {
            token.cancel();
        }
        self.work.run()
    }

    /// Resolves the job without running it; the expiry timer is disarmed.
    pub(crate) fn reject(self, reason: Rejection) {
        if let Some(token) = &self.expiry {
            token.cancel();
        }
        self.work.reject(reason);
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("arrived", &self.arrived)
            .field("expiry", &self.expiry.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn start_runs_work_and_defers_delivery() {
        let (tx, mut rx) = oneshot::channel();
        let job = Job::new(1, Instant::now(), || async { Ok::<_, ()>(7) }, tx);

        let finished = job.start().await;
        assert_eq!(finished.error, None);
        assert!(rx.try_recv().is_err(), "not delivered before resolve()");

        finished.resolve();
        assert!(matches!(rx.await.unwrap(), Ok(7)));
    }

    #[tokio::test]
    async fn work_error_is_forwarded() {
        let (tx, rx) = oneshot::channel();
        let job = Job::new(1, Instant::now(), || async { Err::<(), _>("boom") }, tx);

        let finished = job.start().await;
        assert_eq!(finished.error, Some("task_failed"));
        finished.resolve();
        assert!(matches!(rx.await.unwrap(), Err(DispatchError::Task("boom"))));
    }

    #[tokio::test]
    async fn panic_is_caught() {
        let (tx, rx) = oneshot::channel::<Result<(), DispatchError<()>>>();
        let job = Job::new(
            1,
            Instant::now(),
            || async {
                if true {
                    panic!("work exploded");
                }
                Ok(())
            },
            tx,
        );

        let finished = job.start().await;
        assert_eq!(finished.error, Some("task_panicked"));
        finished.resolve();
        match rx.await.unwrap() {
            Err(DispatchError::Panicked { info }) => assert_eq!(info, "work exploded"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reject_disarms_expiry() {
        let (tx, rx) = oneshot::channel::<Result<(), DispatchError<()>>>();
        let mut job = Job::new(1, Instant::now(), || async { Ok(()) }, tx);
        let token = CancellationToken::new();
        job.set_expiry(token.clone());

        let max_age = Duration::from_millis(5);
        job.reject(Rejection::Expired { max_age });

        assert!(token.is_cancelled());
        assert!(matches!(
            rx.await.unwrap(),
            Err(DispatchError::Expired { max_age: m }) if m == max_age
        ));
    }
}
