//! # Submission handle.
//!
//! [`TaskHandle`] is the caller's side of a submission's single-assignment result slot.
//! It is a `Future` resolving to `Result<T, DispatchError<E>>`, exactly once.
//!
//! Dropping a handle does **not** cancel the submission: a pending task still runs
//! (or is shed) and its result is discarded.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::DispatchError;

/// Future resolving to the outcome of one submission.
#[must_use = "a TaskHandle does nothing unless awaited; dropping it discards the result"]
#[derive(Debug)]
pub struct TaskHandle<T, E> {
    id: u64,
    rx: oneshot::Receiver<Result<T, DispatchError<E>>>,
}

impl<T, E> TaskHandle<T, E> {
    pub(crate) fn new(id: u64, rx: oneshot::Receiver<Result<T, DispatchError<E>>>) -> Self {
        Self { id, rx }
    }

    /// Submission id, unique within its dispatcher (matches `Event::task_id`).
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the outcome if it is already available, without waiting.
    ///
    /// `None` while the task is pending or running. After `Some` is returned the
    /// handle must not be polled again.
    pub fn try_result(&mut self) -> Option<Result<T, DispatchError<E>>> {
        match self.rx.try_recv() {
            Ok(res) => Some(res),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(DispatchError::Closed)),
        }
    }
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = Result<T, DispatchError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or_else(|_closed| Err(DispatchError::Closed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_with_sent_value() {
        let (tx, rx) = oneshot::channel();
        let handle: TaskHandle<u8, ()> = TaskHandle::new(3, rx);
        assert_eq!(handle.id(), 3);
        let _ = tx.send(Ok(9));
        assert!(matches!(handle.await, Ok(9)));
    }

    #[tokio::test]
    async fn dropped_slot_resolves_closed() {
        let (tx, rx) = oneshot::channel::<Result<(), DispatchError<()>>>();
        let mut handle = TaskHandle::new(1, rx);
        assert!(handle.try_result().is_none());
        drop(tx);
        assert!(matches!(handle.await, Err(DispatchError::Closed)));
    }
}
