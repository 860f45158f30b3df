//! # Wait queue: ordered pending jobs.
//!
//! Insertion is always at the back, so the queue is sorted by arrival:
//! the front holds the oldest pending job, the back the newest.
//!
//! ```text
//!   front (oldest)                               back (newest)
//!   [ J1 ][ J2 ][ J3 ][ J4 ] ◄── push_back (admission)
//!     │                  │
//!     │                  └──► pop_back   (lifo dispatch)
//!     └──► pop_front (fifo dispatch, lifo overflow eviction)
//!
//!   remove(id) ──► expiry of a job still pending anywhere in the queue
//! ```
//!
//! ## Rules
//! - Every removal preserves the relative order of the remaining jobs, so
//!   "front = oldest pending" holds after any sequence of operations.
//! - `remove(id)` scans from the front: expiring jobs are the oldest ones.

use std::collections::VecDeque;

use crate::core::config::Order;
use crate::tasks::Job;

/// Arrival-ordered container of pending jobs.
#[derive(Debug, Default)]
pub(crate) struct WaitQueue {
    jobs: VecDeque<Job>,
}

impl WaitQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub(crate) fn push_back(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    pub(crate) fn pop_front(&mut self) -> Option<Job> {
        self.jobs.pop_front()
    }

    pub(crate) fn pop_back(&mut self) -> Option<Job> {
        self.jobs.pop_back()
    }

    /// Takes the next job to dispatch under `order`.
    pub(crate) fn take_next(&mut self, order: Order) -> Option<Job> {
        match order {
            Order::Fifo => self.pop_front(),
            Order::Lifo => self.pop_back(),
        }
    }

    /// Removes a still-pending job by id.
    pub(crate) fn remove(&mut self, id: u64) -> Option<Job> {
        let idx = self.jobs.iter().position(|j| j.id() == id)?;
        self.jobs.remove(idx)
    }

    #[cfg(test)]
    pub(crate) fn ids(&self) -> Vec<u64> {
        self.jobs.iter().map(Job::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::sync::oneshot;

    fn job(id: u64) -> Job {
        let (tx, _rx) = oneshot::channel::<Result<(), crate::DispatchError<()>>>();
        Job::new(id, Instant::now(), || async { Ok(()) }, tx)
    }

    fn queue(ids: &[u64]) -> WaitQueue {
        let mut q = WaitQueue::new();
        for &id in ids {
            q.push_back(job(id));
        }
        q
    }

    #[test]
    fn fifo_takes_front_lifo_takes_back() {
        let mut q = queue(&[1, 2, 3]);
        assert_eq!(q.take_next(Order::Fifo).map(|j| j.id()), Some(1));
        assert_eq!(q.take_next(Order::Lifo).map(|j| j.id()), Some(3));
        assert_eq!(q.ids(), vec![2]);
    }

    #[test]
    fn remove_by_id_keeps_order() {
        let mut q = queue(&[1, 2, 3, 4]);
        assert_eq!(q.remove(3).map(|j| j.id()), Some(3));
        assert!(q.remove(3).is_none());
        assert_eq!(q.ids(), vec![1, 2, 4]);
        assert_eq!(q.pop_front().map(|j| j.id()), Some(1));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn empty_queue() {
        let mut q = WaitQueue::new();
        assert!(q.is_empty());
        assert!(q.take_next(Order::Fifo).is_none());
        assert!(q.take_next(Order::Lifo).is_none());
        assert!(q.remove(1).is_none());
    }
}
