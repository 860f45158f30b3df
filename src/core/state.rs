//! # Dispatcher runtime state.
//!
//! Everything the scheduling path mutates lives here, behind the dispatcher's
//! single mutex: the wait queue, the in-flight counter and the id sequence.

use crate::core::wait_queue::WaitQueue;

/// Coarse state of the dispatch loop.
///
/// ```text
///            submit                      in_flight == concurrency
///   Idle ───────────► Draining ◄──────────────────────────────► Saturated
///    ▲                   │          completion frees a slot
///    └───────────────────┘
///      last completion, nothing pending
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatcherStatus {
    /// Nothing running, nothing pending.
    Idle,
    /// Work in progress with capacity to spare.
    Draining,
    /// Every concurrency slot is taken; new work waits in the queue.
    Saturated,
}

/// Mutable scheduling state of one dispatcher.
#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) queue: WaitQueue,
    pub(crate) in_flight: usize,
    pub(crate) expired_total: usize,
    next_id: u64,
}

impl State {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates the next submission id (1-based, monotonic).
    pub(crate) fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// True if another job may start under `limit` (`None` = unlimited).
    pub(crate) fn has_capacity(&self, limit: Option<usize>) -> bool {
        limit.is_none_or(|max| self.in_flight < max)
    }

    pub(crate) fn status(&self, limit: Option<usize>) -> DispatcherStatus {
        if self.in_flight == 0 && self.queue.is_empty() {
            DispatcherStatus::Idle
        } else if self.has_capacity(limit) {
            DispatcherStatus::Draining
        } else {
            DispatcherStatus::Saturated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut st = State::new();
        assert_eq!(st.next_id(), 1);
        assert_eq!(st.next_id(), 2);
    }

    #[test]
    fn status_transitions() {
        let mut st = State::new();
        assert_eq!(st.status(Some(2)), DispatcherStatus::Idle);

        st.in_flight = 1;
        assert_eq!(st.status(Some(2)), DispatcherStatus::Draining);

        st.in_flight = 2;
        assert_eq!(st.status(Some(2)), DispatcherStatus::Saturated);
        assert_eq!(st.status(None), DispatcherStatus::Draining);
    }
}
