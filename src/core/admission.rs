//! # Admission policy
//!
//! Decides, before a submission touches the wait queue, whether it may be queued.
//!
//! ## Variants
//! - `Admit`: room left (or `max_size = 0`); append at the back.
//! - `Reject`: queue full under fifo; the newcomer fails with `MaxSizeExceeded`
//!   and the existing backlog is left untouched.
//! - `EvictFront`: queue full under lifo; the oldest pending job fails with
//!   `MaxSizeExceeded`, then the newcomer is appended. Lifo serves the back first,
//!   so the front job is the one least likely to ever run.
//!
//! ## Invariants
//! - After applying the decision, `pending ≤ max_size`.

use crate::core::config::{DispatcherConfig, Order};

/// Outcome of the admission check for one submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Admission {
    Admit,
    Reject,
    EvictFront,
}

impl Admission {
    /// Decides for a new submission given the current pending count.
    pub(crate) fn decide(pending: usize, cfg: &DispatcherConfig) -> Self {
        match cfg.size_limit() {
            Some(max) if pending >= max => match cfg.order {
                Order::Fifo => Admission::Reject,
                Order::Lifo => Admission::EvictFront,
            },
            _ => Admission::Admit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(max_size: usize, order: Order) -> DispatcherConfig {
        DispatcherConfig {
            max_size,
            order,
            ..DispatcherConfig::default()
        }
    }

    #[test]
    fn admits_below_limit() {
        assert_eq!(Admission::decide(0, &cfg(1, Order::Fifo)), Admission::Admit);
        assert_eq!(Admission::decide(1, &cfg(2, Order::Lifo)), Admission::Admit);
    }

    #[test]
    fn full_queue_depends_on_order() {
        assert_eq!(Admission::decide(1, &cfg(1, Order::Fifo)), Admission::Reject);
        assert_eq!(Admission::decide(1, &cfg(1, Order::Lifo)), Admission::EvictFront);
    }

    #[test]
    fn unlimited_never_sheds() {
        for order in [Order::Fifo, Order::Lifo] {
            assert_eq!(Admission::decide(1_000_000, &cfg(0, order)), Admission::Admit);
        }
    }
}
