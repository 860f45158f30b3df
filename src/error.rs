//! Error types used by the dispatcher and its submissions.
//!
//! This module defines two enums:
//!
//! - [`ConfigError`]: invalid construction options, raised before a dispatcher exists.
//! - [`DispatchError`]: the outcome kinds a submission can resolve with besides success.
//!
//! Both provide `as_label` for logs/metrics, mirroring each other.

use std::convert::Infallible;
use std::time::Duration;
use thiserror::Error;

/// # Invalid construction options.
///
/// Raised synchronously by [`DispatcherOptions`](crate::DispatcherOptions) conversion
/// and [`DispatcherBuilder::build`](crate::DispatcherBuilder::build). Fatal to that
/// construction call only.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `concurrency` was negative.
    #[error("concurrency must be positive, got {0}")]
    NegativeConcurrency(i64),

    /// `max_size` was negative.
    #[error("max_size must be positive, got {0}")]
    NegativeMaxSize(i64),

    /// `order` was neither `fifo` nor `lifo`.
    #[error("unknown order {0:?}; expected \"fifo\" or \"lifo\"")]
    UnknownOrder(String),

    /// Options could not be parsed from their textual form.
    #[error("malformed options: {0}")]
    Malformed(String),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::NegativeConcurrency(_) => "config_negative_concurrency",
            ConfigError::NegativeMaxSize(_) => "config_negative_max_size",
            ConfigError::UnknownOrder(_) => "config_unknown_order",
            ConfigError::Malformed(_) => "config_malformed",
        }
    }
}

/// # Outcome of a submission that did not succeed.
///
/// Every [`TaskHandle`](crate::TaskHandle) resolves **exactly once**, either with the
/// work's value or with one of these variants. `E` is the work's own error type,
/// forwarded unchanged through [`DispatchError::Task`].
///
/// # Example
/// ```
/// use queuevisor::DispatchError;
///
/// let err: DispatchError<std::io::Error> = DispatchError::MaxSizeExceeded;
/// assert_eq!(err.as_label(), "max_size_exceeded");
/// assert!(err.is_backpressure());
/// ```
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError<E = Infallible> {
    /// Invalid construction options.
    #[error("invalid configuration: {0}")]
    Config(ConfigError),

    /// Admission rejected (fifo overflow) or pending task evicted (lifo overflow).
    #[error("max queue size exceeded")]
    MaxSizeExceeded,

    /// The task waited in the queue longer than `max_age`.
    #[error("expired after waiting {max_age:?} in queue")]
    Expired {
        /// The configured maximum pending age.
        max_age: Duration,
    },

    /// The work itself failed; the error is forwarded unchanged.
    #[error("task failed: {0}")]
    Task(E),

    /// The work panicked while executing.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The task was dropped before it could be resolved (runtime shut down).
    #[error("dispatcher closed before the task resolved")]
    Closed,
}

impl<E> DispatchError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Config(_) => "config_invalid",
            DispatchError::MaxSizeExceeded => "max_size_exceeded",
            DispatchError::Expired { .. } => "expired",
            DispatchError::Task(_) => "task_failed",
            DispatchError::Panicked { .. } => "task_panicked",
            DispatchError::Closed => "closed",
        }
    }

    /// True if the task never ran because the queue shed it
    /// ([`MaxSizeExceeded`](DispatchError::MaxSizeExceeded) or [`Expired`](DispatchError::Expired)).
    pub fn is_backpressure(&self) -> bool {
        matches!(
            self,
            DispatchError::MaxSizeExceeded | DispatchError::Expired { .. }
        )
    }

    /// Returns the forwarded work error, if this is one.
    pub fn into_task_error(self) -> Option<E> {
        match self {
            DispatchError::Task(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for DispatchError {
    fn from(err: ConfigError) -> Self {
        DispatchError::Config(err)
    }
}

/// Rejection reasons produced by the dispatcher itself (never by the work).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    MaxSizeExceeded,
    Expired { max_age: Duration },
}

impl<E> From<Rejection> for DispatchError<E> {
    fn from(r: Rejection) -> Self {
        match r {
            Rejection::MaxSizeExceeded => DispatchError::MaxSizeExceeded,
            Rejection::Expired { max_age } => DispatchError::Expired { max_age },
        }
    }
}
