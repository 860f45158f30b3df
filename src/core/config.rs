//! # Dispatcher configuration.
//!
//! Provides [`DispatcherConfig`], the validated, immutable settings of one dispatcher,
//! and [`DispatcherOptions`], the raw form accepted from users and config files.
//!
//! ## Sentinel values
//! - `concurrency = 0` → unlimited (every pending task is dispatched immediately)
//! - `max_size = 0` → unlimited (admission never rejects or evicts)
//! - `max_age = 0s` → no expiry (no timers are started)
//!
//! ## Raw options
//! [`DispatcherOptions`] keeps signed integers so that negative values coming from
//! user input can be reported instead of silently wrapping:
//! ```text
//! DispatcherOptions { concurrency: -1, .. } ──try_from──► Err(ConfigError::NegativeConcurrency(-1))
//! DispatcherOptions { max_age_ms: -5, .. }  ──try_from──► Ok(max_age = 0s, expiry disabled)
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Dispatch discipline applied to the pending queue.
///
/// Insertion always happens at the back; the order only decides which end
/// the dispatch loop takes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// First in, first out: dispatch from the front (default).
    #[default]
    Fifo,
    /// Last in, first out: dispatch from the back; on overflow, evict from the front.
    Lifo,
}

impl Order {
    /// Returns the lowercase name (`"fifo"` / `"lifo"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Fifo => "fifo",
            Order::Lifo => "lifo",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Order {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(Order::Fifo),
            "lifo" => Ok(Order::Lifo),
            _ => Err(ConfigError::UnknownOrder(s.to_string())),
        }
    }
}

/// Configuration of a single dispatcher.
///
/// ## Field semantics
/// - `concurrency`: max simultaneous executions (`0` = unlimited)
/// - `max_size`: max pending tasks (`0` = unlimited)
/// - `max_age`: max time a task may wait before expiring (`0s` = never)
/// - `order`: [`Order::Fifo`] or [`Order::Lifo`]
/// - `bus_capacity`: ring buffer size of the event bus (min 1; clamped by Bus)
///
/// All fields are public. Prefer the helper accessors to avoid sprinkling
/// sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Maximum number of tasks executing at once.
    pub concurrency: usize,

    /// Maximum number of pending (admitted, not yet dispatched) tasks.
    pub max_size: usize,

    /// Maximum time a task may stay pending.
    pub max_age: Duration,

    /// Dispatch discipline.
    pub order: Order,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Receivers lagging more than `bus_capacity` events observe `Lagged` and skip
    /// older items. Dispatch never waits on it.
    pub bus_capacity: usize,
}

impl DispatcherConfig {
    /// Returns the concurrency cap as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` in-flight tasks
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.concurrency == 0 {
            None
        } else {
            Some(self.concurrency)
        }
    }

    /// Returns the pending-queue cap as an `Option`.
    #[inline]
    pub fn size_limit(&self) -> Option<usize> {
        if self.max_size == 0 {
            None
        } else {
            Some(self.max_size)
        }
    }

    /// Returns the maximum pending age as an `Option` (`None` = no expiry).
    #[inline]
    pub fn expiry(&self) -> Option<Duration> {
        if self.max_age == Duration::ZERO {
            None
        } else {
            Some(self.max_age)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for DispatcherConfig {
    /// Default configuration:
    ///
    /// - `concurrency = 1` (one task at a time)
    /// - `max_size = 0` (unbounded backlog)
    /// - `max_age = 0s` (no expiry)
    /// - `order = Order::Fifo`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_size: 0,
            max_age: Duration::ZERO,
            order: Order::Fifo,
            bus_capacity: 1024,
        }
    }
}

/// Raw, unvalidated construction options.
///
/// Every field is optional; missing fields take the [`DispatcherConfig`] defaults.
/// Convert with [`DispatcherConfig::try_from`] or parse directly from TOML with
/// [`DispatcherOptions::from_toml_str`].
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use queuevisor::{DispatcherConfig, DispatcherOptions, Order};
///
/// let opts = DispatcherOptions::from_toml_str(r#"
///     concurrency = 4
///     max_size = 100
///     max_age_ms = 250
///     order = "lifo"
/// "#).unwrap();
///
/// let cfg = DispatcherConfig::try_from(opts).unwrap();
/// assert_eq!(cfg.concurrency, 4);
/// assert_eq!(cfg.max_age, Duration::from_millis(250));
/// assert_eq!(cfg.order, Order::Lifo);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherOptions {
    /// Max parallel executions (`< 0` invalid, `0` unlimited).
    pub concurrency: Option<i64>,
    /// Max pending tasks (`< 0` invalid, `0` unlimited).
    pub max_size: Option<i64>,
    /// Max pending wait in milliseconds (`<= 0` disables expiry).
    pub max_age_ms: Option<i64>,
    /// `"fifo"` or `"lifo"`.
    pub order: Option<String>,
    /// Event bus capacity.
    pub bus_capacity: Option<usize>,
}

impl DispatcherOptions {
    /// Parses options from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Sets `concurrency`.
    pub fn concurrency(mut self, n: i64) -> Self {
        self.concurrency = Some(n);
        self
    }

    /// Sets `max_size`.
    pub fn max_size(mut self, n: i64) -> Self {
        self.max_size = Some(n);
        self
    }

    /// Sets `max_age_ms`.
    pub fn max_age_ms(mut self, ms: i64) -> Self {
        self.max_age_ms = Some(ms);
        self
    }

    /// Sets `order`.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }
}

impl TryFrom<DispatcherOptions> for DispatcherConfig {
    type Error = ConfigError;

    fn try_from(opts: DispatcherOptions) -> Result<Self, Self::Error> {
        let defaults = DispatcherConfig::default();

        let concurrency = match opts.concurrency {
            None => defaults.concurrency,
            Some(n) if n < 0 => return Err(ConfigError::NegativeConcurrency(n)),
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        };
        let max_size = match opts.max_size {
            None => defaults.max_size,
            Some(n) if n < 0 => return Err(ConfigError::NegativeMaxSize(n)),
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        };
        let max_age = match opts.max_age_ms {
            Some(ms) if ms > 0 => Duration::from_millis(ms.unsigned_abs()),
            _ => Duration::ZERO,
        };
        let order = match opts.order.as_deref() {
            None => defaults.order,
            Some(s) => s.parse()?,
        };

        Ok(DispatcherConfig {
            concurrency,
            max_size,
            max_age,
            order,
            bus_capacity: opts.bus_capacity.unwrap_or(defaults.bus_capacity),
        })
    }
}
