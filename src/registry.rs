//! # Keyed registry: one dispatcher per string key.
//!
//! [`KeyedDispatcher`] lazily constructs a [`Dispatcher`] the first time a key is
//! used and forwards submissions to it. All dispatchers share one configuration,
//! one event bus and one subscriber set; each is named after its key so events
//! (and [`StatsRecorder`](crate::StatsRecorder) breakdowns) stay attributable.
//!
//! ## Architecture
//! ```text
//! submit(key, f)
//!   ├─► lock(map)
//!   │     └─► get(key) or build Dispatcher { name = key, cfg, shared bus/subs }
//!   ├─► unlock
//!   └─► Dispatcher::submit(f)
//! ```
//!
//! ## Rules
//! - At most one dispatcher per key: lookup and creation happen under one mutex.
//! - Dispatchers share no scheduling state: a full queue, an expiry or a failure
//!   under one key never touches another key's backlog or counters.
//! - Entries live as long as the registry; no fairness across keys.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

use crate::core::{Dispatcher, DispatcherBuilder, DispatcherConfig, DispatcherOptions};
use crate::error::DispatchError;
use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::TaskHandle;

struct Entries {
    dispatchers: HashMap<String, Dispatcher>,
    /// Created on first use, inside the runtime.
    subs: Option<Arc<SubscriberSet>>,
}

/// Lazily-populated map from key to [`Dispatcher`].
///
/// ## Example
/// ```rust
/// use queuevisor::{DispatcherConfig, KeyedDispatcher};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let keyed = KeyedDispatcher::new(DispatcherConfig::default());
///
///     let a = keyed.submit("tenant-a", || async { Ok::<_, ()>("a") });
///     let b = keyed.submit("tenant-b", || async { Ok::<_, ()>("b") });
///
///     assert_eq!(a.await.unwrap(), "a");
///     assert_eq!(b.await.unwrap(), "b");
///     assert_eq!(keyed.keys(), vec!["tenant-a", "tenant-b"]);
/// }
/// ```
pub struct KeyedDispatcher {
    cfg: DispatcherConfig,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    entries: Mutex<Entries>,
}

impl KeyedDispatcher {
    /// Creates an empty registry; every key gets a dispatcher configured with `cfg`.
    pub fn new(cfg: DispatcherConfig) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            subscribers: Vec::new(),
            entries: Mutex::new(Entries {
                dispatchers: HashMap::new(),
                subs: None,
            }),
        }
    }

    /// Creates an empty registry from raw options, validating them first.
    pub fn from_options(opts: DispatcherOptions) -> Result<Self, DispatchError> {
        let cfg = DispatcherConfig::try_from(opts)?;
        Ok(Self::new(cfg))
    }

    /// Sets subscribers shared by every key's dispatcher.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Looks up or creates the dispatcher for `key` and submits `work` to it.
    pub fn submit<F, Fut, T, E>(&self, key: &str, work: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.get_or_create(key).submit(work)
    }

    /// Returns the dispatcher for `key` if it has been created.
    pub fn get(&self, key: &str) -> Option<Dispatcher> {
        self.lock().dispatchers.get(key).cloned()
    }

    /// Sorted list of keys with a dispatcher.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().dispatchers.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Number of dispatchers created so far.
    pub fn len(&self) -> usize {
        self.lock().dispatchers.len()
    }

    /// True if no key has been used yet.
    pub fn is_empty(&self) -> bool {
        self.lock().dispatchers.is_empty()
    }

    /// Attaches a broadcast receiver observing events of every key.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Event>> {
        self.bus.subscribe()
    }

    /// The configuration shared by every key.
    pub fn config(&self) -> &DispatcherConfig {
        &self.cfg
    }

    fn get_or_create(&self, key: &str) -> Dispatcher {
        let mut entries = self.lock();
        if let Some(d) = entries.dispatchers.get(key) {
            return d.clone();
        }

        let subs = match &entries.subs {
            Some(subs) => Arc::clone(subs),
            None => {
                let subs = Arc::new(SubscriberSet::new(
                    self.subscribers.clone(),
                    self.bus.clone(),
                ));
                entries.subs = Some(Arc::clone(&subs));
                subs
            }
        };

        debug!(key, "creating dispatcher");
        let d = DispatcherBuilder::new(self.cfg.clone())
            .with_name(key)
            .with_shared(self.bus.clone(), subs)
            .build();
        entries.dispatchers.insert(key.to_owned(), d.clone());
        d
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Order;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn one_dispatcher_per_key() {
        let keyed = KeyedDispatcher::new(DispatcherConfig::default());
        assert!(keyed.is_empty());

        keyed.submit("a", || async { Ok::<_, ()>(()) }).await.unwrap();
        keyed.submit("a", || async { Ok::<_, ()>(()) }).await.unwrap();
        keyed.submit("b", || async { Ok::<_, ()>(()) }).await.unwrap();

        assert_eq!(keyed.len(), 2);
        assert_eq!(keyed.get("a").unwrap().name(), Some("a"));
        assert!(keyed.get("c").is_none());
    }

    #[tokio::test]
    async fn keys_are_isolated() {
        let keyed = KeyedDispatcher::new(DispatcherConfig {
            concurrency: 1,
            max_size: 1,
            order: Order::Fifo,
            ..DispatcherConfig::default()
        });
        let (release_a, blocked_a) = oneshot::channel::<()>();

        let busy_a = keyed.submit("a", move || async move {
            let _ = blocked_a.await;
            Ok::<_, ()>("a0")
        });
        let pending_a = keyed.submit("a", || async { Ok::<_, ()>("a1") });
        let rejected_a = keyed.submit("a", || async { Ok::<_, ()>("a2") });
        assert!(matches!(rejected_a.await, Err(DispatchError::MaxSizeExceeded)));

        // Key "b" has its own slot and queue.
        let b = keyed.submit("b", || async { Ok::<_, ()>("b0") });
        assert_eq!(b.await.unwrap(), "b0");
        assert_eq!(keyed.get("b").unwrap().pending(), 0);
        assert_eq!(keyed.get("a").unwrap().pending(), 1);

        let _ = release_a.send(());
        assert_eq!(busy_a.await.unwrap(), "a0");
        assert_eq!(pending_a.await.unwrap(), "a1");
    }

    #[tokio::test]
    async fn events_carry_the_key() {
        let keyed = KeyedDispatcher::new(DispatcherConfig::default());
        let mut rx = keyed.subscribe();

        keyed
            .submit("orders", || async {
                tokio::time::sleep(Duration::from_millis(1)).await;
                Ok::<_, ()>(())
            })
            .await
            .unwrap();

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.dispatcher.as_deref(), Some("orders"));
    }

    #[test]
    fn invalid_options_fail_construction() {
        let err = KeyedDispatcher::from_options(DispatcherOptions::default().concurrency(-2))
            .err()
            .unwrap();
        assert_eq!(err.as_label(), "config_invalid");
    }
}
