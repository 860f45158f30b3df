use std::sync::Arc;

use crate::{
    core::config::{DispatcherConfig, DispatcherOptions},
    error::ConfigError,
    events::{Bus, Emitter},
    subscribers::{Subscribe, SubscriberSet},
};

use super::dispatcher::{Dispatcher, Inner};

/// Builder for constructing a [`Dispatcher`] with optional features.
pub struct DispatcherBuilder {
    cfg: DispatcherConfig,
    name: Option<Arc<str>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    shared: Option<(Bus, Arc<SubscriberSet>)>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: DispatcherConfig) -> Self {
        Self {
            cfg,
            name: None,
            subscribers: Vec::new(),
            shared: None,
        }
    }

    /// Creates a builder from raw options, rejecting invalid values.
    pub fn from_options(opts: DispatcherOptions) -> Result<Self, ConfigError> {
        Ok(Self::new(DispatcherConfig::try_from(opts)?))
    }

    /// Names the dispatcher; the name is stamped on every event it emits.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Reuses an existing bus and subscriber set instead of creating new ones.
    ///
    /// Used by the keyed registry so that every key feeds the same subscribers.
    pub(crate) fn with_shared(mut self, bus: Bus, subs: Arc<SubscriberSet>) -> Self {
        self.shared = Some((bus, subs));
        self
    }

    /// Builds and returns the dispatcher.
    ///
    /// Spawns one worker per subscriber, so a tokio runtime must be running when
    /// subscribers are attached.
    pub fn build(self) -> Dispatcher {
        let (bus, subs) = match self.shared {
            Some(shared) => shared,
            None => {
                let bus = Bus::new(self.cfg.bus_capacity_clamped());
                let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
                (bus, subs)
            }
        };
        let emitter = Emitter::new(self.name, bus, subs);

        Dispatcher {
            inner: Arc::new(Inner::new(self.cfg, emitter)),
        }
    }
}
