//! # Metrics emitter: one dispatcher's event source.
//!
//! [`Emitter`] stamps each event with the dispatcher name and fans it out to
//! both delivery channels:
//! ```text
//! Emitter::emit(Event)
//!     ├──► SubscriberSet::emit_arc()  (registered `Subscribe` impls, per-subscriber queues)
//!     └──► Bus::publish()             (broadcast receivers attached via `Dispatcher::subscribe`)
//! ```
//!
//! Both paths use `try_send`-style calls, so `emit` is safe inside the dispatcher's
//! critical section and never changes dispatch behavior.

use std::sync::Arc;

use crate::subscribers::SubscriberSet;

use super::{Bus, Event};

/// Fire-and-forget event sink owned by a dispatcher.
#[derive(Clone)]
pub(crate) struct Emitter {
    name: Option<Arc<str>>,
    bus: Bus,
    subs: Arc<SubscriberSet>,
}

impl Emitter {
    pub(crate) fn new(name: Option<Arc<str>>, bus: Bus, subs: Arc<SubscriberSet>) -> Self {
        Self { name, bus, subs }
    }

    /// Stamps and delivers one event.
    pub(crate) fn emit(&self, ev: Event) {
        if self.subs.is_empty() && self.bus.receiver_count() == 0 {
            return;
        }
        let ev = match &self.name {
            Some(name) => ev.with_dispatcher(Arc::clone(name)),
            None => ev,
        };
        let ev = Arc::new(ev);
        self.subs.emit_arc(Arc::clone(&ev));
        self.bus.publish(ev);
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
