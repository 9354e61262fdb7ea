//! Event Bus implementation

use crate::event::{Event, EventHandler, EventHandlerError, EventRef};
use dashmap::DashMap;
use jframework_core::{FrameworkError, FrameworkResult, TypeKey};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

type HandlerList = Vec<Weak<dyn EventHandler>>;

/// Event bus for in-process, synchronous event dispatch.
///
/// Handlers are referenced, not owned: the bus keeps a [`Weak`] to each one.
/// A handler dropped without unregistering is skipped at dispatch, never
/// dereferenced.
///
/// No lock is held while a handler runs, so handlers may register,
/// unregister or send further events from inside `handle_event`.
#[derive(Clone)]
pub struct EventBus {
    /// Handlers registered for each event type, in registration order
    handlers: Arc<DashMap<TypeKey, HandlerList>>,

    config: Arc<EventBusConfig>,
}

/// Event bus configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Log dispatches and contained handler failures
    pub enable_logging: bool,

    /// Drop subscriptions whose handler no longer exists when they are met at dispatch
    pub prune_dead_handlers: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
            prune_dead_handlers: true,
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            handlers: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Subscribe `handler` to events of the type identified by `key`.
    ///
    /// Registering the same handler twice makes it run twice per dispatch.
    pub fn register_event(&self, key: TypeKey, handler: &Arc<dyn EventHandler>) {
        self.push(key, Arc::downgrade(handler));
    }

    /// Subscribe an already-downgraded handler.
    ///
    /// Fails with [`FrameworkError::InvalidArgument`] if the handler is gone.
    pub fn register_event_weak(
        &self,
        key: TypeKey,
        handler: Weak<dyn EventHandler>,
    ) -> FrameworkResult<()> {
        if handler.strong_count() == 0 {
            return Err(FrameworkError::InvalidArgument(format!(
                "handler for event {} has already been dropped",
                key.name()
            )));
        }
        self.push(key, handler);
        Ok(())
    }

    /// Typed form of [`EventBus::register_event`]
    pub fn register<E: Event>(&self, handler: &Arc<dyn EventHandler>) {
        self.register_event(TypeKey::of::<E>(), handler);
    }

    fn push(&self, key: TypeKey, handler: Weak<dyn EventHandler>) {
        let mut list = self.handlers.entry(key).or_default();
        list.push(handler);
        let count = list.len();
        drop(list);

        if self.config.enable_logging {
            debug!(event = key.name(), handlers = count, "Subscribed handler");
        }
    }

    /// Remove the first subscription of `handler` for `key`.
    ///
    /// Returns `true` if a subscription was removed. A handler registered
    /// twice keeps its second subscription. The entry for `key` is dropped
    /// once its list is empty.
    pub fn unregister_event(&self, key: TypeKey, handler: &Arc<dyn EventHandler>) -> bool {
        self.remove_first(key, Arc::as_ptr(handler) as *const ())
    }

    /// Like [`EventBus::unregister_event`], matching by the weak reference's target
    pub fn unregister_event_weak(&self, key: TypeKey, handler: &Weak<dyn EventHandler>) -> bool {
        self.remove_first(key, handler.as_ptr() as *const ())
    }

    /// Typed form of [`EventBus::unregister_event`]
    pub fn unregister<E: Event>(&self, handler: &Arc<dyn EventHandler>) -> bool {
        self.unregister_event(TypeKey::of::<E>(), handler)
    }

    fn remove_first(&self, key: TypeKey, target: *const ()) -> bool {
        let removed = match self.handlers.get_mut(&key) {
            Some(mut list) => match list
                .iter()
                .position(|weak| std::ptr::addr_eq(weak.as_ptr(), target))
            {
                Some(index) => {
                    list.remove(index);
                    true
                }
                None => false,
            },
            None => false,
        };

        if removed {
            self.handlers.remove_if(&key, |_, list| list.is_empty());
            if self.config.enable_logging {
                debug!(event = key.name(), "Unsubscribed handler");
            }
        }
        removed
    }

    /// Dispatch a typed event
    pub fn send<E: Event>(&self, event: E) -> usize {
        self.send_event(Arc::new(event))
    }

    /// Dispatch `event` to every handler registered for its concrete type.
    ///
    /// Handlers run in registration order on the calling thread. A handler
    /// that returns an error or panics is logged and skipped; the remaining
    /// handlers still run and nothing is reported to the sender. Returns the
    /// number of handlers that completed successfully.
    pub fn send_event(&self, event: EventRef) -> usize {
        let key = event.type_key();

        // Snapshot; the map guard is released before any handler runs
        let snapshot = match self.handlers.get(&key) {
            Some(list) => list.value().clone(),
            None => {
                if self.config.enable_logging {
                    trace!(event = event.event_name(), "No handlers registered");
                }
                return 0;
            }
        };

        if self.config.enable_logging {
            match event.metadata() {
                Some(meta) => debug!(
                    event = event.event_name(),
                    event_id = %meta.id,
                    handlers = snapshot.len(),
                    "Dispatching event"
                ),
                None => debug!(
                    event = event.event_name(),
                    handlers = snapshot.len(),
                    "Dispatching event"
                ),
            }
        }

        let mut delivered = 0;
        let mut dead = 0;
        for weak in &snapshot {
            let Some(handler) = weak.upgrade() else {
                dead += 1;
                continue;
            };

            match invoke(handler.as_ref(), &event) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    if self.config.enable_logging {
                        warn!(event = event.event_name(), error = %e, "Event handler failed");
                    }
                }
            }
        }

        if dead > 0 && self.config.prune_dead_handlers {
            self.prune(key);
        }

        delivered
    }

    fn prune(&self, key: TypeKey) {
        if let Some(mut list) = self.handlers.get_mut(&key) {
            let before = list.len();
            list.retain(|weak| weak.strong_count() > 0);
            if self.config.enable_logging {
                trace!(event = key.name(), pruned = before - list.len(), "Pruned dropped handlers");
            }
        }
        self.handlers.remove_if(&key, |_, list| list.is_empty());
    }

    /// Drop every subscription
    pub fn clear(&self) {
        self.handlers.clear();
        if self.config.enable_logging {
            debug!("Cleared all event handlers");
        }
    }

    /// Subscriptions for `key`, including handlers that have been dropped but
    /// not yet pruned
    pub fn handler_count(&self, key: TypeKey) -> usize {
        self.handlers.get(&key).map(|h| h.len()).unwrap_or(0)
    }

    /// Typed form of [`EventBus::handler_count`]
    pub fn handler_count_of<E: Event>(&self) -> usize {
        self.handler_count(TypeKey::of::<E>())
    }

    /// Event types that currently have at least one subscription
    pub fn event_types(&self) -> Vec<TypeKey> {
        self.handlers.iter().map(|entry| *entry.key()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one handler, turning a panic into an error
fn invoke(handler: &dyn EventHandler, event: &EventRef) -> Result<(), EventHandlerError> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle_event(event))) {
        Ok(result) => result,
        Err(payload) => Err(EventHandlerError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Event bus builder
pub struct EventBusBuilder {
    config: EventBusConfig,
}

impl EventBusBuilder {
    pub fn new() -> Self {
        Self {
            config: EventBusConfig::default(),
        }
    }

    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    pub fn prune_dead_handlers(mut self, enabled: bool) -> Self {
        self.config.prune_dead_handlers = enabled;
        self
    }

    pub fn build(self) -> EventBus {
        EventBus::with_config(self.config)
    }
}

impl Default for EventBusBuilder {
    fn default() -> Self {
        Self::new()
    }
}
