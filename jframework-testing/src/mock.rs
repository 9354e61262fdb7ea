// Test doubles for handlers, observers and call ordering

use jframework_core::TypeKey;
use jframework_events::{EventHandler, EventHandlerError, EventRef};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Event handler that records every event it receives
#[derive(Default)]
pub struct RecordingHandler {
    received: Mutex<Vec<(TypeKey, String)>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The same handler as a trait object, ready for `register`
    pub fn as_handler(self: &Arc<Self>) -> Arc<dyn EventHandler> {
        self.clone()
    }

    pub fn count(&self) -> usize {
        self.received.lock().len()
    }

    /// Number of received events whose concrete type is `E`
    pub fn count_of<E: 'static>(&self) -> usize {
        let key = TypeKey::of::<E>();
        self.received.lock().iter().filter(|(k, _)| *k == key).count()
    }

    /// Event names in arrival order
    pub fn names(&self) -> Vec<String> {
        self.received.lock().iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn was_called(&self) -> bool {
        !self.received.lock().is_empty()
    }

    pub fn clear(&self) {
        self.received.lock().clear();
    }
}

impl EventHandler for RecordingHandler {
    fn handle_event(&self, event: &EventRef) -> Result<(), EventHandlerError> {
        self.received
            .lock()
            .push((event.type_key(), event.event_name().to_string()));
        Ok(())
    }
}

/// Event handler that always returns an error
pub struct FailingHandler {
    message: String,
    calls: AtomicUsize,
}

impl FailingHandler {
    pub fn new(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn as_handler(self: &Arc<Self>) -> Arc<dyn EventHandler> {
        self.clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EventHandler for FailingHandler {
    fn handle_event(&self, _event: &EventRef) -> Result<(), EventHandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EventHandlerError::HandlerFailed(self.message.clone()))
    }
}

/// Event handler that panics on every event
#[derive(Default)]
pub struct PanickingHandler {
    calls: AtomicUsize,
}

impl PanickingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn as_handler(self: &Arc<Self>) -> Arc<dyn EventHandler> {
        self.clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EventHandler for PanickingHandler {
    fn handle_event(&self, event: &EventRef) -> Result<(), EventHandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("PanickingHandler received {}", event.event_name());
    }
}

/// Ordered, thread-safe call log shared between test components
#[derive(Clone, Default)]
pub struct CallRecorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn was_called(&self, call: &str) -> bool {
        self.calls.lock().iter().any(|c| c == call)
    }

    /// Position of the first occurrence of `call`
    pub fn index_of(&self, call: &str) -> Option<usize> {
        self.calls.lock().iter().position(|c| c == call)
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Collects the values a `BindableProperty` observer is notified with
#[derive(Clone)]
pub struct ValueRecorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> ValueRecorder<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Observer callback that appends every value to this recorder
    pub fn observer(&self) -> impl Fn(&T) + Send + Sync + 'static {
        let values = self.values.clone();
        move |value: &T| values.lock().push(value.clone())
    }

    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }

    pub fn last(&self) -> Option<T> {
        self.values.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl<T: Clone + Send + 'static> Default for ValueRecorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
