//! Event definitions and traits

use chrono::{DateTime, Utc};
use jframework_core::{FrameworkError, TypeKey};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// Shared reference to a dispatched event.
///
/// The sender and every handler that clones it keep the event alive; it is
/// dropped with the last reference.
pub type EventRef = Arc<dyn Event>;

/// Access to the concrete type behind a trait object.
///
/// Implemented for every `'static` type; event types never implement it
/// by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn concrete_type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn concrete_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Event trait
///
/// Events are routed by their concrete runtime type. Two event types never
/// see each other's dispatches, whatever their relationship in user code.
///
/// ```
/// use jframework_events::Event;
///
/// struct ScoreChanged {
///     score: u32,
/// }
///
/// impl Event for ScoreChanged {}
/// ```
pub trait Event: AsAny + Send + Sync {
    /// Diagnostic label, the type name unless overridden
    fn event_name(&self) -> &str {
        self.concrete_type_name()
    }

    /// Optional metadata carried by the event
    fn metadata(&self) -> Option<&EventMetadata> {
        None
    }
}

impl dyn Event {
    /// Dispatch key of the event's concrete type
    pub fn type_key(&self) -> TypeKey {
        TypeKey::from_parts(self.as_any().type_id(), self.concrete_type_name())
    }

    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }

    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

impl std::fmt::Debug for dyn Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.event_name())
            .field("type", &self.concrete_type_name())
            .finish()
    }
}

/// Base event metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event ID
    pub id: Uuid,

    /// Event name/type
    pub name: String,

    /// Timestamp when event was created
    pub timestamp: DateTime<Utc>,

    /// Optional correlation ID for tracing
    pub correlation_id: Option<Uuid>,
}

impl EventMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp: Utc::now(),
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }
}

/// Event handler error
#[derive(Debug, thiserror::Error)]
pub enum EventHandlerError {
    #[error("Handler failed: {0}")]
    HandlerFailed(String),

    #[error("Event processing error: {0}")]
    ProcessingError(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Framework(#[from] FrameworkError),
}

/// Event handler trait
///
/// A handler registered for several event types receives each of them
/// through this one entry point and tells them apart with
/// [`downcast_ref`](trait.Event.html#method.downcast_ref).
pub trait EventHandler: Send + Sync {
    fn handle_event(&self, event: &EventRef) -> Result<(), EventHandlerError>;
}

/// Closure handler, invoked for every event type it is registered for
pub struct FnEventHandler<F> {
    handler: F,
}

impl<F> FnEventHandler<F>
where
    F: Fn(&EventRef) -> Result<(), EventHandlerError> + Send + Sync + 'static,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }

    /// Wrap into the shared form the bus registers
    pub fn shared(handler: F) -> Arc<dyn EventHandler> {
        Arc::new(Self::new(handler))
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&EventRef) -> Result<(), EventHandlerError> + Send + Sync + 'static,
{
    fn handle_event(&self, event: &EventRef) -> Result<(), EventHandlerError> {
        (self.handler)(event)
    }
}

/// Closure handler for a single event type; other types are ignored
pub struct TypedEventHandler<E, F> {
    handler: F,
    _phantom: PhantomData<fn(&E)>,
}

impl<E, F> TypedEventHandler<E, F>
where
    E: Event,
    F: Fn(&E) -> Result<(), EventHandlerError> + Send + Sync + 'static,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }

    pub fn shared(handler: F) -> Arc<dyn EventHandler> {
        Arc::new(Self::new(handler))
    }
}

impl<E, F> EventHandler for TypedEventHandler<E, F>
where
    E: Event,
    F: Fn(&E) -> Result<(), EventHandlerError> + Send + Sync + 'static,
{
    fn handle_event(&self, event: &EventRef) -> Result<(), EventHandlerError> {
        match event.downcast_ref::<E>() {
            Some(typed) => (self.handler)(typed),
            None => Ok(()),
        }
    }
}
