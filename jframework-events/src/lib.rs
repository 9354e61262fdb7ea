//! Typed in-process event bus for JFramework
//!
//! ## Features
//!
//! - **Exact-type routing** - an event reaches only the handlers registered
//!   for its concrete type
//! - **Referenced handlers** - the bus holds weak references; a dropped
//!   handler is skipped, never called
//! - **Isolation** - a handler that fails or panics does not stop the others
//!   and is never reported to the sender
//! - **Re-entrant** - handlers may send events or (un)register handlers
//!
//! ## Quick Start
//!
//! ```
//! use jframework_events::*;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! struct PlayerDied {
//!     lives_left: u32,
//! }
//!
//! impl Event for PlayerDied {}
//!
//! let bus = EventBus::new();
//! let deaths = Arc::new(AtomicU32::new(0));
//!
//! let counter = deaths.clone();
//! let handler = TypedEventHandler::<PlayerDied, _>::shared(move |event| {
//!     assert!(event.lives_left < 3);
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! bus.register::<PlayerDied>(&handler);
//! bus.send(PlayerDied { lives_left: 2 });
//! assert_eq!(deaths.load(Ordering::SeqCst), 1);
//! ```
//!
//! ## Configuration
//!
//! ```
//! use jframework_events::EventBusBuilder;
//!
//! let bus = EventBusBuilder::new()
//!     .enable_logging(false)        // Silence dispatch logs
//!     .prune_dead_handlers(true)    // Forget handlers that were dropped
//!     .build();
//! ```

pub mod bus;
pub mod event;

pub use bus::{EventBus, EventBusBuilder, EventBusConfig};
pub use event::{
    AsAny, Event, EventHandler, EventHandlerError, EventMetadata, EventRef, FnEventHandler,
    TypedEventHandler,
};
