//! Testing utilities for JFramework applications.
//!
//! - [`RecordingHandler`], [`FailingHandler`], [`PanickingHandler`] - event
//!   handler doubles
//! - [`CallRecorder`] - ordered call log for lifecycle assertions
//! - [`ValueRecorder`] - captures `BindableProperty` notifications
//! - [`assert_error_kind!`] and the functions in [`assertions`]
//!
//! ```
//! use jframework_events::{Event, EventBus};
//! use jframework_testing::*;
//!
//! struct Saved;
//! impl Event for Saved {}
//!
//! let bus = EventBus::new();
//! let recorder = RecordingHandler::new();
//! bus.register::<Saved>(&recorder.as_handler());
//! bus.send(Saved);
//!
//! assert_received::<Saved>(&recorder, 1);
//! ```

pub mod assertions;
pub mod mock;

pub use assertions::*;
pub use mock::{CallRecorder, FailingHandler, PanickingHandler, RecordingHandler, ValueRecorder};
