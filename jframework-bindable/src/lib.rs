//! Observable properties for JFramework models
//!
//! [`BindableProperty`] holds a value and calls its observers, in
//! registration order, whenever the value changes. Registrations are
//! cancelled through the returned [`BindableUnRegister`] token, either
//! directly or by tying the token to an [`UnRegisterTrigger`] that fires when
//! its owner's scope ends.
//!
//! ```
//! use jframework_bindable::{BindableProperty, UnRegisterTrigger};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI32, Ordering};
//!
//! let health = BindableProperty::new(100);
//! let shown = Arc::new(AtomicI32::new(0));
//!
//! {
//!     let view_scope = UnRegisterTrigger::new();
//!     let label = shown.clone();
//!     health
//!         .register_with_init_value(move |hp| label.store(*hp, Ordering::SeqCst))
//!         .unregister_when_dropped(&view_scope);
//!
//!     health.set_value(80);
//!     assert_eq!(shown.load(Ordering::SeqCst), 80);
//! }
//!
//! // The view scope ended; its observer is gone
//! health.set_value(50);
//! assert_eq!(shown.load(Ordering::SeqCst), 80);
//! ```

pub mod property;
pub mod unregister;

pub use property::{BindableProperty, BindableUnRegister};
pub use unregister::{CustomUnRegister, UnRegister, UnRegisterTrigger};
