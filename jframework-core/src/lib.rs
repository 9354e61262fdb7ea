// Core library for the JFramework application runtime
// Type keys, errors, the component container, lifecycle primitives and logging

pub mod container;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod type_key;

// Re-export commonly used types
pub use container::{ComponentEntry, ComponentKind, Container};
pub use error::*;
pub use lifecycle::{CanInit, InitFlag, LifecycleState};
pub use type_key::TypeKey;
