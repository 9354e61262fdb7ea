// JFramework - an in-process application architecture runtime
//
// Models hold state, systems hold behavior, utilities provide services, and
// commands, queries and events are routed through one Architecture that owns
// an IoC container and a typed event bus. BindableProperty adds observable
// values with scoped unregistration.

// Re-export the member crates
pub use jframework_architecture;
pub use jframework_bindable;
pub use jframework_core;
pub use jframework_events;

pub use jframework_architecture::*;
pub use jframework_bindable::{
    BindableProperty, BindableUnRegister, CustomUnRegister, UnRegister, UnRegisterTrigger,
};
pub use jframework_core::{
    BoxError, CanInit, ComponentKind, Container, ErrorKind, FrameworkError, FrameworkResult,
    InitFlag, LifecycleState, TypeKey, logging,
};
pub use jframework_events::{
    Event, EventBus, EventBusBuilder, EventBusConfig, EventHandler, EventHandlerError,
    EventMetadata, EventRef, FnEventHandler, TypedEventHandler,
};

// Re-export optional crates
#[cfg(feature = "config")]
pub use jframework_config;

#[cfg(feature = "testing")]
pub use jframework_testing;

// Prelude for common imports
pub mod prelude {
    pub use jframework_architecture::prelude::*;
    pub use jframework_bindable::{BindableProperty, UnRegister, UnRegisterTrigger};
    pub use jframework_core::ErrorKind;
    pub use jframework_events::{EventMetadata, TypedEventHandler};

    #[cfg(feature = "config")]
    pub use jframework_config::FrameworkConfig;
}
