//! Capability mixins
//!
//! Each trait adds one way of reaching the owning architecture. They are
//! opt-in: a component states what it may do with empty impls.
//!
//! ```
//! use jframework_architecture::prelude::*;
//!
//! struct RefreshCommand {
//!     handle: ArchitectureHandle,
//! }
//!
//! impl BelongToArchitecture for RefreshCommand {
//!     fn architecture_handle(&self) -> &ArchitectureHandle {
//!         &self.handle
//!     }
//! }
//!
//! impl CanGetModel for RefreshCommand {}
//! impl CanSendEvent for RefreshCommand {}
//! ```
//!
//! The usual sets per component kind:
//!
//! | Component | Capabilities |
//! |-----------|--------------|
//! | Model | `CanSendEvent`, `CanSendQuery`, `CanGetUtility` |
//! | System | `CanGetModel`, `CanGetSystem`, `CanRegisterEvent`, `CanSendEvent`, `CanSendQuery`, `CanGetUtility` |
//! | Command | `CanGetModel`, `CanGetSystem`, `CanSendCommand`, `CanSendEvent`, `CanSendQuery`, `CanGetUtility` |
//! | Query | `CanGetModel`, `CanGetSystem`, `CanSendQuery` |
//! | Controller | all of them |
//!
//! Every call made while the component is not bound to a live architecture
//! fails with [`FrameworkError::ArchitectureNotSet`] naming the requested
//! type.

use crate::component::{BelongToArchitecture, Command, Model, Query, System, Utility};
use jframework_core::{FrameworkError, FrameworkResult, TypeKey};
use jframework_events::Event;
use std::any::type_name;
use std::sync::Arc;

pub trait CanGetModel: BelongToArchitecture {
    fn get_model<M: Model>(&self) -> FrameworkResult<Arc<M>> {
        self.require_architecture(type_name::<M>())?.get_model::<M>()
    }
}

pub trait CanGetSystem: BelongToArchitecture {
    fn get_system<S: System>(&self) -> FrameworkResult<Arc<S>> {
        self.require_architecture(type_name::<S>())?.get_system::<S>()
    }
}

pub trait CanGetUtility: BelongToArchitecture {
    fn get_utility<U: Utility>(&self) -> FrameworkResult<Arc<U>> {
        self.require_architecture(type_name::<U>())?.get_utility::<U>()
    }
}

pub trait CanSendCommand: BelongToArchitecture {
    fn send_command<C: Command>(&self, command: C) -> FrameworkResult<()> {
        self.require_architecture(type_name::<C>())?.send_command(command)
    }
}

pub trait CanSendQuery: BelongToArchitecture {
    fn send_query<Q: Query>(&self, query: Q) -> FrameworkResult<Q::Output> {
        self.require_architecture(type_name::<Q>())?.send_query(query)
    }
}

pub trait CanSendEvent: BelongToArchitecture {
    fn send_event<E: Event>(&self, event: E) -> FrameworkResult<()> {
        self.require_architecture(type_name::<E>())?.send_event(event);
        Ok(())
    }
}

/// Subscribe or unsubscribe the component itself.
///
/// Only systems and bound controllers carry a self handler; on anything
/// else these calls fail with [`FrameworkError::InvalidArgument`].
pub trait CanRegisterEvent: BelongToArchitecture {
    fn register_event<E: Event>(&self) -> FrameworkResult<()> {
        let architecture = self.require_architecture(type_name::<E>())?;
        let handler = self.architecture_handle().event_handler().ok_or_else(|| {
            FrameworkError::InvalidArgument(format!(
                "no event handler bound for {}",
                type_name::<E>()
            ))
        })?;
        architecture
            .event_bus()
            .register_event_weak(TypeKey::of::<E>(), handler)
    }

    /// Returns whether a subscription was removed
    fn unregister_event<E: Event>(&self) -> FrameworkResult<bool> {
        let architecture = self.require_architecture(type_name::<E>())?;
        let handler = self.architecture_handle().event_handler().ok_or_else(|| {
            FrameworkError::InvalidArgument(format!(
                "no event handler bound for {}",
                type_name::<E>()
            ))
        })?;
        Ok(architecture
            .event_bus()
            .unregister_event_weak(TypeKey::of::<E>(), &handler))
    }
}
