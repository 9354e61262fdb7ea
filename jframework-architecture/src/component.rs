//! Component contracts
//!
//! | Contract | Registered | Lifecycle | Receives events |
//! |----------|------------|-----------|-----------------|
//! | [`Model`] | yes | init/deinit | no |
//! | [`System`] | yes | init/deinit | yes |
//! | [`Utility`] | yes | none | no |
//! | [`Controller`] | no, bound | none | yes |
//! | [`Command`] | no, sent once | none | no |
//! | [`Query`] | no, sent once | none | no |

use crate::architecture::Architecture;
use crate::handle::ArchitectureHandle;
use jframework_core::{CanInit, FrameworkError, FrameworkResult};
use jframework_events::EventHandler;
use std::any::Any;
use std::sync::Arc;

/// A component that reaches back into the architecture it belongs to
pub trait BelongToArchitecture: Send + Sync {
    fn architecture_handle(&self) -> &ArchitectureHandle;

    fn architecture(&self) -> Option<Arc<Architecture>> {
        self.architecture_handle().get()
    }

    /// The owning architecture, or [`FrameworkError::ArchitectureNotSet`]
    /// naming the `requested` type
    fn require_architecture(&self, requested: &str) -> FrameworkResult<Arc<Architecture>> {
        self.architecture()
            .ok_or_else(|| FrameworkError::ArchitectureNotSet(requested.to_string()))
    }
}

/// State holder with an init/deinit lifecycle
pub trait Model: BelongToArchitecture + CanInit + Any {}

/// Behavior with an init/deinit lifecycle that also reacts to events
pub trait System: BelongToArchitecture + CanInit + EventHandler + Any {}

/// Stateless service; never initialized or torn down
pub trait Utility: Any + Send + Sync {}

/// One-shot unit of work with no result
///
/// Sent by value through [`Architecture::send_command`], which binds it and
/// calls `execute` once on the calling thread.
pub trait Command: BelongToArchitecture {
    fn execute(&mut self) -> FrameworkResult<()>;
}

/// One-shot unit of work that computes a value
pub trait Query: BelongToArchitecture {
    type Output;

    fn evaluate(&mut self) -> FrameworkResult<Self::Output>;
}

/// Event-reacting component outside the registry, such as a view
///
/// Bound with [`Architecture::bind_controller`].
pub trait Controller: BelongToArchitecture + EventHandler + Any {}
