//! Architecture mediator for JFramework
//!
//! An application is one [`Architecture`]: models hold state, systems hold
//! behavior and react to events, utilities provide services, and commands
//! and queries are one-shot units of work routed through the architecture.
//! Components reach back into their architecture through a non-owning
//! [`ArchitectureHandle`] and the capability traits in [`capability`].
//!
//! ## Quick Start
//!
//! ```
//! use jframework_architecture::prelude::*;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI32, Ordering};
//!
//! #[derive(Default)]
//! struct CounterModel {
//!     handle: ArchitectureHandle,
//!     flag: InitFlag,
//!     count: AtomicI32,
//! }
//!
//! impl BelongToArchitecture for CounterModel {
//!     fn architecture_handle(&self) -> &ArchitectureHandle {
//!         &self.handle
//!     }
//! }
//!
//! impl CanInit for CounterModel {
//!     fn init_flag(&self) -> &InitFlag {
//!         &self.flag
//!     }
//!     fn on_init(&self) -> FrameworkResult<()> {
//!         self.count.store(0, Ordering::SeqCst);
//!         Ok(())
//!     }
//!     fn on_deinit(&self) -> FrameworkResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! impl Model for CounterModel {}
//!
//! #[derive(Default)]
//! struct IncreaseCommand {
//!     handle: ArchitectureHandle,
//! }
//!
//! impl BelongToArchitecture for IncreaseCommand {
//!     fn architecture_handle(&self) -> &ArchitectureHandle {
//!         &self.handle
//!     }
//! }
//!
//! impl CanGetModel for IncreaseCommand {}
//!
//! impl Command for IncreaseCommand {
//!     fn execute(&mut self) -> FrameworkResult<()> {
//!         self.get_model::<CounterModel>()?.count.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! let app = Architecture::new(|arch: &Architecture| {
//!     arch.register_model(Arc::new(CounterModel::default()))
//! });
//! app.init_architecture()?;
//! app.send_command(IncreaseCommand::default())?;
//!
//! assert_eq!(app.get_model::<CounterModel>()?.count.load(Ordering::SeqCst), 1);
//! # Ok::<(), jframework_core::FrameworkError>(())
//! ```

pub mod architecture;
pub mod capability;
pub mod component;
pub mod config;
pub mod handle;

pub use architecture::{Architecture, ArchitectureSetup, EmptySetup};
pub use capability::{
    CanGetModel, CanGetSystem, CanGetUtility, CanRegisterEvent, CanSendCommand, CanSendEvent,
    CanSendQuery,
};
pub use component::{BelongToArchitecture, Command, Controller, Model, Query, System, Utility};
pub use config::{ArchitectureConfig, InitFailurePolicy};
pub use handle::ArchitectureHandle;

/// Everything needed to define components and run an architecture
pub mod prelude {
    pub use crate::architecture::{Architecture, ArchitectureSetup, EmptySetup};
    pub use crate::capability::*;
    pub use crate::component::*;
    pub use crate::config::{ArchitectureConfig, InitFailurePolicy};
    pub use crate::handle::ArchitectureHandle;
    pub use jframework_core::{CanInit, FrameworkError, FrameworkResult, InitFlag, LifecycleState};
    pub use jframework_events::{Event, EventHandler, EventHandlerError, EventRef};
}
