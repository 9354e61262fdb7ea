//! The architecture mediator
//!
//! An [`Architecture`] owns one component [`Container`] and one [`EventBus`].
//! It wires every registered component back to itself, runs the init/deinit
//! lifecycle and routes commands, queries and events.
//!
//! ## Lifecycle
//!
//! ```text
//!                init_architecture()
//! Uninitialized ────────────────────▶ Initializing ──▶ Initialized
//!       ▲          (setup.init runs,                      │
//!       │           registrations are                     │ deinit()
//!       │           deferred)                             ▼
//!       └──────────────────────────────────────── Initializing
//!          container and bus cleared              (setup.on_deinit,
//!                                                  models, systems)
//! ```
//!
//! While initialized, a newly registered model or system is initialized on
//! the spot. Models are always initialized before systems.

use crate::component::{BelongToArchitecture, Command, Controller, Model, Query, System, Utility};
use crate::config::{ArchitectureConfig, InitFailurePolicy};
use tracing::{debug, info, trace, warn};
use jframework_core::{
    CanInit, ComponentEntry, ComponentKind, Container, FrameworkError, FrameworkResult, InitFlag,
    LifecycleState, TypeKey,
};
use jframework_events::{Event, EventBus, EventHandler, EventRef};
use std::any::type_name;
use std::fmt;
use std::sync::{Arc, Weak};

/// Composition hook of an application.
///
/// `init` performs the initial registrations. It runs on every transition
/// out of `Uninitialized`, so an architecture that was torn down and
/// initialized again is composed again.
pub trait ArchitectureSetup: Send + Sync {
    fn init(&self, architecture: &Architecture) -> FrameworkResult<()>;

    /// Runs at the start of [`Architecture::deinit`], before any component is torn down
    fn on_deinit(&self, _architecture: &Architecture) -> FrameworkResult<()> {
        Ok(())
    }
}

impl<F> ArchitectureSetup for F
where
    F: Fn(&Architecture) -> FrameworkResult<()> + Send + Sync,
{
    fn init(&self, architecture: &Architecture) -> FrameworkResult<()> {
        self(architecture)
    }
}

/// Setup that registers nothing; components are added from outside
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySetup;

impl ArchitectureSetup for EmptySetup {
    fn init(&self, _architecture: &Architecture) -> FrameworkResult<()> {
        Ok(())
    }
}

pub struct Architecture {
    config: ArchitectureConfig,
    container: Container,
    event_bus: EventBus,
    state: InitFlag,
    setup: Box<dyn ArchitectureSetup>,
    self_ref: Weak<Architecture>,
}

impl Architecture {
    /// Create an architecture with the default configuration
    pub fn new(setup: impl ArchitectureSetup + 'static) -> Arc<Self> {
        Self::with_config(setup, ArchitectureConfig::default())
    }

    pub fn with_config(
        setup: impl ArchitectureSetup + 'static,
        config: ArchitectureConfig,
    ) -> Arc<Self> {
        debug!(architecture = %config.name, "Creating architecture");
        let event_bus = EventBus::with_config(config.event_bus.clone());
        Arc::new_cyclic(|self_ref| Self {
            config,
            container: Container::new(),
            event_bus,
            state: InitFlag::new(),
            setup: Box::new(setup),
            self_ref: self_ref.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ArchitectureConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state.state()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) fn downgrade(&self) -> Weak<Architecture> {
        self.self_ref.clone()
    }

    // ========== Registration ==========

    /// Register a model, binding it to this architecture.
    ///
    /// Fails with `ComponentAlreadyRegistered` if a model of type `M` is
    /// present, or `InvalidArgument` if `model` belongs to another live
    /// architecture. When the architecture is already initialized the model
    /// is initialized before this returns; if that fails the model stays
    /// registered but uninitialized.
    pub fn register_model<M: Model>(&self, model: Arc<M>) -> FrameworkResult<()> {
        let entry = ComponentEntry::with_lifecycle(model.clone());
        self.register_bound(ComponentKind::Model, &*model, entry)
    }

    /// Register a system, binding it to this architecture and recording it as
    /// its own event handler. Same rules as [`Architecture::register_model`].
    pub fn register_system<S: System>(&self, system: Arc<S>) -> FrameworkResult<()> {
        let handler: Arc<dyn EventHandler> = system.clone();
        system.architecture_handle().set_event_handler(Arc::downgrade(&handler));

        let entry = ComponentEntry::with_lifecycle(system.clone());
        self.register_bound(ComponentKind::System, &*system, entry)
    }

    pub fn register_utility<U: Utility>(&self, utility: Arc<U>) -> FrameworkResult<()> {
        self.container
            .register(ComponentKind::Utility, ComponentEntry::new(utility))?;
        debug!(
            architecture = %self.config.name,
            component = type_name::<U>(),
            "Registered utility"
        );
        Ok(())
    }

    fn register_bound(
        &self,
        kind: ComponentKind,
        component: &dyn BelongToArchitecture,
        entry: ComponentEntry,
    ) -> FrameworkResult<()> {
        let key = entry.key();
        let handle = component.architecture_handle();
        let newly_bound = handle.bind(self)?;

        if let Err(e) = self.container.register(kind, entry.clone()) {
            if newly_bound {
                handle.unbind();
            }
            return Err(e);
        }

        debug!(
            architecture = %self.config.name,
            component = key.name(),
            kind = kind.as_str(),
            "Registered component"
        );

        // Registrations made while the setup hook runs are picked up by the ordered passes
        if self.state.is_initialized() {
            if let Some(lifecycle) = entry.lifecycle() {
                self.init_component(key, lifecycle)?;
            }
        }
        Ok(())
    }

    /// Bind a controller so it can use its capabilities and subscribe itself
    /// to events. Controllers are not stored in the container.
    pub fn bind_controller<C: Controller>(&self, controller: &Arc<C>) -> FrameworkResult<()> {
        controller.architecture_handle().bind(self)?;
        let handler: Arc<dyn EventHandler> = controller.clone();
        controller
            .architecture_handle()
            .set_event_handler(Arc::downgrade(&handler));
        debug!(
            architecture = %self.config.name,
            controller = type_name::<C>(),
            "Bound controller"
        );
        Ok(())
    }

    // ========== Lookup ==========

    pub fn get_model<M: Model>(&self) -> FrameworkResult<Arc<M>> {
        self.lookup::<M>(ComponentKind::Model)
    }

    pub fn get_system<S: System>(&self) -> FrameworkResult<Arc<S>> {
        self.lookup::<S>(ComponentKind::System)
    }

    pub fn get_utility<U: Utility>(&self) -> FrameworkResult<Arc<U>> {
        self.lookup::<U>(ComponentKind::Utility)
    }

    fn lookup<T: Send + Sync + 'static>(&self, kind: ComponentKind) -> FrameworkResult<Arc<T>> {
        self.container
            .resolve::<T>(kind)
            .ok_or_else(|| FrameworkError::ComponentNotRegistered(type_name::<T>().to_string()))
    }

    pub fn has_model<M: Model>(&self) -> bool {
        self.container.contains(ComponentKind::Model, &TypeKey::of::<M>())
    }

    pub fn has_system<S: System>(&self) -> bool {
        self.container.contains(ComponentKind::System, &TypeKey::of::<S>())
    }

    pub fn has_utility<U: Utility>(&self) -> bool {
        self.container.contains(ComponentKind::Utility, &TypeKey::of::<U>())
    }

    // ========== Commands, queries, events ==========

    /// Bind `command` and execute it on the calling thread.
    ///
    /// Errors from `execute` are returned unchanged. Commands may send
    /// further commands, queries and events while executing.
    pub fn send_command<C: Command>(&self, mut command: C) -> FrameworkResult<()> {
        command.architecture_handle().bind(self)?;
        trace!(architecture = %self.config.name, command = type_name::<C>(), "Executing command");
        command.execute()
    }

    /// Bind `query`, evaluate it on the calling thread and return its result
    pub fn send_query<Q: Query>(&self, mut query: Q) -> FrameworkResult<Q::Output> {
        query.architecture_handle().bind(self)?;
        trace!(architecture = %self.config.name, query = type_name::<Q>(), "Evaluating query");
        query.evaluate()
    }

    /// Dispatch an event to the handlers registered for its type.
    ///
    /// Handler failures never reach the sender.
    pub fn send_event<E: Event>(&self, event: E) {
        self.event_bus.send_event(Arc::new(event));
    }

    pub fn send_event_ref(&self, event: EventRef) {
        self.event_bus.send_event(event);
    }

    pub fn register_event<E: Event>(&self, handler: &Arc<dyn EventHandler>) {
        self.event_bus.register::<E>(handler);
    }

    /// Remove the first subscription of `handler` for `E`
    pub fn unregister_event<E: Event>(&self, handler: &Arc<dyn EventHandler>) -> bool {
        self.event_bus.unregister::<E>(handler)
    }

    // ========== Lifecycle ==========

    /// Compose and initialize the architecture.
    ///
    /// A no-op unless the architecture is `Uninitialized`. Otherwise runs the
    /// setup hook, then initializes every registered model, then every
    /// registered system, each in registration order.
    ///
    /// If the setup hook fails its error is returned and no component is
    /// initialized. If a component fails, the configured
    /// [`InitFailurePolicy`] decides whether the pass stops; either way the
    /// first error is returned. The architecture counts as initialized in
    /// both cases, so a later [`deinit`](Self::deinit) tears down whatever
    /// did come up.
    pub fn init_architecture(&self) -> FrameworkResult<()> {
        if !self
            .state
            .transition(LifecycleState::Uninitialized, LifecycleState::Initializing)
        {
            trace!(architecture = %self.config.name, "Already initialized, skipping");
            return Ok(());
        }

        info!(architecture = %self.config.name, "Initializing architecture");

        let composed = self.setup.init(self);
        self.state.set(LifecycleState::Initialized);
        if let Err(e) = composed {
            warn!(architecture = %self.config.name, error = %e, "Architecture setup failed");
            return Err(e);
        }

        let mut first_error = None;
        for kind in [ComponentKind::Model, ComponentKind::System] {
            for entry in self.container.get_all(kind) {
                let Some(lifecycle) = entry.lifecycle() else {
                    continue;
                };
                if let Err(e) = self.init_component(entry.key(), lifecycle) {
                    match self.config.init_failure {
                        InitFailurePolicy::Abort => return Err(e),
                        InitFailurePolicy::Continue => {
                            first_error.get_or_insert(e);
                        }
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!(architecture = %self.config.name, "Architecture initialized");
                Ok(())
            }
        }
    }

    fn init_component(&self, key: TypeKey, lifecycle: &Arc<dyn CanInit>) -> FrameworkResult<()> {
        match lifecycle.init() {
            Ok(true) => {
                debug!(
                    architecture = %self.config.name,
                    component = key.name(),
                    "Component initialized"
                );
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => {
                warn!(
                    architecture = %self.config.name,
                    component = key.name(),
                    error = %e,
                    "Component initialization failed"
                );
                Err(e)
            }
        }
    }

    /// Tear the architecture down.
    ///
    /// A no-op unless initialized. Runs the setup's `on_deinit`, then
    /// deinitializes every model, then every system, then empties the
    /// container and the event bus. Teardown continues past failures; the
    /// first error is returned once the architecture is blank again.
    ///
    /// A component whose `on_deinit` fails is still marked uninitialized,
    /// so registering it again later runs `on_init` again.
    pub fn deinit(&self) -> FrameworkResult<()> {
        if !self
            .state
            .transition(LifecycleState::Initialized, LifecycleState::Initializing)
        {
            trace!(architecture = %self.config.name, "Not initialized, skipping deinit");
            return Ok(());
        }

        info!(architecture = %self.config.name, "Deinitializing architecture");

        let mut first_error = self.setup.on_deinit(self).err();
        if let Some(e) = &first_error {
            warn!(
                architecture = %self.config.name,
                error = %e,
                "Architecture teardown hook failed"
            );
        }

        for kind in [ComponentKind::Model, ComponentKind::System] {
            for entry in self.container.get_all(kind) {
                let Some(lifecycle) = entry.lifecycle() else {
                    continue;
                };
                match lifecycle.deinit() {
                    Ok(true) => {
                        debug!(
                            architecture = %self.config.name,
                            component = entry.key().name(),
                            "Component deinitialized"
                        );
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!(
                            architecture = %self.config.name,
                            component = entry.key().name(),
                            error = %e,
                            "Component deinitialization failed"
                        );
                        lifecycle.init_flag().set(LifecycleState::Uninitialized);
                        first_error.get_or_insert(e);
                    }
                }
            }
        }

        self.container.clear();
        self.event_bus.clear();
        self.state.set(LifecycleState::Uninitialized);
        info!(architecture = %self.config.name, "Architecture deinitialized");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Architecture")
            .field("name", &self.config.name)
            .field("state", &self.state())
            .field("models", &self.container.len(ComponentKind::Model))
            .field("systems", &self.container.len(ComponentKind::System))
            .field("utilities", &self.container.len(ComponentKind::Utility))
            .finish()
    }
}

impl Drop for Architecture {
    fn drop(&mut self) {
        trace!(architecture = %self.config.name, "Dropping architecture");
    }
}
