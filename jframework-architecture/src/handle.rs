// Non-owning link from a component back to its architecture

use crate::architecture::Architecture;
use jframework_core::{FrameworkError, FrameworkResult};
use jframework_events::EventHandler;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// Slot a component embeds to reach its owning [`Architecture`].
///
/// Holds only weak references, so a component never keeps its architecture
/// alive. Once the architecture is dropped every capability call on the
/// component fails with [`FrameworkError::ArchitectureNotSet`].
///
/// Event-reacting components (systems, controllers) also get a weak
/// reference to themselves as an [`EventHandler`], which is what
/// `register_event` subscribes.
#[derive(Default)]
pub struct ArchitectureHandle {
    architecture: RwLock<Weak<Architecture>>,
    event_handler: RwLock<Option<Weak<dyn EventHandler>>>,
}

impl ArchitectureHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The owning architecture, if bound and still alive
    pub fn get(&self) -> Option<Arc<Architecture>> {
        self.architecture.read().upgrade()
    }

    pub fn is_bound(&self) -> bool {
        self.architecture.read().strong_count() > 0
    }

    /// Point this handle at `architecture`.
    ///
    /// Returns `Ok(true)` if the handle changed and `Ok(false)` if it was
    /// already bound to `architecture`. A handle bound to a different
    /// architecture that is still alive is rejected with
    /// [`FrameworkError::InvalidArgument`].
    pub fn bind(&self, architecture: &Architecture) -> FrameworkResult<bool> {
        let mut slot = self.architecture.write();
        if let Some(current) = slot.upgrade() {
            if std::ptr::eq(Arc::as_ptr(&current), architecture) {
                return Ok(false);
            }
            return Err(FrameworkError::InvalidArgument(format!(
                "component already belongs to architecture '{}'",
                current.name()
            )));
        }
        *slot = architecture.downgrade();
        Ok(true)
    }

    pub fn unbind(&self) {
        *self.architecture.write() = Weak::new();
    }

    pub fn set_event_handler(&self, handler: Weak<dyn EventHandler>) {
        *self.event_handler.write() = Some(handler);
    }

    /// The component itself as an event handler, if it was bound as one
    pub fn event_handler(&self) -> Option<Weak<dyn EventHandler>> {
        self.event_handler.read().clone()
    }
}

impl fmt::Debug for ArchitectureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.get().map(|arch| arch.name().to_string());
        f.debug_struct("ArchitectureHandle")
            .field("architecture", &name)
            .field("has_event_handler", &self.event_handler.read().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::EmptySetup;
    use crate::config::ArchitectureConfig;
    use jframework_core::ErrorKind;
    use jframework_events::FnEventHandler;

    #[test]
    fn test_unbound_by_default() {
        let handle = ArchitectureHandle::new();
        assert!(!handle.is_bound());
        assert!(handle.get().is_none());
        assert!(handle.event_handler().is_none());
    }

    #[test]
    fn test_bind_same_architecture_twice() {
        let arch = Architecture::new(EmptySetup);
        let handle = ArchitectureHandle::new();

        assert!(handle.bind(&arch).unwrap());
        assert!(!handle.bind(&arch).unwrap());
        assert!(Arc::ptr_eq(&handle.get().unwrap(), &arch));
    }

    #[test]
    fn test_bind_other_live_architecture_rejected() {
        let first = Architecture::with_config(EmptySetup, ArchitectureConfig::new("first"));
        let second = Architecture::with_config(EmptySetup, ArchitectureConfig::new("second"));
        let handle = ArchitectureHandle::new();

        handle.bind(&first).unwrap();
        let err = handle.bind(&second).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("first"));
    }

    #[test]
    fn test_dead_architecture_releases_handle() {
        let handle = ArchitectureHandle::new();
        {
            let arch = Architecture::new(EmptySetup);
            handle.bind(&arch).unwrap();
            assert!(handle.is_bound());
        }
        assert!(!handle.is_bound());

        let next = Architecture::new(EmptySetup);
        assert!(handle.bind(&next).unwrap());
    }

    #[test]
    fn test_unbind() {
        let arch = Architecture::new(EmptySetup);
        let handle = ArchitectureHandle::new();
        handle.bind(&arch).unwrap();
        handle.unbind();
        assert!(handle.get().is_none());
    }

    #[test]
    fn test_event_handler_slot_is_weak() {
        let handle = ArchitectureHandle::new();
        let handler = FnEventHandler::shared(|_| Ok(()));
        handle.set_event_handler(Arc::downgrade(&handler));

        assert!(handle.event_handler().and_then(|w| w.upgrade()).is_some());
        drop(handler);
        assert!(handle.event_handler().and_then(|w| w.upgrade()).is_none());
    }

    #[test]
    fn test_debug_names_architecture() {
        let arch = Architecture::with_config(EmptySetup, ArchitectureConfig::new("shown"));
        let handle = ArchitectureHandle::new();
        handle.bind(&arch).unwrap();
        assert!(format!("{handle:?}").contains("shown"));
    }
}
