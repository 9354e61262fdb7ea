//! Unregister tokens and scope triggers

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Something that can cancel a registration.
///
/// Implementations must be idempotent: a second call is a no-op.
pub trait UnRegister: Send + Sync {
    fn unregister(&self);
}

/// Cancels a group of registrations together.
///
/// Owned by whatever defines the scope (a controller, a view, a test). The
/// collected registrations are cancelled by an explicit [`unregister`] call
/// or, at the latest, when the trigger is dropped.
///
/// [`unregister`]: UnRegisterTrigger::unregister
#[derive(Default)]
pub struct UnRegisterTrigger {
    pending: Mutex<Vec<Arc<dyn UnRegister>>>,
}

impl UnRegisterTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unregister(&self, unregister: Arc<dyn UnRegister>) {
        self.pending.lock().push(unregister);
    }

    /// Cancel everything collected so far and forget it.
    ///
    /// The list is taken out of the lock first, so an `unregister` that adds
    /// to this same trigger does not deadlock.
    pub fn unregister(&self) {
        let pending = std::mem::take(&mut *self.pending.lock());
        if pending.is_empty() {
            return;
        }

        trace!(count = pending.len(), "Trigger cancelling registrations");
        for unregister in pending {
            unregister.unregister();
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl Drop for UnRegisterTrigger {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl fmt::Debug for UnRegisterTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnRegisterTrigger")
            .field("pending", &self.len())
            .finish()
    }
}

/// Closure-backed [`UnRegister`], runs its closure at most once
pub struct CustomUnRegister {
    action: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl CustomUnRegister {
    pub fn new(action: impl FnOnce() + Send + 'static) -> Arc<Self> {
        Arc::new(Self {
            action: Mutex::new(Some(Box::new(action))),
        })
    }
}

impl UnRegister for CustomUnRegister {
    fn unregister(&self) {
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }
}
