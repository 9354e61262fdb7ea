//! Component lifecycle primitives.
//!
//! Every Model and System carries an [`InitFlag`] and goes through
//! `Uninitialized -> Initialized -> Uninitialized`. The flag is claimed with a
//! compare-exchange, so two threads racing to initialize the same component
//! run its `on_init` at most once.
//!
//! ```
//! use jframework_core::lifecycle::{CanInit, InitFlag};
//! use jframework_core::FrameworkResult;
//!
//! #[derive(Default)]
//! struct Inventory {
//!     flag: InitFlag,
//! }
//!
//! impl CanInit for Inventory {
//!     fn init_flag(&self) -> &InitFlag {
//!         &self.flag
//!     }
//!     fn on_init(&self) -> FrameworkResult<()> {
//!         Ok(())
//!     }
//!     fn on_deinit(&self) -> FrameworkResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! let inventory = Inventory::default();
//! assert!(inventory.init().unwrap());
//! assert!(!inventory.init().unwrap()); // already initialized
//! assert!(inventory.is_initialized());
//! ```

use crate::FrameworkResult;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a component or an architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LifecycleState {
    Uninitialized = 0,
    /// A transition is in progress (init or teardown)
    Initializing = 1,
    Initialized = 2,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LifecycleState::Initializing,
            2 => LifecycleState::Initialized,
            _ => LifecycleState::Uninitialized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initializing => "initializing",
            LifecycleState::Initialized => "initialized",
        }
    }
}

/// Atomic lifecycle state cell
#[derive(Debug)]
pub struct InitFlag {
    state: AtomicU8,
}

impl InitFlag {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Uninitialized as u8),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == LifecycleState::Initialized
    }

    /// Move from `from` to `to` if the flag currently holds `from`
    pub fn transition(&self, from: LifecycleState, to: LifecycleState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn set(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl Default for InitFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Init/deinit contract for Models and Systems
///
/// Implementors supply the flag and the two hooks; `init`/`deinit` are
/// idempotent wrappers that callers (normally the architecture) go through.
pub trait CanInit: Send + Sync {
    fn init_flag(&self) -> &InitFlag;

    fn on_init(&self) -> FrameworkResult<()>;

    fn on_deinit(&self) -> FrameworkResult<()>;

    fn is_initialized(&self) -> bool {
        self.init_flag().is_initialized()
    }

    /// Run `on_init` unless already initialized.
    ///
    /// Returns `Ok(true)` when this call performed the transition. On error
    /// the flag goes back to `Uninitialized`.
    fn init(&self) -> FrameworkResult<bool> {
        let flag = self.init_flag();
        if !flag.transition(LifecycleState::Uninitialized, LifecycleState::Initializing) {
            return Ok(false);
        }

        match self.on_init() {
            Ok(()) => {
                flag.set(LifecycleState::Initialized);
                Ok(true)
            }
            Err(e) => {
                flag.set(LifecycleState::Uninitialized);
                Err(e)
            }
        }
    }

    /// Run `on_deinit` if initialized.
    ///
    /// Returns `Ok(true)` when this call performed the transition. On error
    /// the flag stays `Initialized`.
    fn deinit(&self) -> FrameworkResult<bool> {
        let flag = self.init_flag();
        if !flag.transition(LifecycleState::Initialized, LifecycleState::Initializing) {
            return Ok(false);
        }

        match self.on_deinit() {
            Ok(()) => {
                flag.set(LifecycleState::Uninitialized);
                Ok(true)
            }
            Err(e) => {
                flag.set(LifecycleState::Initialized);
                Err(e)
            }
        }
    }
}
