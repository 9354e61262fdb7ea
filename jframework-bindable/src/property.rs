//! Observable value holder

use crate::unregister::{UnRegister, UnRegisterTrigger};
use parking_lot::{Mutex, ReentrantMutex};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{trace, warn};

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    observers: Vec<Arc<BindableUnRegister<T>>>,
    next_id: u64,
}

/// A value that notifies observers when it changes.
///
/// Cloning yields another handle to the same property, so a clone can be
/// moved into a closure while the owner keeps setting values.
///
/// # Invariants
///
/// 1. [`set_value`](Self::set_value) with a value equal to the current one
///    does nothing.
/// 2. Observers are notified in registration order on the setting thread.
/// 3. Ids are never reused within one property.
/// 4. Notifications are delivered in the order the values were stored. A
///    setter waits for an earlier notification sweep on another thread to
///    finish before it stores its own value.
/// 5. The value lock is not held while an observer runs; observers may read
///    or set the property and register or unregister observers. A set from
///    inside an observer is notified before the outer sweep resumes.
pub struct BindableProperty<T> {
    inner: Arc<Mutex<Inner<T>>>,
    /// Serializes store-and-notify; reentrant so observers can set the value
    notify: Arc<ReentrantMutex<()>>,
}

impl<T> BindableProperty<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                observers: Vec::new(),
                next_id: 0,
            })),
            notify: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// Copy of the current value
    pub fn value(&self) -> T {
        self.inner.lock().value.clone()
    }

    /// Read the current value in place, under the property lock.
    ///
    /// `f` must not touch this property.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.lock().value)
    }

    /// Store `value` and notify observers, unless it equals the current value.
    ///
    /// Blocks while another thread is still notifying observers of this
    /// property. Two properties whose observers set each other from
    /// different threads can therefore deadlock.
    ///
    /// Returns whether the value changed.
    pub fn set_value(&self, value: T) -> bool {
        let _sweep = self.notify.lock();
        let observers = {
            let mut inner = self.inner.lock();
            if inner.value == value {
                return false;
            }
            inner.value = value.clone();
            inner.observers.clone()
        };

        trace!(observers = observers.len(), "Property changed");
        for observer in &observers {
            observer.invoke(&value);
        }
        true
    }

    /// Store `value` without notifying anyone, even if it differs
    pub fn set_value_without_event(&self, value: T) {
        self.inner.lock().value = value;
    }

    /// Observe future changes.
    ///
    /// The observer stays registered until the returned token's
    /// [`unregister`](BindableUnRegister::unregister) runs, directly or
    /// through an [`UnRegisterTrigger`]. Dropping the token does not
    /// unregister.
    pub fn register<F>(&self, on_value_changed: F) -> Arc<BindableUnRegister<T>>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let token = Arc::new(BindableUnRegister {
            id: inner.next_id,
            property: Arc::downgrade(&self.inner),
            callback: Box::new(on_value_changed),
            released: AtomicBool::new(false),
        });
        inner.next_id += 1;
        inner.observers.push(token.clone());
        token
    }

    /// Call `on_value_changed` with the current value now, then [`register`](Self::register) it
    pub fn register_with_init_value<F>(&self, on_value_changed: F) -> Arc<BindableUnRegister<T>>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let current = self.value();
        on_value_changed(&current);
        self.register(on_value_changed)
    }

    /// Remove the observer with `id`; unknown ids are ignored
    pub fn unregister(&self, id: u64) {
        remove_observer(&self.inner, id);
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }
}

fn remove_observer<T>(inner: &Mutex<Inner<T>>, id: u64) {
    // Bind the removed token so it drops after the guard
    let removed = {
        let mut inner = inner.lock();
        inner
            .observers
            .iter()
            .position(|observer| observer.id == id)
            .map(|index| inner.observers.remove(index))
    };
    if let Some(token) = removed {
        token.released.store(true, Ordering::Release);
        trace!(id, "Observer unregistered");
    }
}

impl<T> Clone for BindableProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl<T> Default for BindableProperty<T>
where
    T: Clone + PartialEq + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for BindableProperty<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for BindableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BindableProperty")
            .field("value", &inner.value)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for BindableProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.lock().value.fmt(f)
    }
}

/// Registration token returned by [`BindableProperty::register`].
///
/// Holds the observer id, a weak link back to the property and the
/// callback. The property keeps its own reference, so the observer lives
/// until [`unregister`](Self::unregister) runs.
pub struct BindableUnRegister<T> {
    id: u64,
    property: Weak<Mutex<Inner<T>>>,
    callback: Callback<T>,
    released: AtomicBool,
}

impl<T> BindableUnRegister<T>
where
    T: Send + Sync + 'static,
{
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Run the callback with `value`. A panicking callback is logged and
    /// contained.
    pub fn invoke(&self, value: &T) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(value))) {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            warn!(id = self.id, panic = %message, "Property observer panicked");
        }
    }

    /// Remove the observer from its property; later calls do nothing
    pub fn unregister(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(property) = self.property.upgrade() {
            remove_observer(&property, self.id);
        }
    }

    pub fn is_registered(&self) -> bool {
        !self.released.load(Ordering::Acquire) && self.property.strong_count() > 0
    }

    /// Unregister when `trigger` fires or is dropped
    pub fn unregister_when_dropped(self: &Arc<Self>, trigger: &UnRegisterTrigger) {
        trigger.add_unregister(self.clone());
    }
}

impl<T> UnRegister for BindableUnRegister<T>
where
    T: Send + Sync + 'static,
{
    fn unregister(&self) {
        BindableUnRegister::unregister(self);
    }
}

impl<T> fmt::Debug for BindableUnRegister<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindableUnRegister")
            .field("id", &self.id)
            .field("released", &self.released.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn recorder<T>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync + 'static)
    where
        T: Clone + Send + Sync + 'static,
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v: &T| sink.lock().push(v.clone()))
    }

    #[test]
    fn test_register_and_trigger() {
        let prop = BindableProperty::new(0);
        let (seen, observer) = recorder::<i32>();
        let token = prop.register(observer);

        prop.set_value(42);
        assert_eq!(*seen.lock(), vec![42]);
        token.unregister();
    }

    #[test]
    fn test_equal_value_does_not_notify() {
        let prop = BindableProperty::new(1);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        prop.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(prop.set_value(5));
        assert!(!prop.set_value(5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_value_without_event() {
        let prop = BindableProperty::new(String::from("a"));
        let (seen, observer) = recorder::<String>();
        prop.register(observer);

        prop.set_value_without_event("b".to_string());
        assert_eq!(prop.value(), "b");
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_register_with_init_value() {
        let prop = BindableProperty::new(7);
        let (seen, observer) = recorder::<i32>();
        prop.register_with_init_value(observer);

        prop.set_value(8);
        assert_eq!(*seen.lock(), vec![7, 8]);
    }

    #[test]
    fn test_ids_increase_and_are_not_reused() {
        let prop = BindableProperty::new(0u8);
        let a = prop.register(|_| {});
        let b = prop.register(|_| {});
        a.unregister();
        let c = prop.register(|_| {});

        assert_eq!(a.id(), 0);
        assert_eq!(b.id(), 1);
        assert_eq!(c.id(), 2);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let prop = BindableProperty::new(0);
        let token = prop.register(|_| {});
        assert!(token.is_registered());

        token.unregister();
        token.unregister();
        prop.unregister(token.id());
        assert!(!token.is_registered());
        assert_eq!(prop.observer_count(), 0);
    }

    #[test]
    fn test_unregister_by_id_releases_token() {
        let prop = BindableProperty::new(0);
        let (seen, observer) = recorder::<i32>();
        let token = prop.register(observer);

        prop.unregister(token.id());
        assert!(!token.is_registered());

        prop.set_value(1);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_observer_can_set_property() {
        let prop = BindableProperty::new(0);
        let setter = prop.clone();
        let (seen, sink) = recorder::<i32>();
        prop.register(move |v: &i32| {
            sink(v);
            if *v < 3 {
                setter.set_value(v + 1);
            }
        });

        prop.set_value(1);
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
        assert_eq!(prop.value(), 3);
    }

    #[test]
    fn test_dropping_token_keeps_observer() {
        let prop = BindableProperty::new(0);
        let (seen, observer) = recorder::<i32>();
        drop(prop.register(observer));

        prop.set_value(3);
        assert_eq!(*seen.lock(), vec![3]);
        assert_eq!(prop.observer_count(), 1);
    }

    #[test]
    fn test_panicking_observer_is_isolated() {
        let prop = BindableProperty::new(0);
        let (seen, observer) = recorder::<i32>();
        prop.register(|_| panic!("observer failure"));
        prop.register(observer);

        prop.set_value(1);
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_trigger_unregisters_token() {
        let prop = BindableProperty::new(0);
        let trigger = UnRegisterTrigger::new();
        let (scoped_seen, scoped) = recorder::<i32>();
        let (kept_seen, kept) = recorder::<i32>();

        prop.register(scoped).unregister_when_dropped(&trigger);
        prop.register(kept);

        trigger.unregister();
        prop.set_value(9);

        assert!(scoped_seen.lock().is_empty());
        assert_eq!(*kept_seen.lock(), vec![9]);
    }

    #[test]
    fn test_observer_can_unregister_itself() {
        let prop = BindableProperty::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<Arc<BindableUnRegister<i32>>>>> = Arc::default();

        let counter = calls.clone();
        let me = slot.clone();
        let token = prop.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = me.lock().take() {
                token.unregister();
            }
        });
        *slot.lock() = Some(token);

        prop.set_value(1);
        prop.set_value(2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_observer_can_read_property() {
        let prop = BindableProperty::new(0);
        let reader = prop.clone();
        let (seen, sink) = recorder::<i32>();
        prop.register(move |_| sink(&(reader.value() * 10)));

        prop.set_value(4);
        assert_eq!(*seen.lock(), vec![40]);
    }

    #[test]
    fn test_token_outlives_property() {
        let prop = BindableProperty::new(0);
        let token = prop.register(|_| {});
        drop(prop);

        assert!(!token.is_registered());
        token.unregister();
    }

    #[test]
    fn test_display_and_debug() {
        let prop = BindableProperty::from(12);
        assert_eq!(prop.to_string(), "12");
        assert!(format!("{prop:?}").contains("value: 12"));
    }
}
