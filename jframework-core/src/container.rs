// Dependency injection container, partitioned by component category

use crate::lifecycle::CanInit;
use crate::logging::{debug, trace};
use crate::{FrameworkError, FrameworkResult, TypeKey};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Storage partition a component lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Model,
    System,
    Utility,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::Model,
        ComponentKind::System,
        ComponentKind::Utility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Model => "model",
            ComponentKind::System => "system",
            ComponentKind::Utility => "utility",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered component: the concrete instance plus, for Models and
/// Systems, its lifecycle view.
#[derive(Clone)]
pub struct ComponentEntry {
    key: TypeKey,
    instance: Arc<dyn Any + Send + Sync>,
    lifecycle: Option<Arc<dyn CanInit>>,
    order: u64,
}

impl ComponentEntry {
    /// Entry without lifecycle hooks (utilities)
    pub fn new<T: Any + Send + Sync>(instance: Arc<T>) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            instance,
            lifecycle: None,
            order: 0,
        }
    }

    /// Entry whose init/deinit is driven by the architecture (models, systems)
    pub fn with_lifecycle<T: CanInit + Any>(instance: Arc<T>) -> Self {
        let lifecycle: Arc<dyn CanInit> = instance.clone();
        Self {
            key: TypeKey::of::<T>(),
            instance,
            lifecycle: Some(lifecycle),
            order: 0,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn instance(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.instance
    }

    pub fn lifecycle(&self) -> Option<&Arc<dyn CanInit>> {
        self.lifecycle.as_ref()
    }

    /// Registration sequence number, unique per container
    pub fn order(&self) -> u64 {
        self.order
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.instance.clone().downcast::<T>().ok()
    }

    /// True when both entries hold the same allocation
    pub fn same_instance(&self, other: &ComponentEntry) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("key", &self.key)
            .field("has_lifecycle", &self.lifecycle.is_some())
            .field("order", &self.order)
            .finish()
    }
}

type Partition = Mutex<HashMap<TypeKey, ComponentEntry>>;

/// The component container.
///
/// At most one entry per type per [`ComponentKind`]. Each partition has its
/// own lock, so registering a model never contends with registering a system.
/// Locks are only held for the map operation itself.
pub struct Container {
    models: Partition,
    systems: Partition,
    utilities: Partition,
    sequence: AtomicU64,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating new component container");
        Self {
            models: Mutex::new(HashMap::new()),
            systems: Mutex::new(HashMap::new()),
            utilities: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    fn partition(&self, kind: ComponentKind) -> &Partition {
        match kind {
            ComponentKind::Model => &self.models,
            ComponentKind::System => &self.systems,
            ComponentKind::Utility => &self.utilities,
        }
    }

    /// Store a component under `kind`.
    ///
    /// Fails with [`FrameworkError::ComponentAlreadyRegistered`] if the type is
    /// already present in that partition; the existing entry is left untouched.
    pub fn register(&self, kind: ComponentKind, mut entry: ComponentEntry) -> FrameworkResult<()> {
        let key = entry.key;
        trace!(
            component = key.name(),
            kind = kind.as_str(),
            "Acquiring partition lock for registration"
        );

        let mut partition = self.partition(kind).lock();
        if partition.contains_key(&key) {
            debug!(
                component = key.name(),
                kind = kind.as_str(),
                "Duplicate registration rejected"
            );
            return Err(FrameworkError::ComponentAlreadyRegistered(key.name().to_string()));
        }

        entry.order = self.sequence.fetch_add(1, Ordering::Relaxed);
        partition.insert(key, entry);
        drop(partition);

        debug!(
            component = key.name(),
            kind = kind.as_str(),
            "Component registered in container"
        );
        Ok(())
    }

    /// Look up an entry; absence is `None`, not an error, at this layer
    pub fn get(&self, kind: ComponentKind, key: &TypeKey) -> Option<ComponentEntry> {
        let entry = self.partition(kind).lock().get(key).cloned();
        trace!(
            component = key.name(),
            kind = kind.as_str(),
            found = entry.is_some(),
            "Container lookup"
        );
        entry
    }

    /// Look up and downcast to the concrete type
    pub fn resolve<T: Any + Send + Sync>(&self, kind: ComponentKind) -> Option<Arc<T>> {
        self.get(kind, &TypeKey::of::<T>())
            .and_then(|entry| entry.downcast::<T>())
    }

    /// Snapshot of every entry in a partition, in registration order
    pub fn get_all(&self, kind: ComponentKind) -> Vec<ComponentEntry> {
        let mut entries: Vec<ComponentEntry> =
            self.partition(kind).lock().values().cloned().collect();
        entries.sort_by_key(|entry| entry.order);
        entries
    }

    pub fn contains(&self, kind: ComponentKind, key: &TypeKey) -> bool {
        self.partition(kind).lock().contains_key(key)
    }

    pub fn len(&self, kind: ComponentKind) -> usize {
        self.partition(kind).lock().len()
    }

    pub fn is_empty(&self) -> bool {
        ComponentKind::ALL.iter().all(|kind| self.len(*kind) == 0)
    }

    /// Empty all partitions at once.
    ///
    /// Locks are always taken models -> systems -> utilities.
    pub fn clear(&self) {
        let mut models = self.models.lock();
        let mut systems = self.systems.lock();
        let mut utilities = self.utilities.lock();

        let count = models.len() + systems.len() + utilities.len();
        models.clear();
        systems.clear();
        utilities.clear();

        debug!(component_count = count, "Cleared all components from container");
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
