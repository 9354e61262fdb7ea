use jframework_core::{
    CanInit, ComponentEntry, ComponentKind, Container, ErrorKind, FrameworkResult, InitFlag,
    TypeKey,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[derive(Default)]
struct ScoreModel {
    flag: InitFlag,
    score: AtomicUsize,
}

impl CanInit for ScoreModel {
    fn init_flag(&self) -> &InitFlag {
        &self.flag
    }

    fn on_init(&self) -> FrameworkResult<()> {
        self.score.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn on_deinit(&self) -> FrameworkResult<()> {
        Ok(())
    }
}

struct Storage {
    prefix: String,
}

#[test]
fn test_register_and_resolve() {
    let container = Container::new();
    container
        .register(
            ComponentKind::Utility,
            ComponentEntry::new(Arc::new(Storage {
                prefix: "save_".to_string(),
            })),
        )
        .unwrap();

    let storage = container.resolve::<Storage>(ComponentKind::Utility).unwrap();
    assert_eq!(storage.prefix, "save_");
}

#[test]
fn test_resolve_nonexistent() {
    let container = Container::new();
    assert!(container.resolve::<Storage>(ComponentKind::Utility).is_none());
}

#[test]
fn test_singleton_behavior() {
    let container = Container::new();
    container
        .register(
            ComponentKind::Model,
            ComponentEntry::with_lifecycle(Arc::new(ScoreModel::default())),
        )
        .unwrap();

    let first = container.resolve::<ScoreModel>(ComponentKind::Model).unwrap();
    let second = container.resolve::<ScoreModel>(ComponentKind::Model).unwrap();
    first.score.store(7, Ordering::SeqCst);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.score.load(Ordering::SeqCst), 7);
}

#[test]
fn test_duplicate_error_kind_and_message() {
    let container = Container::new();
    let entry = || ComponentEntry::new(Arc::new(Storage {
        prefix: String::new(),
    }));
    container.register(ComponentKind::Utility, entry()).unwrap();

    let err = container.register(ComponentKind::Utility, entry()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ComponentAlreadyRegistered);
    assert!(err.to_string().contains("Storage"));
}

#[test]
fn test_same_type_in_two_categories() {
    let container = Container::new();
    container
        .register(
            ComponentKind::Model,
            ComponentEntry::with_lifecycle(Arc::new(ScoreModel::default())),
        )
        .unwrap();
    container
        .register(
            ComponentKind::System,
            ComponentEntry::with_lifecycle(Arc::new(ScoreModel::default())),
        )
        .unwrap();

    let model = container.resolve::<ScoreModel>(ComponentKind::Model).unwrap();
    let system = container.resolve::<ScoreModel>(ComponentKind::System).unwrap();
    assert!(!Arc::ptr_eq(&model, &system));
}

#[test]
fn test_lifecycle_view_shares_instance() {
    let container = Container::new();
    let model = Arc::new(ScoreModel::default());
    container
        .register(ComponentKind::Model, ComponentEntry::with_lifecycle(model.clone()))
        .unwrap();

    let entry = container
        .get(ComponentKind::Model, &TypeKey::of::<ScoreModel>())
        .unwrap();
    entry.lifecycle().unwrap().init().unwrap();

    assert!(model.is_initialized());
}

#[test]
fn test_concurrent_registration_single_winner() {
    let container = Arc::new(Container::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = Arc::clone(&container);
            thread::spawn(move || {
                container
                    .register(
                        ComponentKind::Model,
                        ComponentEntry::with_lifecycle(Arc::new(ScoreModel::default())),
                    )
                    .is_ok()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(container.len(ComponentKind::Model), 1);
}

#[test]
fn test_concurrent_registration_across_categories() {
    let container = Arc::new(Container::new());

    let models = {
        let container = Arc::clone(&container);
        thread::spawn(move || {
            container.register(
                ComponentKind::Model,
                ComponentEntry::with_lifecycle(Arc::new(ScoreModel::default())),
            )
        })
    };
    let utilities = {
        let container = Arc::clone(&container);
        thread::spawn(move || {
            container.register(
                ComponentKind::Utility,
                ComponentEntry::new(Arc::new(Storage {
                    prefix: String::new(),
                })),
            )
        })
    };

    assert!(models.join().unwrap().is_ok());
    assert!(utilities.join().unwrap().is_ok());
    assert!(!container.is_empty());

    container.clear();
    assert!(container.is_empty());
}
