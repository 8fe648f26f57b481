//! Lifecycle of cache entries as seen through the public API.

use std::cell::Cell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use testing::DropLog;
use weak_cache::{Cached, WeakCache};

#[test]
fn values_are_shared_only_while_in_use() {
    let created = Rc::new(Cell::new(0_u32));
    let counter = Rc::clone(&created);
    let cache = WeakCache::new(move |name: &String| {
        counter.set(counter.get().wrapping_add(1));
        format!("{name}#{}", counter.get())
    });

    let alpha = cache.get(&"alpha".to_string());
    let alpha_again = cache.get(&"alpha".to_string());
    let beta = cache.get(&"beta".to_string());

    assert_eq!(*alpha, "alpha#1");
    assert_eq!(*beta, "beta#2");
    assert!(Cached::ptr_eq(&alpha, &alpha_again));
    assert_eq!(Cached::key(&beta), "beta");
    assert_eq!(cache.len(), 2);

    drop(alpha);
    drop(alpha_again);
    assert_eq!(cache.len(), 1);
    assert!(!cache.contains_key(&"alpha".to_string()));

    let alpha = cache.get(&"alpha".to_string());
    assert_eq!(*alpha, "alpha#3");
    assert_eq!(created.get(), 3);
}

#[test]
fn each_value_is_dropped_once_when_last_handle_goes() {
    let log = DropLog::new();
    let factory_log = log.clone();
    let cache = WeakCache::new(move |key: &u8| {
        factory_log.track(if *key == 0 { "zero" } else { "other" })
    });

    let handles: Vec<_> = (0..4).map(|_| cache.get(&0)).collect();
    let other = cache.get(&1);

    drop(handles);
    assert_eq!(log.events(), vec!["zero"]);
    assert!(cache.contains_key(&1));

    drop(other);
    assert_eq!(log.events(), vec!["zero", "other"]);
    assert!(cache.is_empty());
}

#[test]
fn keys_can_be_shared_objects() {
    struct DataSource {
        name: &'static str,
    }

    // Keyed by the address of a shared data source.
    #[derive(Clone)]
    struct SourceKey(Rc<DataSource>);

    impl PartialEq for SourceKey {
        fn eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.0, &other.0)
        }
    }

    impl Eq for SourceKey {}

    impl Hash for SourceKey {
        fn hash<H: Hasher>(&self, state: &mut H) {
            Rc::as_ptr(&self.0).hash(state);
        }
    }

    let cache = WeakCache::new(|source: &SourceKey| format!("data from {}", source.0.name));

    let first_source = SourceKey(Rc::new(DataSource { name: "first" }));
    let second_source = SourceKey(Rc::new(DataSource { name: "first" }));

    let first = cache.get(&first_source);
    let second = cache.get(&second_source);

    // Equal names, different sources.
    assert!(!Cached::ptr_eq(&first, &second));
    assert_eq!(*first, *second);

    // The cache keeps the keys of values in use alive.
    assert_eq!(Rc::strong_count(&first_source.0), 3);

    drop(first);
    assert_eq!(Rc::strong_count(&first_source.0), 1);
}
