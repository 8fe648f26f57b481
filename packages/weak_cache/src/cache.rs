use std::cell::RefCell;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::rc::{Rc, Weak};

use foldhash::{HashMap, HashMapExt};
use tracing::trace;

use crate::Cached;
use crate::cached::CachedEntry;

pub(crate) type Entries<K, V> = RefCell<HashMap<K, Weak<CachedEntry<K, V>>>>;

/// Creates values by key on demand and shares each value for as long as it is in use.
///
/// The cache itself never keeps a value alive. See the crate documentation for the lifecycle of
/// an entry.
///
/// The factory is called without any internal borrow held, so it may itself use the cache. The
/// same is true for the drop logic of cached values.
///
/// # Example
///
/// ```rust
/// use weak_cache::WeakCache;
///
/// let cache = WeakCache::new(|id: &u32| id * 10);
///
/// let value = cache.get(&4);
/// assert_eq!(*value, 40);
/// assert!(cache.contains_key(&4));
///
/// drop(value);
/// assert!(!cache.contains_key(&4));
/// ```
pub struct WeakCache<K, V>
where
    K: Eq + Hash,
{
    // Entries hold a weak reference back to this map so they can remove themselves when dropped.
    entries: Rc<Entries<K, V>>,

    factory: Box<dyn Fn(&K) -> V>,
}

impl<K, V> WeakCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty cache that uses `factory` to create the value for a key that is not in
    /// use.
    #[must_use]
    pub fn new(factory: impl Fn(&K) -> V + 'static) -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
            factory: Box::new(factory),
        }
    }

    /// Returns the value for `key`, creating it if no value for the key is currently in use.
    pub fn get(&self, key: &K) -> Cached<K, V> {
        let (existing, key_hash) = {
            let entries = self.entries.borrow();

            (
                entries.get(key).and_then(Weak::upgrade),
                entries.hasher().hash_one(key),
            )
        };

        if let Some(entry) = existing {
            trace!(key_hash, handles = Rc::strong_count(&entry), "cache hit");
            return Cached::new(entry);
        }

        let value = (self.factory)(key);
        let entry = Rc::new(CachedEntry::new(
            key.clone(),
            value,
            Rc::downgrade(&self.entries),
        ));

        let len = {
            let mut entries = self.entries.borrow_mut();
            entries.insert(key.clone(), Rc::downgrade(&entry));
            entries.len()
        };

        trace!(key_hash, len, "cache miss, value created");

        Cached::new(entry)
    }

    /// Returns whether a value for `key` is currently in use.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries
            .borrow()
            .get(key)
            .is_some_and(|entry| entry.strong_count() > 0)
    }

    /// Returns the number of values currently in use.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns whether no values are currently in use.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<K, V> fmt::Debug for WeakCache<K, V>
where
    K: Eq + Hash,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("WeakCache");

        // A value may be dropped (and thus updating the map) while this is being called.
        match self.entries.try_borrow() {
            Ok(entries) => debug.field("len", &entries.len()),
            Err(_) => debug.field("len", &"<borrowed>"),
        };

        debug.finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;

    use static_assertions::assert_not_impl_any;
    use testing::DropLog;

    use super::*;

    assert_not_impl_any!(WeakCache<u32, u32>: Send, Sync);

    #[test]
    fn same_key_returns_same_value_while_in_use() {
        let cache = WeakCache::new(|key: &u32| key.wrapping_add(1));

        let first = cache.get(&1);
        let second = cache.get(&1);
        let other = cache.get(&2);

        assert!(Cached::ptr_eq(&first, &second));
        assert!(!Cached::ptr_eq(&first, &other));
        assert_eq!(*first, 2);
        assert_eq!(*other, 3);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn entry_is_removed_after_last_handle_drops() {
        let log = DropLog::new();
        let factory_log = log.clone();
        let cache = WeakCache::new(move |_: &&str| factory_log.track("value"));

        let first = cache.get(&"key");
        let second = first.clone();

        drop(first);
        assert!(cache.contains_key(&"key"));
        assert!(log.is_empty());

        drop(second);
        assert!(!cache.contains_key(&"key"));
        assert!(cache.is_empty());
        assert_eq!(log.events(), vec!["value"]);
    }

    #[test]
    fn new_value_is_created_after_previous_one_is_gone() {
        let created = Rc::new(Cell::new(0_usize));
        let counter = Rc::clone(&created);
        let cache = WeakCache::new(move |_: &u8| {
            counter.set(counter.get().wrapping_add(1));
            counter.get()
        });

        let first = cache.get(&0);
        assert_eq!(*first, 1);
        drop(first);

        let second = cache.get(&0);
        assert_eq!(*second, 2);
        assert_eq!(created.get(), 2);
    }

    #[test]
    fn handle_outliving_cache_drops_cleanly() {
        let log = DropLog::new();
        let factory_log = log.clone();
        let cache = WeakCache::new(move |_: &u8| factory_log.track("value"));

        let value = cache.get(&1);
        drop(cache);

        assert!(log.is_empty());
        assert_eq!(value.name(), "value");

        drop(value);
        assert_eq!(log.events(), vec!["value"]);
    }
}
