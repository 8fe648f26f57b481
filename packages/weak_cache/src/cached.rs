use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops::Deref;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::cache::Entries;

/// A shared handle to a value created by a [`WeakCache`][crate::WeakCache].
///
/// Clones share the same value. The value is dropped, and its cache entry removed, when the
/// last handle is dropped.
///
/// The operations are associated functions (called as `Cached::key(&value)`) so that they never
/// shadow methods of the value type.
pub struct Cached<K, V>
where
    K: Eq + Hash,
{
    entry: Rc<CachedEntry<K, V>>,
}

impl<K, V> Cached<K, V>
where
    K: Eq + Hash,
{
    #[must_use]
    pub(crate) fn new(entry: Rc<CachedEntry<K, V>>) -> Self {
        Self { entry }
    }

    /// Returns the key that the value was created for.
    #[must_use]
    pub fn key(this: &Self) -> &K {
        &this.entry.key
    }

    /// Returns whether two handles share the same value.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.entry, &other.entry)
    }

    /// Returns the number of handles that share the value.
    #[must_use]
    pub fn handle_count(this: &Self) -> usize {
        Rc::strong_count(&this.entry)
    }
}

impl<K, V> Clone for Cached<K, V>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            entry: Rc::clone(&self.entry),
        }
    }
}

impl<K, V> Deref for Cached<K, V>
where
    K: Eq + Hash,
{
    type Target = V;

    fn deref(&self) -> &Self::Target {
        &self.entry.value
    }
}

impl<K, V> fmt::Debug for Cached<K, V>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
{
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cached")
            .field("key", &self.entry.key)
            .field("value", &self.entry.value)
            .finish()
    }
}

/// The shared allocation behind [`Cached`] handles.
///
/// This is what the cache refers to weakly. Dropping it removes the entry from the cache.
pub(crate) struct CachedEntry<K, V>
where
    K: Eq + Hash,
{
    key: K,
    value: V,

    /// The map of the cache that created this entry. The cache may be gone by the time the
    /// entry is dropped, in which case there is nothing to remove it from.
    entries: Weak<Entries<K, V>>,
}

impl<K, V> CachedEntry<K, V>
where
    K: Eq + Hash,
{
    #[must_use]
    pub(crate) fn new(key: K, value: V, entries: Weak<Entries<K, V>>) -> Self {
        Self {
            key,
            value,
            entries,
        }
    }
}

impl<K, V> Drop for CachedEntry<K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let Some(entries) = self.entries.upgrade() else {
            return;
        };

        let mut entries = entries.borrow_mut();

        // Only remove the entry if it is still ours. A dead entry cannot have been replaced yet
        // because this runs as soon as the last handle is dropped.
        if entries
            .get(&self.key)
            .is_some_and(|entry| entry.strong_count() == 0)
        {
            entries.remove(&self.key);

            trace!(
                key_hash = entries.hasher().hash_one(&self.key),
                len = entries.len(),
                "cache entry removed"
            );
        }
    }
}
