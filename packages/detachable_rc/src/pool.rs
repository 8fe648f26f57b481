use std::cell::RefCell;
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::{ObjectKey, ObjectPoolBuilder, RawObjectPool, RefPtr, Result, WeakPtr};

/// A single-threaded arena of reference-counted objects that can be attached to each other.
///
/// This type acts as a cloneable handle to shared pool state. Every [`RefPtr`] and [`WeakPtr`]
/// also holds such a handle, so the pool stays alive for as long as anything refers to it.
///
/// Objects are inserted with [`insert()`][Self::insert], which returns the first counted handle
/// to the new object. An object is destroyed (its value dropped and its slot vacated) when its
/// last handle is released, with one exception: an object that is attached to an owner is kept
/// until it is detached or until its owner is destroyed. See [`RefPtr::set_owner()`] for the
/// attachment rules.
///
/// # Single-threaded design
///
/// This type is designed for single-threaded use and is neither [`Send`] nor [`Sync`]. Callers
/// that need to share objects between threads must bring their own synchronization around the
/// whole pool.
///
/// # Example
///
/// ```rust
/// use detachable_rc::ObjectPool;
///
/// let pool = ObjectPool::new();
///
/// let greeting = pool.insert("hello".to_string());
/// let copy = greeting.clone();
/// assert_eq!(pool.len(), 1);
///
/// drop(greeting);
/// assert_eq!(*copy, "hello");
///
/// drop(copy);
/// assert!(pool.is_empty());
/// ```
pub struct ObjectPool<T> {
    inner: Rc<RefCell<RawObjectPool<T>>>,
}

impl<T> ObjectPool<T> {
    #[must_use]
    pub(crate) fn from_raw(pool: RawObjectPool<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(pool)),
        }
    }

    /// Creates a new [`ObjectPool`] with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for creating an [`ObjectPool`] with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use detachable_rc::ObjectPool;
    ///
    /// let pool = ObjectPool::<u64>::builder().capacity(100).build();
    /// ```
    pub fn builder() -> ObjectPoolBuilder<T> {
        ObjectPoolBuilder::new()
    }

    /// Inserts a value into the pool and returns the first handle to it.
    ///
    /// The value is dropped when the object is destroyed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use detachable_rc::{ObjectPool, RefPtr};
    ///
    /// let pool = ObjectPool::new();
    ///
    /// let item = pool.insert(vec![1, 2, 3]);
    ///
    /// assert_eq!(item.len(), 3);
    /// assert_eq!(RefPtr::ref_count(&item), 1);
    /// ```
    pub fn insert(&self, value: T) -> RefPtr<T> {
        let (key, ptr) = {
            let mut pool = self.inner.borrow_mut();

            let key = pool.insert(value);
            let ptr = pool
                .value_ptr(key)
                .expect("object was inserted a moment ago and nothing can have released it");

            (key, ptr)
        };

        RefPtr::acquire(self.clone(), key, ptr)
    }

    /// Returns a new handle to the object identified by `key`, if it still exists.
    ///
    /// This also succeeds for an attached object that has no handles left but is being kept
    /// alive by its attachment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use detachable_rc::{ObjectPool, RefPtr};
    ///
    /// let pool = ObjectPool::new();
    ///
    /// let item = pool.insert(5_u8);
    /// let key = RefPtr::key(&item);
    ///
    /// let same = pool.get(key).unwrap();
    /// assert!(RefPtr::ptr_eq(&item, &same));
    ///
    /// drop(item);
    /// drop(same);
    /// assert!(pool.get(key).is_none());
    /// ```
    #[must_use]
    pub fn get(&self, key: ObjectKey) -> Option<RefPtr<T>> {
        let ptr = self.value_ptr(key)?;

        Some(RefPtr::acquire(self.clone(), key, ptr))
    }

    /// Returns the number of objects currently alive in the pool.
    ///
    /// This includes attached objects that have no handles left but are being kept alive by
    /// their attachment.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns whether the pool has no objects in it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Returns the number of objects the pool can hold before it needs to grow its storage.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity()
    }

    /// Ensures that at least `additional` more objects can be inserted without growing the
    /// storage of the pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use detachable_rc::ObjectPool;
    ///
    /// let pool = ObjectPool::new();
    /// let _first = pool.insert(1_u8);
    ///
    /// pool.reserve(10);
    /// assert!(pool.capacity() >= 11);
    /// ```
    pub fn reserve(&self, additional: usize) {
        self.inner.borrow_mut().reserve(additional);
    }

    /// Returns whether the object identified by `key` still exists.
    #[must_use]
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.inner.borrow().contains(key)
    }

    /// Returns whether two pool handles refer to the same pool.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.inner, &other.inner)
    }

    pub(crate) fn add_ref(&self, key: ObjectKey) {
        self.inner.borrow_mut().add_ref(key);
    }

    pub(crate) fn release(&self, key: ObjectKey) {
        let graveyard = self.inner.borrow_mut().release(key);

        // The values may themselves hold handles into this pool, so they are dropped only after
        // the borrow above has ended.
        drop(graveyard);
    }

    pub(crate) fn set_owner(&self, object: ObjectKey, owner: ObjectKey) -> Result<()> {
        self.inner.borrow_mut().set_owner(object, owner)
    }

    pub(crate) fn detach(&self, object: ObjectKey) {
        let graveyard = self.inner.borrow_mut().detach(object);

        drop(graveyard);
    }

    pub(crate) fn ref_count(&self, key: ObjectKey) -> usize {
        self.inner.borrow().ref_count(key)
    }

    pub(crate) fn owner(&self, key: ObjectKey) -> Option<WeakPtr<T>> {
        let owner = self.inner.borrow().owner(key)?;

        Some(WeakPtr::new(self.clone(), owner))
    }

    pub(crate) fn children(&self, key: ObjectKey) -> Vec<WeakPtr<T>> {
        let children = self.inner.borrow().children(key);

        children
            .into_iter()
            .map(|child| WeakPtr::new(self.clone(), child))
            .collect()
    }

    pub(crate) fn is_attached(&self, key: ObjectKey) -> bool {
        self.inner.borrow().owner(key).is_some()
    }

    fn value_ptr(&self, key: ObjectKey) -> Option<NonNull<T>> {
        self.inner.borrow().value_ptr(key)
    }
}

impl<T> Clone for ObjectPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ObjectPool");

        // The pool may be mid-operation if this is called from a value's drop logic.
        match self.inner.try_borrow() {
            Ok(pool) => debug.field("len", &pool.len()),
            Err(_) => debug.field("len", &"<borrowed>"),
        };

        debug.finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::mem;

    use static_assertions::assert_not_impl_any;
    use testing::DropLog;

    use super::*;

    assert_not_impl_any!(ObjectPool<u32>: Send, Sync);

    #[test]
    fn insert_and_access() {
        let pool = ObjectPool::new();

        let number = pool.insert(42_u32);
        let other = pool.insert(7_u32);

        assert_eq!(*number, 42);
        assert_eq!(*other, 7);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn clones_share_the_pool() {
        let pool = ObjectPool::new();
        let pool_clone = pool.clone();

        let _item = pool_clone.insert("test");

        assert_eq!(pool.len(), 1);
        assert!(ObjectPool::ptr_eq(&pool, &pool_clone));
        assert!(!ObjectPool::ptr_eq(&pool, &ObjectPool::new()));
    }

    #[test]
    fn objects_keep_pool_alive() {
        let log = DropLog::new();

        let item = {
            let pool = ObjectPool::new();
            pool.insert(log.track("item"))
        };

        assert_eq!(RefPtr::pool(&item).len(), 1);

        drop(item);
        assert_eq!(log.events(), vec!["item"]);
    }

    #[test]
    fn get_by_key_returns_counted_handle() {
        let pool = ObjectPool::new();

        let item = pool.insert(1_u8);
        let key = RefPtr::key(&item);

        let second = pool.get(key).unwrap();
        assert_eq!(RefPtr::ref_count(&item), 2);

        drop(item);
        assert!(pool.contains(key));

        drop(second);
        assert!(!pool.contains(key));
        assert!(pool.get(key).is_none());
    }

    #[test]
    fn value_drop_may_release_handles_into_same_pool() {
        struct Holder {
            _held: Option<RefPtr<Holder>>,
        }

        let pool = ObjectPool::new();

        let inner = pool.insert(Holder { _held: None });
        let outer = pool.insert(Holder {
            _held: Some(inner),
        });
        assert_eq!(pool.len(), 2);

        // Dropping the outer value releases the inner handle while the pool is being updated.
        drop(outer);

        assert!(pool.is_empty());
    }

    #[test]
    fn reserved_capacity_is_used_before_growing() {
        let pool = ObjectPool::builder().capacity(4).build();
        let capacity = pool.capacity();
        assert!(capacity >= 4);

        let items: Vec<_> = (0..4_u32).map(|i| pool.insert(i)).collect();
        assert_eq!(pool.capacity(), capacity);

        drop(items);
        pool.reserve(4);
        assert_eq!(pool.capacity(), capacity);

        let _fifth = pool.insert(5);
        pool.reserve(8);
        assert!(pool.capacity() >= 9);
    }

    #[test]
    fn leaked_handle_keeps_pool_and_value_alive() {
        let log = DropLog::new();
        let pool = ObjectPool::new();

        let leaked = pool.insert(log.track("leaked"));
        let weak = RefPtr::downgrade(&leaked);
        mem::forget(leaked);
        drop(pool);

        // The forgotten handle still holds the pool, so nothing is ever dropped.
        assert!(weak.is_alive());
        assert_eq!(weak.ref_count(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn debug_reports_length() {
        let pool = ObjectPool::new();
        let _item = pool.insert(1_u8);

        let text = format!("{pool:?}");

        assert!(text.contains("len: 1"));
    }
}
