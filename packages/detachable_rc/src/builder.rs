use std::fmt;
use std::marker::PhantomData;

use crate::{ObjectPool, RawObjectPool};

/// Builder for creating an instance of [`ObjectPool`].
///
/// All settings are optional; [`ObjectPool::new()`] is equivalent to building with defaults.
///
/// # Examples
///
/// ```
/// use detachable_rc::ObjectPool;
///
/// let pool = ObjectPool::builder().capacity(64).build();
///
/// let item = pool.insert(42_u32);
/// assert_eq!(*item, 42);
/// assert!(pool.capacity() >= 64);
/// ```
#[must_use]
pub struct ObjectPoolBuilder<T> {
    capacity: usize,

    _item: PhantomData<fn() -> T>,
}

impl<T> ObjectPoolBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            _item: PhantomData,
        }
    }

    /// Sets the number of objects the pool can hold before it needs to grow its storage.
    ///
    /// The pool still grows on demand beyond this. Growing never moves existing values, so this
    /// only affects how often the slot storage is reallocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use detachable_rc::ObjectPool;
    ///
    /// let pool = ObjectPool::<String>::builder().capacity(10).build();
    ///
    /// assert!(pool.is_empty());
    /// assert!(pool.capacity() >= 10);
    /// ```
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Creates the pool with the configured settings.
    #[must_use]
    #[inline]
    pub fn build(self) -> ObjectPool<T> {
        ObjectPool::from_raw(RawObjectPool::with_capacity(self.capacity))
    }
}

impl<T> fmt::Debug for ObjectPoolBuilder<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPoolBuilder")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
