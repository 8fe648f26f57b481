use std::fmt;

use crate::{ObjectKey, ObjectPool, RefPtr};

/// A non-counting reference to an object in an [`ObjectPool`].
///
/// A weak pointer does not keep its object alive. It can be [upgraded][Self::upgrade] to a
/// counted [`RefPtr`] for as long as the object exists and can detach the object from its owner
/// even when no counted handles to the object remain. This is how an owner that has attached
/// objects refers to them: it holds weak pointers, never counted handles, so that owner and
/// attached objects do not keep each other alive in a cycle.
///
/// # Example
///
/// ```rust
/// use detachable_rc::{ObjectPool, RefPtr};
///
/// let pool = ObjectPool::new();
///
/// let owner = pool.insert("owner");
/// let child = pool.insert("child");
/// RefPtr::set_owner(&child, &owner);
///
/// let weak_child = RefPtr::downgrade(&child);
/// drop(child);
///
/// // The owner keeps the child around while it is attached.
/// assert!(weak_child.is_alive());
///
/// // Once detached, nothing keeps it alive any more.
/// weak_child.detach_from_owner();
/// assert!(!weak_child.is_alive());
/// assert!(weak_child.upgrade().is_none());
/// ```
pub struct WeakPtr<T> {
    pool: ObjectPool<T>,
    key: ObjectKey,
}

impl<T> WeakPtr<T> {
    #[must_use]
    pub(crate) fn new(pool: ObjectPool<T>, key: ObjectKey) -> Self {
        Self { pool, key }
    }

    /// Returns a counted handle to the object, or `None` if it has been destroyed.
    ///
    /// An attached object whose handles have all been dropped is still alive and can be
    /// upgraded; doing so adds a reference to it (and to its owner chain) again.
    #[must_use]
    pub fn upgrade(&self) -> Option<RefPtr<T>> {
        self.pool.get(self.key)
    }

    /// Returns whether the object still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.pool.contains(self.key)
    }

    /// Returns the key of the object in its pool.
    #[must_use]
    pub fn key(&self) -> ObjectKey {
        self.key
    }

    /// Returns the reference count of the object, or zero if it has been destroyed.
    ///
    /// See [`RefPtr::ref_count()`] for what the count includes.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.pool.ref_count(self.key)
    }

    /// Returns whether the object is alive and attached to an owner.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.pool.is_attached(self.key)
    }

    /// Detaches the object from its owner.
    ///
    /// If the object has no handles left, it was only being kept alive by the attachment and is
    /// destroyed immediately. Does nothing if the object is not attached or no longer exists.
    pub fn detach_from_owner(&self) {
        self.pool.detach(self.key);
    }

    /// Returns whether two weak pointers refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ObjectPool::ptr_eq(&self.pool, &other.pool) && self.key == other.key
    }
}

impl<T> Clone for WeakPtr<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            key: self.key,
        }
    }
}

impl<T> fmt::Debug for WeakPtr<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakPtr")
            .field("key", &self.key)
            .field("alive", &self.is_alive())
            .finish()
    }
}
