use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::ptr::NonNull;

use crate::{AttachError, ObjectKey, ObjectPool, WeakPtr};

/// A counted handle to an object in an [`ObjectPool`].
///
/// Creating a handle (by [`ObjectPool::insert()`], [`Clone::clone()`], [`WeakPtr::upgrade()`] or
/// [`ObjectPool::get()`]) adds a reference to the object; dropping a handle releases it. Moving a
/// handle does neither. To clear a handle early, hold it in an `Option` and
/// [`take()`][Option::take] it.
///
/// Dereferencing gives shared access to the value. The value cannot be borrowed mutably through a
/// handle because other handles may exist; use interior mutability in the value type instead.
///
/// The reference counting and attachment operations are associated functions (called as
/// `RefPtr::set_owner(&item, &owner)`) so that they never shadow methods of the value type. The
/// counting primitives themselves are not exposed at all: the only way to add or remove a
/// reference is to create or drop a handle.
///
/// Two handles compare equal if they point to the same object.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
///
/// use detachable_rc::{ObjectPool, RefPtr};
///
/// let pool = ObjectPool::new();
///
/// let counter = pool.insert(Cell::new(0));
/// let alias = counter.clone();
///
/// alias.set(alias.get() + 1);
///
/// assert_eq!(counter.get(), 1);
/// assert_eq!(counter, alias);
/// assert_eq!(RefPtr::ref_count(&counter), 2);
/// ```
pub struct RefPtr<T> {
    pool: ObjectPool<T>,
    key: ObjectKey,

    /// The value never moves while the object exists, and the object exists at least as long as
    /// this handle because the handle holds a reference to it.
    ptr: NonNull<T>,
}

impl<T> RefPtr<T> {
    /// Takes a new reference to a live object.
    #[must_use]
    pub(crate) fn acquire(pool: ObjectPool<T>, key: ObjectKey, ptr: NonNull<T>) -> Self {
        pool.add_ref(key);

        Self { pool, key, ptr }
    }

    /// Returns the key of the object in its pool.
    #[must_use]
    pub fn key(this: &Self) -> ObjectKey {
        this.key
    }

    /// Returns the pool that the object lives in.
    #[must_use]
    pub fn pool(this: &Self) -> &ObjectPool<T> {
        &this.pool
    }

    /// Returns the reference count of the object.
    ///
    /// While other objects are attached to this one, their counts are included: this is the
    /// number of handles that keep the object alive, not the number of handles that point to it.
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
    /// assert_eq!(RefPtr::ref_count(&child), 1);
    /// assert_eq!(RefPtr::ref_count(&owner), 2);
    /// ```
    #[must_use]
    pub fn ref_count(this: &Self) -> usize {
        this.pool.ref_count(this.key)
    }

    /// Returns whether two handles point to the same object.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.ptr == other.ptr
    }

    /// Returns the address of the value.
    #[must_use]
    pub fn as_ptr(this: &Self) -> *const T {
        this.ptr.as_ptr()
    }

    /// Creates a non-counting reference to the object.
    #[must_use]
    pub fn downgrade(this: &Self) -> WeakPtr<T> {
        WeakPtr::new(this.pool.clone(), this.key)
    }

    /// Attaches the object to `owner`, so that the owner is kept alive for as long as the object
    /// has references.
    ///
    /// From now on, every reference added to or released from the object is also added to or
    /// released from the owner (and from the owner's own owner, and so on). The object's current
    /// count is transferred to the owner immediately.
    ///
    /// While attached, the object is not destroyed when its own last handle is dropped. Instead,
    /// it stays alive until either it is detached (see [`detach_from_owner()`][1]) or the owner
    /// is destroyed, in which case all objects still attached to the owner are destroyed just
    /// before the owner itself.
    ///
    /// # Errors
    ///
    /// Returns an error and changes nothing if the object already has an owner, if `owner` is
    /// the object itself or is attached (directly or indirectly) to the object, or if `owner`
    /// belongs to a different pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use detachable_rc::{AttachError, ObjectPool, RefPtr};
    ///
    /// let pool = ObjectPool::new();
    ///
    /// let first = pool.insert("first");
    /// let second = pool.insert("second");
    /// let child = pool.insert("child");
    ///
    /// RefPtr::try_set_owner(&child, &first).unwrap();
    ///
    /// let error = RefPtr::try_set_owner(&child, &second).unwrap_err();
    /// assert!(matches!(error, AttachError::AlreadyAttached { .. }));
    /// ```
    ///
    /// [1]: Self::detach_from_owner
    pub fn try_set_owner(this: &Self, owner: &Self) -> Result<(), AttachError> {
        if !ObjectPool::ptr_eq(&this.pool, &owner.pool) {
            return Err(AttachError::ForeignPool);
        }

        this.pool.set_owner(this.key, owner.key)
    }

    /// Attaches the object to `owner`. See [`try_set_owner()`][Self::try_set_owner] for the
    /// semantics.
    ///
    /// # Panics
    ///
    /// Panics if the attachment is not allowed. Attaching an object that is already attached is
    /// a usage error that would corrupt the ownership graph if it were silently ignored.
    pub fn set_owner(this: &Self, owner: &Self) {
        if let Err(error) = Self::try_set_owner(this, owner) {
            panic!("invalid object attachment: {error}");
        }
    }

    /// Detaches the object from its owner. Does nothing if the object is not attached.
    ///
    /// The object's count is removed from the former owner chain, which may destroy the former
    /// owner if nothing else keeps it alive.
    ///
    /// To detach an object that has no handles left, use [`WeakPtr::detach_from_owner()`].
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
    /// let owner_key = RefPtr::key(&owner);
    /// drop(owner);
    /// assert!(pool.contains(owner_key));
    ///
    /// // Nothing else keeps the owner alive once the child leaves.
    /// RefPtr::detach_from_owner(&child);
    /// assert!(!pool.contains(owner_key));
    /// ```
    pub fn detach_from_owner(this: &Self) {
        this.pool.detach(this.key);
    }

    /// Returns whether the object is attached to an owner.
    #[must_use]
    pub fn is_attached(this: &Self) -> bool {
        this.pool.is_attached(this.key)
    }

    /// Returns a non-counting reference to the owner of the object, if it has one.
    #[must_use]
    pub fn owner(this: &Self) -> Option<WeakPtr<T>> {
        this.pool.owner(this.key)
    }

    /// Returns non-counting references to the objects attached to this one, in the order they
    /// were attached.
    #[must_use]
    pub fn children(this: &Self) -> Vec<WeakPtr<T>> {
        this.pool.children(this.key)
    }
}

impl<T> Clone for RefPtr<T> {
    fn clone(&self) -> Self {
        Self::acquire(self.pool.clone(), self.key, self.ptr)
    }
}

impl<T> Drop for RefPtr<T> {
    fn drop(&mut self) {
        self.pool.release(self.key);
    }
}

impl<T> Deref for RefPtr<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: This handle holds a reference, so the object has not been destroyed and its
        // value is still at this address. The pool never creates references to values.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> PartialEq for RefPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T> Eq for RefPtr<T> {}

impl<T> Hash for RefPtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr.hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for RefPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefPtr")
            .field("key", &self.key)
            .field("value", &**self)
            .finish()
    }
}

impl<T> fmt::Pointer for RefPtr<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.ptr, f)
    }
}
