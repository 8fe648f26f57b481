use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::RefCounter;

/// A heap-allocated value combined with its reference count.
///
/// The value lives in its own allocation so that its address stays stable for as long as the
/// object exists, no matter how the arena that tracks it grows. Handles dereference that address
/// directly without going through the arena.
///
/// Reaching zero on [`release_refs()`][Self::release_refs] does not free anything by itself; it
/// is the signal for the caller to relinquish the value via [`into_value()`][Self::into_value].
#[derive(Debug)]
pub(crate) struct RefCounted<T> {
    counter: RefCounter,
    value: NonNull<T>,

    // We own a `T` through the pointer.
    _owns_value: PhantomData<T>,
}

impl<T> RefCounted<T> {
    /// Moves `value` to the heap. The reference count starts at zero; the first handle
    /// created for the object is what brings it to one.
    #[must_use]
    pub(crate) fn new(value: T) -> Self {
        Self {
            counter: RefCounter::new(),
            value: NonNull::from(Box::leak(Box::new(value))),
            _owns_value: PhantomData,
        }
    }

    pub(crate) fn add_refs(&mut self, count: usize) {
        self.counter.increment_by(count);
    }

    /// Returns true if this was the final release, i.e. the count is zero afterwards.
    #[must_use]
    pub(crate) fn release_refs(&mut self, count: usize) -> bool {
        self.counter.decrement_by(count)
    }

    #[must_use]
    pub(crate) fn ref_count(&self) -> usize {
        self.counter.count()
    }

    /// The stable address of the value. Valid until the object is consumed.
    #[must_use]
    pub(crate) fn value_ptr(&self) -> NonNull<T> {
        self.value
    }

    /// Gives up the object, returning ownership of the value so that the caller can drop it at a
    /// moment of its choosing (typically after releasing any borrow of the arena).
    #[must_use]
    pub(crate) fn into_value(self) -> Box<T> {
        let value = self.value;

        // The value is about to be owned by the returned box, so our own drop must not run.
        mem::forget(self);

        // SAFETY: The pointer came from `Box::leak` in `new()` and ownership has not been
        // transferred anywhere else because `self` is consumed here and never dropped.
        unsafe { Box::from_raw(value.as_ptr()) }
    }
}

impl<T> Drop for RefCounted<T> {
    fn drop(&mut self) {
        // SAFETY: The pointer came from `Box::leak` in `new()`. If we get here, `into_value()`
        // was never called, so we are still the unique owner of the allocation.
        drop(unsafe { Box::from_raw(self.value.as_ptr()) });
    }
}
