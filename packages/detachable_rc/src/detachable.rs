use std::ptr::NonNull;

use crate::{ObjectKey, RefCounted};

/// A reference-counted object that can be attached to at most one owner at a time.
///
/// This type only holds the attachment bookkeeping. Forwarding reference count deltas along the
/// owner chain requires access to the other objects and is therefore done by the arena.
#[derive(Debug)]
pub(crate) struct Detachable<T> {
    object: RefCounted<T>,

    /// The object whose lifetime this one extends. Never a counted reference.
    owner: Option<ObjectKey>,

    /// Objects currently attached to this one, in attachment order.
    children: Vec<ObjectKey>,
}

impl<T> Detachable<T> {
    #[must_use]
    pub(crate) fn new(value: T) -> Self {
        Self {
            object: RefCounted::new(value),
            owner: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn add_refs(&mut self, count: usize) {
        self.object.add_refs(count);
    }

    /// Returns true if the count is zero after the release.
    #[must_use]
    pub(crate) fn release_refs(&mut self, count: usize) -> bool {
        self.object.release_refs(count)
    }

    /// The object's own count. While the object is attached, it is also included in the count
    /// of every object up the owner chain.
    #[must_use]
    pub(crate) fn ref_count(&self) -> usize {
        self.object.ref_count()
    }

    #[must_use]
    pub(crate) fn value_ptr(&self) -> NonNull<T> {
        self.object.value_ptr()
    }

    #[must_use]
    pub(crate) fn owner(&self) -> Option<ObjectKey> {
        self.owner
    }

    #[must_use]
    pub(crate) fn is_attached(&self) -> bool {
        self.owner.is_some()
    }

    /// # Panics
    ///
    /// Panics if the object already has an owner. The arena validates this before calling.
    pub(crate) fn set_owner(&mut self, owner: ObjectKey) {
        assert!(
            self.owner.is_none(),
            "object is already attached - attachment must be validated before it is recorded"
        );

        self.owner = Some(owner);
    }

    /// Returns the previous owner, if there was one.
    pub(crate) fn clear_owner(&mut self) -> Option<ObjectKey> {
        self.owner.take()
    }

    #[must_use]
    pub(crate) fn children(&self) -> &[ObjectKey] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: ObjectKey) {
        debug_assert!(!self.children.contains(&child));

        self.children.push(child);
    }

    /// Returns whether the child was attached to this object.
    pub(crate) fn remove_child(&mut self, child: ObjectKey) -> bool {
        let Some(position) = self.children.iter().position(|c| *c == child) else {
            return false;
        };

        self.children.remove(position);
        true
    }

    /// Relinquishes the value. The attachment bookkeeping is discarded.
    #[must_use]
    pub(crate) fn into_value(self) -> Box<T> {
        self.object.into_value()
    }
}
