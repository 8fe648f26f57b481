use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::{AttachError, Detachable, ObjectKey, Result};

/// Values removed from the arena that still need to be dropped.
///
/// Destruction is split in two phases: the arena vacates the slots and hands the values back,
/// and the caller drops them after it has released its borrow of the arena. This is what allows
/// a value's `Drop` to release handles into the same pool. Values are in destruction order,
/// attached objects before their owner.
pub(crate) type Graveyard<T> = Vec<Box<T>>;

#[derive(Debug)]
struct Slot<T> {
    /// Bumped every time the slot is vacated, so keys issued for a previous occupant no longer
    /// match.
    generation: u64,

    entry: Option<Detachable<T>>,
}

/// The slot arena behind [`ObjectPool`][crate::ObjectPool].
///
/// All reference counting and attachment logic lives here. Every operation that may destroy
/// objects returns a [`Graveyard`] instead of dropping values in place.
///
/// The count of an object includes the counts of everything attached below it, so the count of
/// the object at the top of an owner chain (the root) is the total number of handles that keep
/// the chain alive. Only unattached objects are ever destroyed on their own; an attached object
/// whose count reaches zero stays in place until it is detached or until its root is destroyed.
#[derive(Debug)]
pub(crate) struct RawObjectPool<T> {
    slots: Vec<Slot<T>>,

    /// Indexes of slots with no occupant, reused last-in-first-out.
    vacant: Vec<usize>,

    length: usize,
}

impl<T> RawObjectPool<T> {
    #[must_use]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
            length: 0,
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The number of objects that fit before the slot storage has to grow.
    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Ensures that `additional` more objects fit without growing the slot storage.
    pub(crate) fn reserve(&mut self, additional: usize) {
        let needed = self.length.saturating_add(additional);

        // Vacant slots are reused first, so only slots beyond the existing ones are requested.
        if let Some(extra) = needed.checked_sub(self.slots.len()) {
            self.slots.reserve(extra);
        }
    }

    #[must_use]
    pub(crate) fn contains(&self, key: ObjectKey) -> bool {
        self.entry(key).is_some()
    }

    /// Adds an object with a reference count of zero.
    ///
    /// The caller is expected to immediately take a reference; an unreferenced unattached object
    /// is not destroyed until something releases it.
    pub(crate) fn insert(&mut self, value: T) -> ObjectKey {
        let entry = Detachable::new(value);

        let key = if let Some(index) = self.vacant.pop() {
            let slot = self
                .slots
                .get_mut(index)
                .expect("vacant slot index is always within the arena");

            debug_assert!(slot.entry.is_none());

            slot.entry = Some(entry);
            ObjectKey::new(index, slot.generation)
        } else {
            let index = self.slots.len();

            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });

            ObjectKey::new(index, 0)
        };

        self.length = self.length.wrapping_add(1);

        trace!(
            index = key.index(),
            generation = key.generation(),
            "object inserted"
        );

        key
    }

    #[must_use]
    pub(crate) fn value_ptr(&self, key: ObjectKey) -> Option<NonNull<T>> {
        self.entry(key).map(Detachable::value_ptr)
    }

    /// The count of the object, including the counts of everything attached below it.
    /// Zero if the object no longer exists.
    #[must_use]
    pub(crate) fn ref_count(&self, key: ObjectKey) -> usize {
        self.entry(key).map_or(0, Detachable::ref_count)
    }

    #[must_use]
    pub(crate) fn owner(&self, key: ObjectKey) -> Option<ObjectKey> {
        self.entry(key).and_then(Detachable::owner)
    }

    #[must_use]
    pub(crate) fn children(&self, key: ObjectKey) -> Vec<ObjectKey> {
        self.entry(key)
            .map(|entry| entry.children().to_vec())
            .unwrap_or_default()
    }

    /// Adds a reference to the object and, through the owner chain, to every object it is
    /// attached to.
    pub(crate) fn add_ref(&mut self, key: ObjectKey) {
        self.add_refs_along_chain(key, 1);
    }

    /// Removes a reference from the object and every object up its owner chain.
    ///
    /// If the root of the chain reaches zero, the root is destroyed together with everything
    /// attached to it. The object itself is never destroyed here while it is attached.
    #[must_use]
    pub(crate) fn release(&mut self, key: ObjectKey) -> Graveyard<T> {
        let mut graveyard = Graveyard::new();

        if let Some(root) = self.release_refs_along_chain(key, 1) {
            self.destroy(root, &mut graveyard);
        }

        graveyard
    }

    /// Attaches `object` to `owner`, transferring the current count of `object` onto the owner
    /// chain.
    pub(crate) fn set_owner(&mut self, object: ObjectKey, owner: ObjectKey) -> Result<()> {
        if object == owner {
            return Err(AttachError::SelfOwnership { object });
        }

        let entry = self.live_entry(object);

        if let Some(current) = entry.owner() {
            return Err(AttachError::AlreadyAttached {
                object,
                owner: current,
            });
        }

        let count = entry.ref_count();

        let mut ancestor = Some(owner);
        while let Some(key) = ancestor {
            if key == object {
                return Err(AttachError::OwnershipCycle { object, owner });
            }

            ancestor = self.live_entry(key).owner();
        }

        self.live_entry_mut(object).set_owner(owner);
        self.live_entry_mut(owner).add_child(object);
        self.add_refs_along_chain(owner, count);

        debug!(
            object = %object,
            owner = %owner,
            forwarded = count,
            "object attached"
        );

        Ok(())
    }

    /// Detaches `object` from its owner, if it has one.
    ///
    /// The count of `object` is removed from the former owner chain, which may destroy the
    /// former root. If `object` itself has a count of zero, it was only being kept because it
    /// was attached and is destroyed now.
    ///
    /// Does nothing for an object that is not attached or no longer exists.
    #[must_use]
    pub(crate) fn detach(&mut self, object: ObjectKey) -> Graveyard<T> {
        let mut graveyard = Graveyard::new();

        let Some(entry) = self.entry_mut(object) else {
            return graveyard;
        };

        let Some(owner) = entry.clear_owner() else {
            return graveyard;
        };

        let count = entry.ref_count();

        let was_child = self.live_entry_mut(owner).remove_child(object);
        debug_assert!(was_child, "owner did not know about its attached object");

        debug!(
            object = %object,
            owner = %owner,
            forwarded = count,
            "object detached"
        );

        if count == 0 {
            self.destroy(object, &mut graveyard);
        } else if let Some(root) = self.release_refs_along_chain(owner, count) {
            self.destroy(root, &mut graveyard);
        }

        graveyard
    }

    fn add_refs_along_chain(&mut self, start: ObjectKey, count: usize) {
        let mut current = Some(start);

        while let Some(key) = current {
            let entry = self.live_entry_mut(key);
            entry.add_refs(count);
            current = entry.owner();
        }
    }

    /// Returns the root of the chain if the release brought its count to zero.
    fn release_refs_along_chain(&mut self, start: ObjectKey, count: usize) -> Option<ObjectKey> {
        let mut current = start;

        loop {
            let entry = self.live_entry_mut(current);
            let reached_zero = entry.release_refs(count);

            match entry.owner() {
                Some(owner) => current = owner,
                None => return reached_zero.then_some(current),
            }
        }
    }

    /// Removes an unattached object and everything attached below it, attached objects before
    /// their owner and siblings in attachment order.
    fn destroy(&mut self, root: ObjectKey, graveyard: &mut Graveyard<T>) {
        debug_assert!(!self.live_entry(root).is_attached());

        // Each key is visited twice: first to schedule its children, then to vacate it.
        let mut pending = vec![(root, false)];

        while let Some((key, children_scheduled)) = pending.pop() {
            if children_scheduled {
                graveyard.push(self.vacate(key));
            } else {
                pending.push((key, true));
                pending.extend(
                    self.live_entry(key)
                        .children()
                        .iter()
                        .rev()
                        .map(|child| (*child, false)),
                );
            }
        }
    }

    fn vacate(&mut self, key: ObjectKey) -> Box<T> {
        let slot = self
            .slots
            .get_mut(key.index())
            .expect("destroyed object must have a slot in the arena");

        let entry = slot
            .entry
            .take()
            .expect("destroyed object must still occupy its slot");

        debug_assert_eq!(entry.ref_count(), 0, "destroyed a referenced object");

        slot.generation = slot.generation.wrapping_add(1);
        self.vacant.push(key.index());
        self.length = self.length.wrapping_sub(1);

        trace!(
            index = key.index(),
            generation = key.generation(),
            "object destroyed"
        );

        entry.into_value()
    }

    fn entry(&self, key: ObjectKey) -> Option<&Detachable<T>> {
        self.slots
            .get(key.index())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, key: ObjectKey) -> Option<&mut Detachable<T>> {
        self.slots
            .get_mut(key.index())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.entry.as_mut())
    }

    /// For keys that are known to be alive because a counted reference or an owner chain link
    /// refers to them.
    fn live_entry(&self, key: ObjectKey) -> &Detachable<T> {
        self.entry(key)
            .expect("object referenced by a handle or an owner chain must be alive")
    }

    fn live_entry_mut(&mut self, key: ObjectKey) -> &mut Detachable<T> {
        self.entry_mut(key)
            .expect("object referenced by a handle or an owner chain must be alive")
    }
}
