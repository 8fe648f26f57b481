use std::fmt;

/// Identifies an object in an [`ObjectPool`][crate::ObjectPool].
///
/// A key is a non-counting reference: holding one does not keep the object alive. Slots in the
/// pool are reused after an object is destroyed, but every reuse bumps the slot generation, so a
/// key never refers to a different object than the one it was issued for. Once its object is
/// destroyed, the key simply stops matching anything.
///
/// Keys are only meaningful for the pool that issued them.
///
/// # Example
///
/// ```rust
/// use detachable_rc::{ObjectPool, RefPtr};
///
/// let pool = ObjectPool::new();
///
/// let item = pool.insert("hello");
/// let key = RefPtr::key(&item);
///
/// assert!(pool.contains(key));
///
/// drop(item);
/// assert!(!pool.contains(key));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ObjectKey {
    index: usize,
    generation: u64,
}

impl ObjectKey {
    #[must_use]
    pub(crate) fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }

    /// The index of the slot in the pool.
    #[must_use]
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// The generation of the slot at the time the object was inserted.
    #[must_use]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn display_shows_index_and_generation() {
        let key = ObjectKey::new(3, 7);

        assert_eq!(key.to_string(), "#3.7");
    }

    #[test]
    fn generation_distinguishes_reused_slots() {
        let first = ObjectKey::new(0, 0);
        let reused = ObjectKey::new(0, 1);

        assert_eq!(first.index(), reused.index());
        assert_ne!(first, reused);
    }
}
