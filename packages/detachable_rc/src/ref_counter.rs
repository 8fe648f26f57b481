/// A plain single-threaded reference count.
///
/// The counter starts at zero and is mutated only by the object arena, which serializes all
/// access through its own borrow. There is no interior mutability and no atomics here.
#[derive(Debug, Default)]
pub(crate) struct RefCounter {
    count: usize,
}

impl RefCounter {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self { count: 0 }
    }

    /// Increments the reference count by `delta`.
    ///
    /// # Panics
    ///
    /// Panics if the reference count would overflow.
    pub(crate) fn increment_by(&mut self, delta: usize) {
        self.count = self.count.checked_add(delta).expect(
            "reference count overflow - indicates a serious bug in reference counting logic",
        );
    }

    /// Decrements the reference count by `delta` and returns true if the count is now zero.
    ///
    /// # Panics
    ///
    /// Panics if the reference count would underflow (go below zero).
    pub(crate) fn decrement_by(&mut self, delta: usize) -> bool {
        self.count = self.count.checked_sub(delta).expect(
            "reference count underflow - indicates a serious bug in reference counting logic",
        );

        self.count == 0
    }

    #[must_use]
    pub(crate) fn count(&self) -> usize {
        self.count
    }
}
