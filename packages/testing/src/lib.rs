#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in the workspace packages.
//!
//! The ownership primitives in this workspace are judged almost entirely by *when* values get
//! dropped, so the helpers here record drop events in order for later assertions.

use std::cell::RefCell;
use std::rc::Rc;

/// An ordered record of which tracked values have been dropped.
///
/// Clones share the same underlying record, so a log can be handed to values that are moved
/// into containers while the test keeps its own copy for assertions.
///
/// # Example
///
/// ```rust
/// use testing::DropLog;
///
/// let log = DropLog::new();
///
/// let first = log.track("first");
/// let second = log.track("second");
///
/// drop(second);
/// drop(first);
///
/// assert_eq!(log.events(), vec!["second", "first"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DropLog {
    events: Rc<RefCell<Vec<&'static str>>>,
}

impl DropLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a value that appends `name` to this log when it is dropped.
    #[must_use]
    pub fn track(&self, name: &'static str) -> Tracked {
        Tracked {
            name,
            log: self.clone(),
        }
    }

    /// Returns the names of all dropped values, in drop order.
    #[must_use]
    pub fn events(&self) -> Vec<&'static str> {
        self.events.borrow().clone()
    }

    /// Returns how many times a value with the given name has been dropped.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| **event == name)
            .count()
    }

    /// Returns whether a value with the given name has been dropped at least once.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    /// Returns the total number of recorded drops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Returns whether nothing has been dropped yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    fn record(&self, name: &'static str) {
        self.events.borrow_mut().push(name);
    }
}

/// A value that reports its own drop to a [`DropLog`].
#[derive(Debug)]
pub struct Tracked {
    name: &'static str,
    log: DropLog,
}

impl Tracked {
    /// The name this value will be recorded under.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.log.record(self.name);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_not_impl_any;

    use super::*;

    assert_not_impl_any!(DropLog: Send, Sync);
    assert_not_impl_any!(Tracked: Send, Sync);

    #[test]
    fn records_drops_in_order() {
        let log = DropLog::new();

        let a = log.track("a");
        let b = log.track("b");
        let c = log.track("c");

        drop(b);
        drop(c);
        drop(a);

        assert_eq!(log.events(), vec!["b", "c", "a"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn counts_repeated_names() {
        let log = DropLog::new();

        drop(log.track("same"));
        drop(log.track("same"));
        drop(log.track("other"));

        assert_eq!(log.count("same"), 2);
        assert_eq!(log.count("other"), 1);
        assert_eq!(log.count("never"), 0);
        assert!(!log.contains("never"));
    }

    #[test]
    fn clones_share_the_record() {
        let log = DropLog::new();
        let clone = log.clone();

        let tracked = clone.track("shared");
        assert_eq!(tracked.name(), "shared");
        assert!(log.is_empty());

        drop(tracked);

        assert!(log.contains("shared"));
    }
}
