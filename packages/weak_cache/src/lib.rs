#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A cache that hands out shared values by key and forgets each value as soon as nobody uses it.
//!
//! A [`WeakCache`] only holds weak references to the values it has created. While at least one
//! [`Cached`] handle for a key exists, every lookup of that key returns the same value. When the
//! last handle is dropped, the value is dropped and its entry removes itself from the cache, so
//! the next lookup creates a fresh value.
//!
//! ```rust
//! use weak_cache::{Cached, WeakCache};
//!
//! let cache = WeakCache::new(|name: &String| format!("connection to {name}"));
//!
//! let first = cache.get(&"db".to_string());
//! let second = cache.get(&"db".to_string());
//! assert!(Cached::ptr_eq(&first, &second));
//! assert_eq!(cache.len(), 1);
//!
//! drop(first);
//! drop(second);
//! assert!(cache.is_empty());
//! ```

mod cache;
mod cached;

pub use cache::*;
pub use cached::*;
