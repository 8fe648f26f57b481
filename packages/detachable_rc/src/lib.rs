#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Single-threaded intrusive reference counting where an object can be attached to an owner
//! whose lifetime it then extends.
//!
//! Objects live in an [`ObjectPool`] and are referenced through counted [`RefPtr`] handles.
//! Each object has its own reference count. In addition, an object can be attached to one owner
//! object in the same pool via [`RefPtr::set_owner()`]. While attached, every reference to the
//! object also counts as a reference to its owner (and to the owner's owner, and so on), so the
//! owner stays alive for as long as anything attached to it is in use, even if nobody refers to
//! the owner directly.
//!
//! Neither side owns the other's memory: the owner knows its attached objects only through
//! non-counting [`WeakPtr`]s and the attached object knows its owner only by key. Destruction is
//! driven entirely by reference counts, so owner/attached relationships never form leaking
//! cycles.
//!
//! # Destruction rules
//!
//! - An unattached object is destroyed the moment its last handle is dropped.
//! - An attached object is never destroyed by dropping its own handles. It stays alive until:
//!   - it is detached ([`RefPtr::detach_from_owner()`] or [`WeakPtr::detach_from_owner()`]),
//!     at which point it is destroyed immediately if it has no handles left; or
//!   - its owner is destroyed, at which point every object still attached to the owner is
//!     destroyed just before the owner itself.
//! - Attaching an object that is already attached is an error and is never silently ignored.
//!
//! Destroying an object drops its value; the value's [`Drop`] implementation is the place for any
//! final-release cleanup logic. Values may hold handles into the same pool.
//!
//! # Example
//!
//! ```rust
//! use detachable_rc::{ObjectPool, RefPtr};
//!
//! struct Node {
//!     name: &'static str,
//! }
//!
//! let pool = ObjectPool::new();
//!
//! let document = pool.insert(Node { name: "document" });
//! let paragraph = pool.insert(Node { name: "paragraph" });
//! RefPtr::set_owner(&paragraph, &document);
//!
//! // Nobody refers to the document directly any more...
//! let weak_document = RefPtr::downgrade(&document);
//! drop(document);
//!
//! // ...but the paragraph keeps it alive.
//! assert!(weak_document.is_alive());
//! assert_eq!(paragraph.name, "paragraph");
//!
//! // Once the paragraph is released, the whole structure goes away.
//! drop(paragraph);
//! assert!(!weak_document.is_alive());
//! assert!(pool.is_empty());
//! ```
//!
//! # Single-threaded design
//!
//! None of the types in this crate perform any synchronization and none of them are [`Send`] or
//! [`Sync`]. Use from multiple threads requires external serialization of all pool operations.

mod builder;
mod detachable;
mod error;
mod key;
mod pool;
mod raw;
mod ref_counted;
mod ref_counter;
mod ref_ptr;
mod weak_ptr;

pub use builder::*;
pub(crate) use detachable::*;
pub use error::AttachError;
pub(crate) use error::Result;
pub use key::*;
pub use pool::*;
pub(crate) use raw::*;
pub(crate) use ref_counted::*;
pub(crate) use ref_counter::*;
pub use ref_ptr::*;
pub use weak_ptr::*;
