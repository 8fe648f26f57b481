#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A copy-on-write smart pointer for single-threaded code.
//!
//! A [`CowPtr`] is cheap to clone: all clones share one value until one of them is written to.
//! At that point the writer gets its own copy and the other clones keep seeing the original.
//!
//! ```rust
//! use cow_ptr::CowPtr;
//!
//! let original = CowPtr::new(vec![1, 2, 3]);
//! let mut copy = original.clone();
//! assert!(CowPtr::ptr_eq(&original, &copy));
//!
//! CowPtr::write(&mut copy).push(4);
//!
//! assert_eq!(*original, [1, 2, 3]);
//! assert_eq!(*copy, [1, 2, 3, 4]);
//! ```
//!
//! Unlike [`Rc::make_mut()`][std::rc::Rc::make_mut], the copy step does not require the value to
//! be [`Clone`]. A value that cannot be cloned directly (most commonly a trait object) can supply
//! its own copy function via [`CowPtr::from_rc_with()`].

mod cow;

pub use cow::*;
