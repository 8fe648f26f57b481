//! Example demonstrating the basics of `detachable_rc`.
//!
//! Objects live in an `ObjectPool` and are shared through counted `RefPtr` handles.

use std::cell::Cell;

use detachable_rc::{ObjectPool, RefPtr};

fn main() {
    println!("=== detachable_rc: counted handles ===");

    let pool = ObjectPool::new();

    // Inserting returns the first handle.
    let counter = pool.insert(Cell::new(0_u32));
    println!("Count after insert: {}", RefPtr::ref_count(&counter));

    // Cloning a handle adds a reference.
    let alias = counter.clone();
    println!("Count after clone: {}", RefPtr::ref_count(&counter));

    // Handles give shared access; mutation goes through interior mutability.
    alias.set(alias.get() + 1);
    println!("Value seen through the first handle: {}", counter.get());

    // Dropping a handle releases its reference.
    drop(alias);
    println!("Count after dropping the alias: {}", RefPtr::ref_count(&counter));

    // A weak pointer does not keep the object alive.
    let weak = RefPtr::downgrade(&counter);
    drop(counter);
    println!("Alive after dropping the last handle: {}", weak.is_alive());
    println!("Pool length: {}", pool.len());
}
