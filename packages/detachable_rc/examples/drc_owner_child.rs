//! Example demonstrating attached objects keeping their owner alive.
//!
//! A paragraph attached to a document keeps the document alive even after every direct handle
//! to the document is gone. Once the paragraph is released too, both are destroyed, the
//! paragraph first.

use detachable_rc::{ObjectPool, RefPtr};

struct Node {
    name: &'static str,
}

impl Drop for Node {
    fn drop(&mut self) {
        println!("Destroying {}", self.name);
    }
}

fn main() {
    println!("=== detachable_rc: owner and attached objects ===");

    let pool = ObjectPool::new();

    let document = pool.insert(Node { name: "document" });
    let heading = pool.insert(Node { name: "heading" });
    let paragraph = pool.insert(Node { name: "paragraph" });

    RefPtr::set_owner(&heading, &document);
    RefPtr::set_owner(&paragraph, &document);
    println!(
        "Document count with two attached objects: {}",
        RefPtr::ref_count(&document)
    );

    // Attaching twice is refused.
    if let Err(error) = RefPtr::try_set_owner(&paragraph, &heading) {
        println!("Second attachment refused: {error}");
    }

    let weak_document = RefPtr::downgrade(&document);
    drop(document);
    println!("Document alive without direct handles: {}", weak_document.is_alive());

    // The heading has no handles left but stays until it is detached or its owner goes.
    let weak_heading = RefPtr::downgrade(&heading);
    drop(heading);
    println!("Heading alive while attached: {}", weak_heading.is_alive());

    println!("Detaching the heading:");
    weak_heading.detach_from_owner();

    // The paragraph is the last thing keeping the document alive, so both go now.
    println!("Releasing the paragraph:");
    drop(paragraph);

    println!("Pool length: {}", pool.len());
}
