//! Copy-on-write behavior with trait objects that supply their own copy function.

use std::cell::Cell;
use std::rc::Rc;

use cow_ptr::CowPtr;

trait Shape {
    fn clone_rc(&self) -> Rc<dyn Shape>;
    fn set_size(&mut self, size: u32);
    fn size(&self) -> u32;
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
struct Circle {
    radius: u32,
}

impl Shape for Circle {
    fn clone_rc(&self) -> Rc<dyn Shape> {
        COPIES.with(|copies| copies.set(copies.get().wrapping_add(1)));
        Rc::new(self.clone())
    }

    fn set_size(&mut self, size: u32) {
        self.radius = size;
    }

    fn size(&self) -> u32 {
        self.radius
    }

    fn name(&self) -> &'static str {
        "circle"
    }
}

thread_local! {
    static COPIES: Cell<usize> = const { Cell::new(0) };
}

fn circle(radius: u32) -> CowPtr<dyn Shape> {
    CowPtr::from_rc_with(Rc::new(Circle { radius }), |shape| shape.clone_rc())
}

fn copies() -> usize {
    COPIES.with(Cell::get)
}

#[test]
fn shared_shapes_are_copied_on_write() {
    let original = circle(100);
    let mut first = original.clone();
    let mut second = first.clone();
    let copies_before = copies();

    CowPtr::write(&mut second).set_size(2);
    CowPtr::write(&mut first).set_size(1);

    assert_eq!(original.size(), 100);
    assert_eq!(first.size(), 1);
    assert_eq!(second.size(), 2);
    assert_eq!(first.name(), "circle");
    assert_eq!(copies().wrapping_sub(copies_before), 2);
}

#[test]
fn sole_owner_writes_in_place() {
    let mut shape = circle(5);
    let copies_before = copies();

    CowPtr::with_write(&mut shape, |shape| shape.set_size(6));
    CowPtr::with_write(&mut shape, |shape| shape.set_size(7));

    assert_eq!(shape.size(), 7);
    assert_eq!(copies(), copies_before);
}

#[test]
fn boxed_shape_becomes_shared_value() {
    let boxed: Box<dyn Shape> = Box::new(Circle { radius: 3 });
    let shape = CowPtr::from_box_with(boxed, |shape| shape.clone_rc());
    let alias = shape.clone();

    assert!(CowPtr::ptr_eq(&shape, &alias));
    assert_eq!(alias.size(), 3);
}

#[test]
fn dropping_other_handles_makes_value_unshared() {
    let mut shape = circle(9);
    let alias = shape.clone();
    assert!(CowPtr::is_shared(&shape));

    drop(alias);
    let copies_before = copies();

    CowPtr::write(&mut shape).set_size(10);

    assert!(!CowPtr::is_shared(&shape));
    assert_eq!(copies(), copies_before);
}
