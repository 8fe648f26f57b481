//! Example demonstrating copy-on-write sharing, both for plain values and for trait objects.

use std::rc::Rc;

use cow_ptr::CowPtr;

trait Shape {
    fn clone_rc(&self) -> Rc<dyn Shape>;
    fn describe(&self) -> String;
    fn grow(&mut self);
}

#[derive(Clone)]
struct Circle {
    radius: f64,
}

impl Shape for Circle {
    fn clone_rc(&self) -> Rc<dyn Shape> {
        println!("  (copying a circle)");
        Rc::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("circle with radius {}", self.radius)
    }

    fn grow(&mut self) {
        self.radius *= 2.0;
    }
}

fn main() {
    println!("=== cow_ptr: plain values ===");

    let numbers = CowPtr::new(vec![1, 2, 3]);
    let mut more_numbers = numbers.clone();
    println!("Shared before write: {}", CowPtr::ptr_eq(&numbers, &more_numbers));

    CowPtr::write(&mut more_numbers).push(4);
    println!("Original: {:?}", *numbers);
    println!("Written copy: {:?}", *more_numbers);

    println!("=== cow_ptr: trait objects ===");

    let shape: CowPtr<dyn Shape> =
        CowPtr::from_rc_with(Rc::new(Circle { radius: 1.0 }), |shape| shape.clone_rc());
    let mut bigger = shape.clone();

    println!("Growing the shared copy:");
    CowPtr::with_write(&mut bigger, |shape| shape.grow());

    println!("Growing it again, now unshared:");
    CowPtr::with_write(&mut bigger, |shape| shape.grow());

    println!("Original: {}", shape.describe());
    println!("Grown: {}", bigger.describe());
}
