use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use tracing::trace;

/// A shared value that is copied the first time it is written to through a handle that is not
/// its sole owner.
///
/// Cloning a `CowPtr` shares the value. Reading goes through [`Deref`]. Writing goes through
/// [`write()`][Self::write] or [`with_write()`][Self::with_write], which first give this handle
/// its own copy of the value if any other handle can still see it. Writes through one handle are
/// therefore never visible through another.
///
/// The operations are associated functions (called as `CowPtr::write(&mut value)`) so that they
/// never shadow methods of the value type.
///
/// # Example
///
/// ```rust
/// use cow_ptr::CowPtr;
///
/// let mut settings = CowPtr::new(String::from("dark"));
/// let snapshot = settings.clone();
///
/// CowPtr::with_write(&mut settings, |theme| theme.push_str("-contrast"));
///
/// assert_eq!(*settings, "dark-contrast");
/// assert_eq!(*snapshot, "dark");
/// ```
pub struct CowPtr<T: ?Sized> {
    shared: Rc<T>,

    /// Makes an unshared copy of the value. Only called when the value is shared.
    copier: fn(&T) -> Rc<T>,
}

impl<T: Clone> CowPtr<T> {
    /// Creates a new pointer that copies the value with [`Clone`] when needed.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            shared: Rc::new(value),
            copier: clone_into_rc::<T>,
        }
    }
}

impl<T: ?Sized> CowPtr<T> {
    /// Creates a new pointer from an existing shared value and a function that copies it.
    ///
    /// This is how values that are not [`Clone`] are used, typically trait objects that offer
    /// their own cloning method. The `copier` must return a value that nothing else shares.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::rc::Rc;
    ///
    /// use cow_ptr::CowPtr;
    ///
    /// trait Shape {
    ///     fn clone_rc(&self) -> Rc<dyn Shape>;
    ///     fn scale(&mut self, factor: f64);
    ///     fn area(&self) -> f64;
    /// }
    ///
    /// #[derive(Clone)]
    /// struct Square(f64);
    ///
    /// impl Shape for Square {
    ///     fn clone_rc(&self) -> Rc<dyn Shape> {
    ///         Rc::new(self.clone())
    ///     }
    ///
    ///     fn scale(&mut self, factor: f64) {
    ///         self.0 *= factor;
    ///     }
    ///
    ///     fn area(&self) -> f64 {
    ///         self.0 * self.0
    ///     }
    /// }
    ///
    /// let shape: CowPtr<dyn Shape> = CowPtr::from_rc_with(Rc::new(Square(1.0)), |s| s.clone_rc());
    /// let mut scaled = shape.clone();
    ///
    /// CowPtr::write(&mut scaled).scale(3.0);
    ///
    /// assert_eq!(shape.area(), 1.0);
    /// assert_eq!(scaled.area(), 9.0);
    /// ```
    #[must_use]
    pub fn from_rc_with(shared: Rc<T>, copier: fn(&T) -> Rc<T>) -> Self {
        Self { shared, copier }
    }

    /// Creates a new pointer that takes ownership of a boxed value, with a function that copies
    /// it. See [`from_rc_with()`][Self::from_rc_with].
    #[must_use]
    pub fn from_box_with(value: Box<T>, copier: fn(&T) -> Rc<T>) -> Self {
        Self::from_rc_with(Rc::from(value), copier)
    }

    /// Grants exclusive access to the value, copying it first if it is shared.
    ///
    /// # Panics
    ///
    /// Panics if the copy function returns a value that is itself shared.
    pub fn write(this: &mut Self) -> &mut T {
        if Rc::get_mut(&mut this.shared).is_none() {
            this.shared = (this.copier)(&this.shared);

            trace!(
                strong = Rc::strong_count(&this.shared),
                "copied shared value before write"
            );
        }

        Rc::get_mut(&mut this.shared).expect("copy function returned a value that is shared")
    }

    /// Calls `f` with exclusive access to the value, copying it first if it is shared.
    ///
    /// # Panics
    ///
    /// Panics if the copy function returns a value that is itself shared.
    pub fn with_write<R>(this: &mut Self, f: impl FnOnce(&mut T) -> R) -> R {
        f(Self::write(this))
    }

    /// Returns whether a write through this pointer would need to copy the value first.
    #[must_use]
    pub fn is_shared(this: &Self) -> bool {
        Rc::strong_count(&this.shared) > 1 || Rc::weak_count(&this.shared) > 0
    }

    /// Returns whether two pointers currently share the same value.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.shared, &other.shared)
    }
}

fn clone_into_rc<T: Clone>(value: &T) -> Rc<T> {
    Rc::new(value.clone())
}

impl<T: ?Sized> Clone for CowPtr<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
            copier: self.copier,
        }
    }
}

impl<T: ?Sized> Deref for CowPtr<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.shared
    }
}

impl<T: Clone + Default> Default for CowPtr<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> From<T> for CowPtr<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for CowPtr<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CowPtr")
            .field("value", &&*self.shared)
            .field("shared", &Self::is_shared(self))
            .finish()
    }
}
