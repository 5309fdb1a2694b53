//! Property<T>: a change-notifying value bindable to an observable source.
//!
//! Control geometry (`x`, `y`, `width`, `height`), visibility flags, and the
//! entries of the resolved style store are all properties: reading is cheap,
//! writing notifies subscribers only when the value actually changed, and a
//! property can be driven by any [`Observable`] via [`Property::bind`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::observable::{Observable, Observer, Subscription};
use super::replay::ValueSubject;

struct PropertyInner<T: Clone> {
    value: T,
    changes: ValueSubject<T>,
    binding: Option<Subscription>,
}

impl<T: Clone> Drop for PropertyInner<T> {
    fn drop(&mut self) {
        if let Some(mut binding) = self.binding.take() {
            binding.cancel();
        }
    }
}

/// A value with change notifications.
///
/// Cheap to clone — clones are handles to the same underlying value.
/// Observers attached through [`observe`](Property::observe) receive the
/// current value synchronously, then every subsequent change.
pub struct Property<T: Clone + PartialEq + 'static> {
    inner: Rc<RefCell<PropertyInner<T>>>,
}

impl<T: Clone + PartialEq + 'static> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + std::fmt::Debug + 'static> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.inner.borrow().value)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    /// Create a property with the given initial value.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PropertyInner {
                value: initial.clone(),
                changes: ValueSubject::new(initial),
                binding: None,
            })),
        }
    }

    /// The current value (cloned).
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Read the current value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Set a new value, notifying observers iff it differs from the current one.
    pub fn set(&self, value: T) {
        let changes = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value.clone();
            inner.changes.clone()
        };
        // Notify outside the borrow: a subscriber may read the property.
        changes.next(value);
    }

    /// Observe changes. The current value is delivered synchronously.
    pub fn observe(&self, observer: Observer<T>) -> Subscription {
        let changes = self.inner.borrow().changes.clone();
        changes.subscribe(observer)
    }

    /// Drive this property from an observable source.
    ///
    /// Replaces (and unsubscribes) any previous binding. The property keeps a
    /// weak link back to itself, so a bound source outliving the property is
    /// harmless.
    pub fn bind(&self, source: &dyn Observable<T>) {
        self.unbind();
        let weak: Weak<RefCell<PropertyInner<T>>> = Rc::downgrade(&self.inner);
        let subscription = source.subscribe(Observer::next(move |value: &T| {
            if let Some(inner) = weak.upgrade() {
                let handle = Property { inner };
                handle.set(value.clone());
            }
        }));
        self.inner.borrow_mut().binding = Some(subscription);
    }

    /// Remove the current binding, if any.
    pub fn unbind(&self) {
        let binding = self.inner.borrow_mut().binding.take();
        if let Some(binding) = binding {
            binding.unsubscribe();
        }
    }

    /// Whether this property is currently bound to a source.
    pub fn is_bound(&self) -> bool {
        self.inner.borrow().binding.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::observable::Subject;
    use std::cell::Cell;

    #[test]
    fn get_set() {
        let p = Property::new(1);
        assert_eq!(p.get(), 1);
        p.set(2);
        assert_eq!(p.get(), 2);
    }

    #[test]
    fn with_reads_by_reference() {
        let p = Property::new("hello".to_string());
        assert_eq!(p.with(|s| s.len()), 5);
    }

    #[test]
    fn observe_delivers_current_then_changes() {
        let p = Property::new(10);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let _sub = p.observe(Observer::next(move |v| seen_c.borrow_mut().push(*v)));
        assert_eq!(*seen.borrow(), vec![10]);

        p.set(20);
        assert_eq!(*seen.borrow(), vec![10, 20]);
    }

    #[test]
    fn set_same_value_does_not_notify() {
        let p = Property::new(5);
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        let _sub = p.observe(Observer::next(move |_| count_c.set(count_c.get() + 1)));
        assert_eq!(count.get(), 1); // initial replay

        p.set(5);
        assert_eq!(count.get(), 1);
        p.set(6);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn bind_drives_value_from_source() {
        let source: Subject<i32> = Subject::new();
        let p = Property::new(0);
        p.bind(&source);
        assert!(p.is_bound());

        source.next(7);
        assert_eq!(p.get(), 7);
    }

    #[test]
    fn rebind_replaces_old_source() {
        let first: Subject<i32> = Subject::new();
        let second: Subject<i32> = Subject::new();
        let p = Property::new(0);

        p.bind(&first);
        p.bind(&second);
        assert_eq!(first.observer_count(), 0, "old binding unsubscribed");

        first.next(1);
        assert_eq!(p.get(), 0);
        second.next(2);
        assert_eq!(p.get(), 2);
    }

    #[test]
    fn unbind_stops_updates() {
        let source: Subject<i32> = Subject::new();
        let p = Property::new(0);
        p.bind(&source);
        p.unbind();
        assert!(!p.is_bound());

        source.next(9);
        assert_eq!(p.get(), 0);
        assert_eq!(source.observer_count(), 0);
    }

    #[test]
    fn dropped_property_ignores_source() {
        let source: Subject<i32> = Subject::new();
        {
            let p = Property::new(0);
            p.bind(&source);
        }
        // Property gone; pushing must not panic.
        source.next(3);
    }

    #[test]
    fn clones_share_value_and_notifications() {
        let p = Property::new(0);
        let q = p.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let _sub = q.observe(Observer::next(move |v| seen_c.borrow_mut().push(*v)));

        p.set(4);
        assert_eq!(q.get(), 4);
        assert_eq!(*seen.borrow(), vec![0, 4]);
    }
}
