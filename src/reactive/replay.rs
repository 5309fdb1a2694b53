//! Replaying subjects: ValueSubject, ReplaySubject.
//!
//! "Replay" here is a synchronous push at subscription time, not a buffered
//! stream: a new observer immediately receives the most recent value (if any)
//! before regular delivery begins.

use std::cell::RefCell;
use std::rc::Rc;

use super::observable::{Observable, Observer, StreamError, Subject, Subscription};

// ---------------------------------------------------------------------------
// ReplaySubject
// ---------------------------------------------------------------------------

/// A subject that re-emits its last value to each new subscriber.
///
/// Before the first `next`, subscribing behaves like a plain [`Subject`].
pub struct ReplaySubject<T: Clone> {
    subject: Subject<T>,
    last: Rc<RefCell<Option<T>>>,
}

impl<T: Clone> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            last: self.last.clone(),
        }
    }
}

impl<T: Clone> Default for ReplaySubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ReplaySubject<T> {
    /// Create an empty replay subject.
    pub fn new() -> Self {
        Self {
            subject: Subject::new(),
            last: Rc::new(RefCell::new(None)),
        }
    }

    /// Push a value; it becomes the replayed value for future subscribers.
    pub fn next(&self, value: T) {
        if self.subject.is_terminated() {
            return;
        }
        *self.last.borrow_mut() = Some(value.clone());
        self.subject.next(value);
    }

    /// Push an error; the subject becomes permanently inert.
    pub fn error(&self, error: StreamError) {
        self.subject.error(error);
    }

    /// Complete the subject.
    pub fn complete(&self) {
        self.subject.complete();
    }

    /// The most recent value, if any value has been pushed.
    pub fn last_value(&self) -> Option<T> {
        self.last.borrow().clone()
    }

    /// Whether the subject has completed or errored.
    pub fn is_terminated(&self) -> bool {
        self.subject.is_terminated()
    }
}

impl<T: Clone + 'static> Observable<T> for ReplaySubject<T> {
    fn subscribe(&self, mut observer: Observer<T>) -> Subscription {
        if !self.subject.is_terminated() {
            // Clone out of the cell first: the replayed observer may push
            // back into this subject re-entrantly.
            let replayed = self.last.borrow().clone();
            if let Some(value) = replayed {
                observer.notify_next(&value);
            }
        }
        self.subject.subscribe(observer)
    }
}

// ---------------------------------------------------------------------------
// ValueSubject
// ---------------------------------------------------------------------------

/// A subject that always holds a current value, seeded at construction.
///
/// Every subscriber receives the current value synchronously at subscribe
/// time, then subsequent changes.
pub struct ValueSubject<T: Clone> {
    subject: Subject<T>,
    current: Rc<RefCell<T>>,
}

impl<T: Clone> Clone for ValueSubject<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            current: self.current.clone(),
        }
    }
}

impl<T: Clone> ValueSubject<T> {
    /// Create a value subject seeded with `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            subject: Subject::new(),
            current: Rc::new(RefCell::new(initial)),
        }
    }

    /// Push a new current value.
    pub fn next(&self, value: T) {
        if self.subject.is_terminated() {
            return;
        }
        *self.current.borrow_mut() = value.clone();
        self.subject.next(value);
    }

    /// Complete the subject.
    pub fn complete(&self) {
        self.subject.complete();
    }

    /// The current value.
    pub fn value(&self) -> T {
        self.current.borrow().clone()
    }

    /// Whether the subject has completed.
    pub fn is_terminated(&self) -> bool {
        self.subject.is_terminated()
    }
}

impl<T: Clone + 'static> Observable<T> for ValueSubject<T> {
    fn subscribe(&self, mut observer: Observer<T>) -> Subscription {
        if !self.subject.is_terminated() {
            // Clone out of the cell first: the replayed observer may push
            // back into this subject re-entrantly.
            let current = self.current.borrow().clone();
            observer.notify_next(&current);
        }
        self.subject.subscribe(observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    // ── ReplaySubject ────────────────────────────────────────────────

    #[test]
    fn replay_nothing_before_first_value() {
        let subject: ReplaySubject<i32> = ReplaySubject::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let _sub = subject.subscribe(Observer::next(move |v| seen_c.borrow_mut().push(*v)));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn replay_last_value_at_subscribe() {
        let subject: ReplaySubject<i32> = ReplaySubject::new();
        subject.next(1);
        subject.next(2);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let _sub = subject.subscribe(Observer::next(move |v| seen_c.borrow_mut().push(*v)));
        // Only the last value is replayed, synchronously.
        assert_eq!(*seen.borrow(), vec![2]);

        subject.next(3);
        assert_eq!(*seen.borrow(), vec![2, 3]);
    }

    #[test]
    fn replay_last_value_accessor() {
        let subject: ReplaySubject<i32> = ReplaySubject::new();
        assert_eq!(subject.last_value(), None);
        subject.next(7);
        assert_eq!(subject.last_value(), Some(7));
    }

    #[test]
    fn replay_subscriber_may_push_during_replay() {
        let subject: ReplaySubject<i32> = ReplaySubject::new();
        subject.next(1);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let subject_c = subject.clone();
        let _sub = subject.subscribe(Observer::next(move |v| {
            seen_c.borrow_mut().push(*v);
            if *v == 1 {
                subject_c.next(2);
            }
        }));
        // The re-entrant push lands before this observer is attached, but it
        // must not panic and it updates the replayed value.
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(subject.last_value(), Some(2));

        subject.next(3);
        assert_eq!(*seen.borrow(), vec![1, 3]);
    }

    #[test]
    fn replay_terminated_does_not_replay() {
        let subject: ReplaySubject<i32> = ReplaySubject::new();
        subject.next(1);
        subject.complete();

        let seen = Rc::new(Cell::new(0));
        let completed = Rc::new(Cell::new(false));
        let seen_c = seen.clone();
        let completed_c = completed.clone();
        let _sub = subject.subscribe(
            Observer::next(move |v: &i32| seen_c.set(*v)).on_complete(move || completed_c.set(true)),
        );
        // A terminated subject delivers only the terminal event.
        assert_eq!(seen.get(), 0);
        assert!(completed.get());
    }

    // ── ValueSubject ─────────────────────────────────────────────────

    #[test]
    fn value_subject_pushes_current_at_subscribe() {
        let subject = ValueSubject::new(10);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let _sub = subject.subscribe(Observer::next(move |v| seen_c.borrow_mut().push(*v)));
        assert_eq!(*seen.borrow(), vec![10]);

        subject.next(20);
        assert_eq!(*seen.borrow(), vec![10, 20]);
    }

    #[test]
    fn value_subject_subscriber_may_push_during_replay() {
        let subject = ValueSubject::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let subject_c = subject.clone();
        let _sub = subject.subscribe(Observer::next(move |v| {
            seen_c.borrow_mut().push(*v);
            if *v == 1 {
                subject_c.next(2);
            }
        }));
        // The re-entrant push lands before this observer is attached, but it
        // must not panic and it becomes the current value.
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(subject.value(), 2);

        subject.next(3);
        assert_eq!(*seen.borrow(), vec![1, 3]);
    }

    #[test]
    fn value_subject_value_accessor() {
        let subject = ValueSubject::new("a".to_string());
        assert_eq!(subject.value(), "a");
        subject.next("b".to_string());
        assert_eq!(subject.value(), "b");
    }

    #[test]
    fn value_subject_inert_after_complete() {
        let subject = ValueSubject::new(1);
        subject.complete();
        subject.next(2);
        // Value frozen at completion.
        assert_eq!(subject.value(), 1);
    }

    #[test]
    fn clones_share_state() {
        let subject = ValueSubject::new(0);
        let other = subject.clone();
        subject.next(5);
        assert_eq!(other.value(), 5);
    }
}
