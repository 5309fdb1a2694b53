//! Push-based observable primitives: Observer, Subscription, Subject.
//!
//! Everything here is single-threaded and synchronous: `next` walks the
//! subscriber list in a direct call chain, with re-entrant pushes queued so a
//! callback that feeds values back into the same subject cannot recurse into
//! another dispatch pass. Subscriptions are torn down explicitly via
//! [`Subscription::unsubscribe`]; dropping a subscription does nothing.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// An error pushed through an observable stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct StreamError(pub String);

impl StreamError {
    /// Create a stream error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// The receiving end of a subscription: a `next` callback plus optional
/// `error` and `complete` callbacks.
pub struct Observer<T> {
    on_next: Box<dyn FnMut(&T)>,
    on_error: Option<Box<dyn FnMut(&StreamError)>>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl<T> Observer<T> {
    /// Create an observer from a `next` callback.
    pub fn next(f: impl FnMut(&T) + 'static) -> Self {
        Self {
            on_next: Box::new(f),
            on_error: None,
            on_complete: None,
        }
    }

    /// Attach an error callback (builder).
    pub fn on_error(mut self, f: impl FnMut(&StreamError) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Attach a completion callback (builder).
    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Deliver a value to this observer.
    pub fn notify_next(&mut self, value: &T) {
        (self.on_next)(value);
    }

    /// Deliver an error to this observer, if it cares.
    pub fn notify_error(&mut self, error: &StreamError) {
        if let Some(f) = &mut self.on_error {
            f(error);
        }
    }

    /// Deliver completion to this observer, if it cares.
    pub fn notify_complete(&mut self) {
        if let Some(f) = &mut self.on_complete {
            f();
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Handle representing one observer's registration with a source.
///
/// Teardown is explicit: call [`unsubscribe`](Subscription::unsubscribe).
/// Dropping the handle leaves the observer attached.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription with the given cancel action.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription to an already-terminated source; unsubscribing is a no-op.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Detach the observer from its source.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Observable trait
// ---------------------------------------------------------------------------

/// A push source of `T` values.
pub trait Observable<T> {
    /// Register an observer. Sources that already terminated deliver the
    /// terminal event synchronously and return an empty subscription.
    fn subscribe(&self, observer: Observer<T>) -> Subscription;
}

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum SourceState {
    Open,
    Completed,
    Errored(StreamError),
}

enum QueuedEvent<T> {
    Next(T),
    Error(StreamError),
    Complete,
}

struct SubjectCore<T> {
    observers: Vec<(u64, Rc<RefCell<Observer<T>>>)>,
    next_key: u64,
    state: SourceState,
    /// True while a dispatch loop is draining the queue. Re-entrant pushes
    /// enqueue and return so only one loop runs at a time.
    emitting: bool,
    queue: VecDeque<QueuedEvent<T>>,
}

/// An observable whose values are pushed in externally via [`Subject::next`],
/// [`Subject::error`], and [`Subject::complete`].
///
/// Cheap to clone — clones share the same subscriber list. Once completed or
/// errored the subject is inert: further pushes are ignored and late
/// subscribers receive the terminal event immediately.
pub struct Subject<T> {
    core: Rc<RefCell<SubjectCore<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subject<T> {
    /// Create an open subject with no observers.
    pub fn new() -> Self {
        Self {
            core: Rc::new(RefCell::new(SubjectCore {
                observers: Vec::new(),
                next_key: 0,
                state: SourceState::Open,
                emitting: false,
                queue: VecDeque::new(),
            })),
        }
    }

    /// Push a value to all observers.
    pub fn next(&self, value: T) {
        self.push(QueuedEvent::Next(value));
    }

    /// Push an error; the subject becomes permanently inert.
    pub fn error(&self, error: StreamError) {
        self.push(QueuedEvent::Error(error));
    }

    /// Complete the subject; it becomes permanently inert.
    pub fn complete(&self) {
        self.push(QueuedEvent::Complete);
    }

    /// Whether the subject has completed or errored.
    pub fn is_terminated(&self) -> bool {
        self.core.borrow().state != SourceState::Open
    }

    /// Number of currently attached observers.
    pub fn observer_count(&self) -> usize {
        self.core.borrow().observers.len()
    }

    fn push(&self, event: QueuedEvent<T>) {
        {
            let mut core = self.core.borrow_mut();
            if core.state != SourceState::Open {
                return;
            }
            core.queue.push_back(event);
            if core.emitting {
                return;
            }
            core.emitting = true;
        }
        self.drain();
        self.core.borrow_mut().emitting = false;
    }

    /// Dispatch queued events one at a time. The core borrow is released
    /// before any observer callback runs, so callbacks may subscribe,
    /// unsubscribe, or push more events.
    fn drain(&self) {
        loop {
            let event = {
                let mut core = self.core.borrow_mut();
                if core.state != SourceState::Open {
                    core.queue.clear();
                    return;
                }
                match core.queue.pop_front() {
                    Some(event) => event,
                    None => return,
                }
            };

            match event {
                QueuedEvent::Next(value) => {
                    for observer in self.snapshot() {
                        observer.borrow_mut().notify_next(&value);
                    }
                }
                QueuedEvent::Error(error) => {
                    self.core.borrow_mut().state = SourceState::Errored(error.clone());
                    for observer in self.snapshot() {
                        observer.borrow_mut().notify_error(&error);
                    }
                    self.core.borrow_mut().observers.clear();
                }
                QueuedEvent::Complete => {
                    self.core.borrow_mut().state = SourceState::Completed;
                    for observer in self.snapshot() {
                        observer.borrow_mut().notify_complete();
                    }
                    self.core.borrow_mut().observers.clear();
                }
            }
        }
    }

    fn snapshot(&self) -> Vec<Rc<RefCell<Observer<T>>>> {
        self.core
            .borrow()
            .observers
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect()
    }
}

impl<T: 'static> Observable<T> for Subject<T> {
    fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let terminal = {
            let core = self.core.borrow();
            match core.state {
                SourceState::Open => None,
                _ => Some(core.state.clone()),
            }
        };

        // Late subscribers to a terminated subject get the terminal event
        // synchronously.
        if let Some(state) = terminal {
            let mut observer = observer;
            match state {
                SourceState::Completed => observer.notify_complete(),
                SourceState::Errored(error) => observer.notify_error(&error),
                SourceState::Open => unreachable!(),
            }
            return Subscription::empty();
        }

        let key = {
            let mut core = self.core.borrow_mut();
            let key = core.next_key;
            core.next_key += 1;
            core.observers.push((key, Rc::new(RefCell::new(observer))));
            key
        };

        let weak: Weak<RefCell<SubjectCore<T>>> = Rc::downgrade(&self.core);
        Subscription::new(move || {
            if let Some(core) = weak.upgrade() {
                core.borrow_mut().observers.retain(|(k, _)| *k != key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn next_reaches_observer() {
        let subject: Subject<i32> = Subject::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let _sub = subject.subscribe(Observer::next(move |v| seen_c.borrow_mut().push(*v)));

        subject.next(1);
        subject.next(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn multiple_observers() {
        let subject: Subject<i32> = Subject::new();
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let a_c = a.clone();
        let b_c = b.clone();
        let _s1 = subject.subscribe(Observer::next(move |v| a_c.set(*v)));
        let _s2 = subject.subscribe(Observer::next(move |v| b_c.set(*v * 10)));

        subject.next(3);
        assert_eq!(a.get(), 3);
        assert_eq!(b.get(), 30);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let subject: Subject<i32> = Subject::new();
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        let sub = subject.subscribe(Observer::next(move |_| count_c.set(count_c.get() + 1)));

        subject.next(1);
        sub.unsubscribe();
        subject.next(2);
        assert_eq!(count.get(), 1);
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn complete_notifies_and_terminates() {
        let subject: Subject<i32> = Subject::new();
        let completed = Rc::new(Cell::new(false));
        let completed_c = completed.clone();
        let _sub = subject.subscribe(
            Observer::next(|_: &i32| {}).on_complete(move || completed_c.set(true)),
        );

        subject.complete();
        assert!(completed.get());
        assert!(subject.is_terminated());

        // Inert: further pushes are no-ops.
        subject.next(99);
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn error_notifies_error_handler() {
        let subject: Subject<i32> = Subject::new();
        let message = Rc::new(RefCell::new(String::new()));
        let message_c = message.clone();
        let _sub = subject.subscribe(
            Observer::next(|_: &i32| {}).on_error(move |e| *message_c.borrow_mut() = e.0.clone()),
        );

        subject.error(StreamError::new("boom"));
        assert_eq!(*message.borrow(), "boom");
        assert!(subject.is_terminated());
    }

    #[test]
    fn late_subscriber_sees_completion() {
        let subject: Subject<i32> = Subject::new();
        subject.complete();

        let completed = Rc::new(Cell::new(false));
        let completed_c = completed.clone();
        let _sub = subject.subscribe(
            Observer::next(|_: &i32| {}).on_complete(move || completed_c.set(true)),
        );
        assert!(completed.get());
    }

    #[test]
    fn late_subscriber_sees_error() {
        let subject: Subject<i32> = Subject::new();
        subject.error(StreamError::new("gone"));

        let seen = Rc::new(Cell::new(false));
        let seen_c = seen.clone();
        let _sub =
            subject.subscribe(Observer::next(|_: &i32| {}).on_error(move |_| seen_c.set(true)));
        assert!(seen.get());
    }

    #[test]
    fn reentrant_next_is_queued_not_recursive() {
        let subject: Subject<i32> = Subject::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let subject_c = subject.clone();
        let _sub = subject.subscribe(Observer::next(move |v| {
            seen_c.borrow_mut().push(*v);
            if *v < 3 {
                subject_c.next(*v + 1);
            }
        }));

        subject.next(1);
        // Each re-entrant push is dispatched after the current value finishes,
        // in order.
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn unsubscribe_during_dispatch() {
        let subject: Subject<i32> = Subject::new();
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();

        let sub_holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let holder_c = sub_holder.clone();
        let sub = subject.subscribe(Observer::next(move |_| {
            count_c.set(count_c.get() + 1);
            // Tear ourselves down on first delivery.
            if let Some(sub) = holder_c.borrow_mut().take() {
                sub.unsubscribe();
            }
        }));
        *sub_holder.borrow_mut() = Some(sub);

        subject.next(1);
        subject.next(2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn drop_without_unsubscribe_keeps_observer() {
        let subject: Subject<i32> = Subject::new();
        let count = Rc::new(Cell::new(0));
        let count_c = count.clone();
        {
            let _sub = subject.subscribe(Observer::next(move |_| count_c.set(count_c.get() + 1)));
            // Subscription dropped here without unsubscribe.
        }
        subject.next(1);
        assert_eq!(count.get(), 1, "teardown is explicit, not drop-based");
    }
}
