//! CombinedObservable: aggregate N sources under Any/All policies.
//!
//! Each child source advances through a small state machine
//! (`Empty → HasValue → Completed`, or `Empty → CompletedEmpty`, with `Error`
//! as a trap state). Sources are attached one by one and the combinator is
//! then [sealed](CombinedObservable::seal); from that point on, every child
//! event recomputes the aggregate readiness in one pass: when the next-policy
//! is satisfied the mapper runs over the latest child values and the result
//! is emitted; when the complete-policy is satisfied the combinator
//! completes, releases every child subscription, and becomes permanently
//! inert. Before the seal, replaying sources record their values but cannot
//! satisfy a policy, so a combinator over value subjects never emits or
//! completes with sources still missing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::observable::{Observable, Observer, StreamError, Subject, Subscription};

/// Aggregation policy over child states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// At least one child satisfies the condition.
    Any,
    /// Every child satisfies the condition.
    All,
}

/// Per-child progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    /// No value yet.
    Empty,
    /// At least one value received.
    HasValue,
    /// Completed after producing a value.
    Completed,
    /// Completed without ever producing a value.
    CompletedEmpty,
    /// Errored. Trap state: the child no longer counts toward readiness.
    Error,
}

impl ChildState {
    fn has_value(self) -> bool {
        matches!(self, ChildState::HasValue | ChildState::Completed)
    }

    fn is_complete(self) -> bool {
        matches!(self, ChildState::Completed | ChildState::CompletedEmpty)
    }
}

/// Configuration for a [`CombinedObservable`].
#[derive(Debug, Clone, Copy)]
pub struct CombineSettings {
    /// Readiness condition for emitting mapped values.
    pub next: Policy,
    /// Readiness condition for completing the combinator.
    pub complete: Policy,
    /// Replay the last emitted value to new subscribers.
    pub replay: bool,
    /// Tolerate child errors instead of failing fast.
    pub allow_errors: bool,
    /// Unsubscribe each child after its first value (treat it as completed).
    pub one_value_per_source: bool,
}

impl Default for CombineSettings {
    fn default() -> Self {
        Self {
            next: Policy::All,
            complete: Policy::All,
            replay: false,
            allow_errors: false,
            one_value_per_source: false,
        }
    }
}

struct CombineCore<T, U> {
    settings: CombineSettings,
    mapper: Box<dyn Fn(&[Option<T>]) -> U>,
    states: Vec<ChildState>,
    latest: Vec<Option<T>>,
    subscriptions: Vec<Option<Subscription>>,
    last: Option<U>,
    /// Set by [`CombinedObservable::seal`]. Policies only fire once sealed.
    sealed: bool,
    /// Set once the complete-policy (or a fatal error) fires. Terminal.
    done: bool,
}

impl<T, U> CombineCore<T, U> {
    fn next_ready(&self) -> bool {
        match self.settings.next {
            Policy::All => self.states.iter().all(|s| s.has_value()),
            Policy::Any => self.states.iter().any(|s| s.has_value()),
        }
    }

    fn complete_ready(&self) -> bool {
        match self.settings.complete {
            Policy::All => self.states.iter().all(|s| s.is_complete()),
            Policy::Any => self.states.iter().any(|s| s.is_complete()),
        }
    }
}

/// Combines N observables of `T` into one observable of `U`.
///
/// Sources are attached with [`add_source`](CombinedObservable::add_source),
/// then attachment is finished with [`seal`](CombinedObservable::seal).
/// Replaying sources deliver their current value during attachment; those
/// values are recorded but the next/complete policies stay dormant until the
/// seal, so no emission or completion can happen with sources still missing.
pub struct CombinedObservable<T: Clone + 'static, U: Clone + 'static> {
    core: Rc<RefCell<CombineCore<T, U>>>,
    out: Subject<U>,
}

impl<T: Clone + 'static, U: Clone + 'static> CombinedObservable<T, U> {
    /// Create a combinator with no sources yet.
    pub fn new(settings: CombineSettings, mapper: impl Fn(&[Option<T>]) -> U + 'static) -> Self {
        Self {
            core: Rc::new(RefCell::new(CombineCore {
                settings,
                mapper: Box::new(mapper),
                states: Vec::new(),
                latest: Vec::new(),
                subscriptions: Vec::new(),
                last: None,
                sealed: false,
                done: false,
            })),
            out: Subject::new(),
        }
    }

    /// Attach a child source. Ignored after [`seal`](CombinedObservable::seal).
    pub fn add_source(&self, source: &dyn Observable<T>) {
        let index = {
            let mut core = self.core.borrow_mut();
            if core.done || core.sealed {
                return;
            }
            core.states.push(ChildState::Empty);
            core.latest.push(None);
            core.subscriptions.push(None);
            core.states.len() - 1
        };

        let weak = Rc::downgrade(&self.core);
        let out = self.out.clone();
        let weak_n = weak.clone();
        let out_n = out.clone();
        let weak_c = weak.clone();
        let out_c = out.clone();

        let observer = Observer::next(move |value: &T| {
            Self::on_child_next(&weak_n, &out_n, index, value);
        })
        .on_error(move |error: &StreamError| {
            Self::on_child_error(&weak, &out, index, error);
        })
        .on_complete(move || {
            Self::on_child_complete(&weak_c, &out_c, index);
        });

        let subscription = source.subscribe(observer);

        let mut core = self.core.borrow_mut();
        if core.done {
            // A child error during the synchronous replay failed the
            // combinator; release the just-created subscription too.
            drop(core);
            subscription.unsubscribe();
            subscriptionless_teardown(&self.core);
        } else if core.settings.one_value_per_source && core.states[index].is_complete() {
            // The child consumed its one value during the replay, before the
            // subscription existed to be taken.
            drop(core);
            subscription.unsubscribe();
        } else {
            core.subscriptions[index] = Some(subscription);
        }
    }

    /// Finish attachment. Until sealed, child values are recorded but the
    /// next/complete policies cannot fire; sealing evaluates them once over
    /// everything the replays delivered.
    pub fn seal(&self) {
        let (emit, complete) = {
            let mut core = self.core.borrow_mut();
            if core.sealed || core.done {
                return;
            }
            core.sealed = true;
            let mut emit = None;
            if core.next_ready() {
                let mapped = (core.mapper)(&core.latest);
                core.last = Some(mapped.clone());
                emit = Some(mapped);
            }
            let complete = core.complete_ready();
            if complete {
                core.done = true;
            }
            (emit, complete)
        };
        if let Some(value) = emit {
            self.out.next(value);
        }
        if complete {
            self.out.complete();
            subscriptionless_teardown(&self.core);
        }
    }

    /// The last emitted aggregate value, if any.
    pub fn last_value(&self) -> Option<U> {
        self.core.borrow().last.clone()
    }

    /// Whether the combinator has completed or errored.
    pub fn is_done(&self) -> bool {
        self.core.borrow().done
    }

    fn on_child_next(
        weak: &Weak<RefCell<CombineCore<T, U>>>,
        out: &Subject<U>,
        index: usize,
        value: &T,
    ) {
        let Some(core_rc) = weak.upgrade() else {
            return;
        };

        let mut emit = None;
        let mut complete = false;
        let mut drop_child = false;
        {
            let mut core = core_rc.borrow_mut();
            if core.done || core.states[index] == ChildState::Error {
                return;
            }
            // A one-value child that consumed its value during the
            // subscribe-time replay stays consumed even if its subscription
            // outlived the take.
            if core.settings.one_value_per_source && core.states[index].is_complete() {
                return;
            }
            core.latest[index] = Some(value.clone());
            if core.settings.one_value_per_source {
                core.states[index] = ChildState::Completed;
                drop_child = true;
            } else if core.states[index] == ChildState::Empty {
                core.states[index] = ChildState::HasValue;
            }

            if core.sealed {
                if core.next_ready() {
                    let mapped = (core.mapper)(&core.latest);
                    core.last = Some(mapped.clone());
                    emit = Some(mapped);
                }
                if core.complete_ready() {
                    core.done = true;
                    complete = true;
                }
            }
        }

        if drop_child {
            let sub = core_rc.borrow_mut().subscriptions[index].take();
            if let Some(sub) = sub {
                sub.unsubscribe();
            }
        }
        if let Some(value) = emit {
            out.next(value);
        }
        if complete {
            out.complete();
            subscriptionless_teardown(&core_rc);
        }
    }

    fn on_child_complete(weak: &Weak<RefCell<CombineCore<T, U>>>, out: &Subject<U>, index: usize) {
        let Some(core_rc) = weak.upgrade() else {
            return;
        };

        let complete = {
            let mut core = core_rc.borrow_mut();
            if core.done || core.states[index] == ChildState::Error {
                return;
            }
            core.states[index] = if core.states[index].has_value() {
                ChildState::Completed
            } else {
                ChildState::CompletedEmpty
            };
            if core.sealed && core.complete_ready() {
                core.done = true;
                true
            } else {
                false
            }
        };

        if complete {
            out.complete();
            subscriptionless_teardown(&core_rc);
        }
    }

    fn on_child_error(
        weak: &Weak<RefCell<CombineCore<T, U>>>,
        out: &Subject<U>,
        index: usize,
        error: &StreamError,
    ) {
        let Some(core_rc) = weak.upgrade() else {
            return;
        };

        let fatal = {
            let mut core = core_rc.borrow_mut();
            if core.done {
                return;
            }
            core.states[index] = ChildState::Error;
            if core.settings.allow_errors {
                false
            } else {
                core.done = true;
                true
            }
        };

        // Fail-fast: a child error on a non-tolerant combinator is terminal.
        if fatal {
            out.error(error.clone());
            subscriptionless_teardown(&core_rc);
        }
    }
}

/// Release every child subscription. Called after `done` is set; safe to call
/// repeatedly.
fn subscriptionless_teardown<T, U>(core_rc: &Rc<RefCell<CombineCore<T, U>>>) {
    let subscriptions: Vec<Subscription> = {
        let mut core = core_rc.borrow_mut();
        core.subscriptions.iter_mut().filter_map(Option::take).collect()
    };
    for subscription in subscriptions {
        subscription.unsubscribe();
    }
}

impl<T: Clone + 'static, U: Clone + 'static> Observable<U> for CombinedObservable<T, U> {
    fn subscribe(&self, mut observer: Observer<U>) -> Subscription {
        let replayed = {
            let core = self.core.borrow();
            if core.settings.replay && !core.done {
                core.last.clone()
            } else {
                None
            }
        };
        if let Some(value) = replayed {
            observer.notify_next(&value);
        }
        self.out.subscribe(observer)
    }
}
