//! Reactive layer: observables, subjects, combinators, properties.
//!
//! Push-based value propagation for the control tree. All delivery is
//! synchronous and single-threaded — a `next` is a direct call chain into the
//! subscribers, never scheduled or deferred.
//!
//! - [`Subject`] — externally driven push source.
//! - [`ReplaySubject`] / [`ValueSubject`] — re-emit the last value to each new
//!   subscriber at subscribe time.
//! - [`CombinedObservable`] — aggregate N sources under Any/All policies.
//! - [`Property`] — change-notifying value, bindable to any observable.

pub mod combine;
pub mod observable;
pub mod property;
pub mod replay;

pub use combine::{ChildState, CombineSettings, CombinedObservable, Policy};
pub use observable::{Observable, Observer, StreamError, Subject, Subscription};
pub use property::Property;
pub use replay::{ReplaySubject, ValueSubject};
