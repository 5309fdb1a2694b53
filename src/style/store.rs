//! Per-control resolved style storage.
//!
//! A [`StyleStore`] holds the cascade's output for one control: a map from
//! canonical property name to the last value a style pass applied. Lookups
//! fall back to the schema default, then to the requested type's zero value,
//! so readers never see a missing property.
//!
//! A restyle begins with [`StyleStore::start_styling`], which marks every
//! stored value stale rather than clearing it. A stale value is invisible to
//! [`StyleStore::get`] but is revived without notification if the pass
//! re-applies the same value, so repeated identical passes are observably
//! silent.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::warn;

use crate::reactive::{Observable, Observer, Subject, Subscription};
use crate::style::schema::{canonical_name, StyleSchema};
use crate::style::value::{FromStyleValue, StyleValue};

struct StyleEntry {
    value: StyleValue,
    stale: bool,
    changes: Subject<StyleValue>,
}

/// Resolved style properties for a single control.
pub struct StyleStore {
    schema: Rc<StyleSchema>,
    entries: RefCell<HashMap<String, StyleEntry>>,
}

impl StyleStore {
    pub fn new(schema: Rc<StyleSchema>) -> Self {
        Self {
            schema,
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn schema(&self) -> &Rc<StyleSchema> {
        &self.schema
    }

    /// Begin a style pass: every stored value becomes stale. Values the pass
    /// does not re-apply stop being visible to [`StyleStore::get`].
    pub fn start_styling(&self) {
        for entry in self.entries.borrow_mut().values_mut() {
            entry.stale = true;
        }
    }

    /// Apply one declaration. Observers are notified only when the visible
    /// value actually changes; re-applying the value a stale entry already
    /// holds just revives it.
    pub fn set(&self, name: &str, value: StyleValue) {
        let canonical = canonical_name(name);
        let notify = {
            let mut entries = self.entries.borrow_mut();
            match entries.get_mut(&canonical) {
                Some(entry) => {
                    let changed = entry.value != value;
                    entry.value = value.clone();
                    entry.stale = false;
                    changed.then(|| entry.changes.clone())
                }
                None => {
                    let entry = StyleEntry {
                        value: value.clone(),
                        stale: false,
                        changes: Subject::new(),
                    };
                    let changes = entry.changes.clone();
                    entries.insert(canonical, entry);
                    Some(changes)
                }
            }
        };
        // Emit with the map borrow released; an observer may read back.
        if let Some(changes) = notify {
            changes.next(value);
        }
    }

    /// Read a property as `T`.
    ///
    /// Resolution order: live stored value, schema default, `T::default()`.
    /// Any dotted or flat spelling of the same name resolves identically
    /// (`"Background.Color"`, `"BackgroundColor"`, `"backgroundcolor"`).
    pub fn get<T: FromStyleValue>(&self, name: &str) -> T {
        let canonical = canonical_name(name);
        if let Some(entry) = self.entries.borrow().get(&canonical) {
            if !entry.stale {
                match T::from_style_value(&entry.value) {
                    Ok(value) => return value,
                    Err(err) => warn!(property = %canonical, %err, "style cast failed"),
                }
            }
        }
        self.schema
            .default_for(&canonical)
            .and_then(|default| T::from_style_value(default).ok())
            .unwrap_or_default()
    }

    /// The raw stored value, ignoring defaults. Stale entries read as absent.
    pub fn raw(&self, name: &str) -> Option<StyleValue> {
        let canonical = canonical_name(name);
        self.entries
            .borrow()
            .get(&canonical)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.value.clone())
    }

    /// Subscribe to changes of one property. The observer fires on every
    /// visible value change, not for stale-marking or revival.
    pub fn observe(&self, name: &str, observer: Observer<StyleValue>) -> Subscription {
        let canonical = canonical_name(name);
        let changes = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries.entry(canonical.clone()).or_insert_with(|| StyleEntry {
                value: self
                    .schema
                    .default_for(&canonical)
                    .cloned()
                    .unwrap_or(StyleValue::Int(0)),
                // Never applied by a pass, so invisible to get().
                stale: true,
                changes: Subject::new(),
            });
            entry.changes.clone()
        };
        changes.subscribe(observer)
    }
}
