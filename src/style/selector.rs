//! Selectors: predicates over controls with cascade priority.
//!
//! A selector matches a control by id, class, or type name, optionally
//! negated or anchored to a matching direct parent. Each selector carries an
//! integer priority used to order the cascade (higher wins), and selectors
//! are structurally comparable so a style sheet can merge declarations
//! registered under an equal selector key.

use crate::control::tree::{ControlId, ControlTree};

/// Priority contributed by one type selector.
const TYPE_PRIORITY: u32 = 1;
/// Priority contributed by one class selector.
const CLASS_PRIORITY: u32 = 10;
/// Priority contributed by one id selector.
const ID_PRIORITY: u32 = 100;

/// A style rule predicate.
///
/// Compose with the builder functions: [`Selector::for_id`],
/// [`Selector::for_class`], [`Selector::for_type`], [`Selector::not`],
/// [`Selector::child`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Matches the control with this id (`#id`).
    Id(String),
    /// Matches controls carrying this class tag (`.class`).
    Class(String),
    /// Matches controls of this type name (`Button`).
    Type(String),
    /// Inverts the wrapped selector, preserving its priority.
    Not(Box<Selector>),
    /// Matches when `child` matches the control and `parent` matches its
    /// direct parent (`A > B`).
    Child {
        parent: Box<Selector>,
        child: Box<Selector>,
    },
}

impl Selector {
    /// Selector matching the control with the given id.
    pub fn for_id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    /// Selector matching controls carrying the given class tag.
    pub fn for_class(class: impl Into<String>) -> Self {
        Selector::Class(class.into())
    }

    /// Selector matching controls of the given type name.
    pub fn for_type(type_name: impl Into<String>) -> Self {
        Selector::Type(type_name.into())
    }

    /// Negate a selector. The wrapped priority is preserved.
    pub fn not(inner: Selector) -> Self {
        Selector::Not(Box::new(inner))
    }

    /// Child-combinator selector: `parent > child`.
    pub fn child(parent: Selector, child: Selector) -> Self {
        Selector::Child {
            parent: Box::new(parent),
            child: Box::new(child),
        }
    }

    /// Cascade priority. Higher wins; a child combinator accumulates both
    /// halves, negation preserves the wrapped priority.
    pub fn priority(&self) -> u32 {
        match self {
            Selector::Id(_) => ID_PRIORITY,
            Selector::Class(_) => CLASS_PRIORITY,
            Selector::Type(_) => TYPE_PRIORITY,
            Selector::Not(inner) => inner.priority(),
            Selector::Child { parent, child } => parent.priority() + child.priority(),
        }
    }

    /// Whether this selector matches `control`.
    ///
    /// The tree provides ancestry context for child combinators.
    pub fn matches(&self, tree: &ControlTree, control: ControlId) -> bool {
        let Some(data) = tree.get(control) else {
            return false;
        };
        match self {
            Selector::Id(id) => data.id.as_deref() == Some(id.as_str()),
            Selector::Class(class) => data.has_class(class),
            Selector::Type(type_name) => data.type_name == *type_name,
            Selector::Not(inner) => !inner.matches(tree, control),
            Selector::Child { parent, child } => {
                child.matches(tree, control)
                    && tree
                        .parent(control)
                        .is_some_and(|p| parent.matches(tree, p))
            }
        }
    }
}
