//! Styling: declarations, selectors, and the cascade.
//!
//! The pipeline runs in three stages: a [`StyleSheet`] holds `(selector,
//! style)` rules; [`StyleSheet::apply`] matches them against a control
//! subtree and writes the winning declarations into each control's
//! [`StyleStore`]; readers pull typed values back out with
//! [`StyleStore::get`], falling back to [`StyleSchema`] defaults.

pub mod color;
pub mod lexer;
pub mod schema;
pub mod selector;
pub mod sheet;
pub mod sides;
pub mod store;
pub mod value;

pub use color::{Color, ColorFormatError};
pub use schema::{canonical_name, StyleSchema};
pub use selector::Selector;
pub use sheet::{BackgroundStyle, BorderStyle, Style, StyleSheet};
pub use sides::{Sides, SidesFormatError};
pub use store::StyleStore;
pub use value::{CastError, FromStyleValue, LineKind, StyleValue};
