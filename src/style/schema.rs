//! Schema of known style properties and their default values.
//!
//! Defaults are keyed by canonical property name: lowercase, with every dot
//! removed. `"Background.Color"`, `"BackgroundColor"`, and
//! `"backgroundcolor"` all canonicalize to the same key, which is what makes
//! the hierarchical name fallback in the store work.

use std::collections::HashMap;

use crate::style::color::Color;
use crate::style::sides::Sides;
use crate::style::value::{LineKind, StyleValue};

/// Canonical form of a style property name.
pub fn canonical_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '.')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Known style properties with their seeded defaults.
#[derive(Debug, Clone, Default)]
pub struct StyleSchema {
    defaults: HashMap<String, StyleValue>,
}

impl StyleSchema {
    /// An empty schema with no registered properties.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard property set shared by all controls.
    pub fn standard() -> Self {
        let mut schema = Self::default();
        schema.register("Background.Color", StyleValue::Color(Color::TRANSPARENT));
        schema.register("Background.Image", StyleValue::Str(String::new()));
        schema.register("Border.Color", StyleValue::Color(Color::TRANSPARENT));
        schema.register("Border.Size", StyleValue::Sides(Sides::uniform(0)));
        schema.register("Border.Kind", StyleValue::Line(LineKind::Solid));
        schema.register("Color", StyleValue::Color(Color::BLACK));
        schema.register("Padding", StyleValue::Sides(Sides::uniform(0)));
        schema.register("Margin", StyleValue::Sides(Sides::uniform(0)));
        schema
    }

    /// Register a property default. The name is canonicalized.
    pub fn register(&mut self, name: &str, default: StyleValue) {
        self.defaults.insert(canonical_name(name), default);
    }

    /// Default for a property, if registered. `name` must already be
    /// canonical.
    pub fn default_for(&self, canonical: &str) -> Option<&StyleValue> {
        self.defaults.get(canonical)
    }

    /// Whether the schema knows this canonical name.
    pub fn contains(&self, canonical: &str) -> bool {
        self.defaults.contains_key(canonical)
    }

    /// Iterate all registered canonical names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defaults.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalization_strips_dots_and_case() {
        assert_eq!(canonical_name("Background.Color"), "backgroundcolor");
        assert_eq!(canonical_name("BackgroundColor"), "backgroundcolor");
        assert_eq!(canonical_name("backgroundcolor"), "backgroundcolor");
        assert_eq!(canonical_name("A.B.C"), "abc");
    }

    #[test]
    fn standard_defaults() {
        let schema = StyleSchema::standard();
        assert_eq!(
            schema.default_for("backgroundcolor"),
            Some(&StyleValue::Color(Color::TRANSPARENT))
        );
        assert_eq!(
            schema.default_for("padding"),
            Some(&StyleValue::Sides(Sides::uniform(0)))
        );
        assert_eq!(
            schema.default_for("borderkind"),
            Some(&StyleValue::Line(LineKind::Solid))
        );
        assert_eq!(schema.default_for("nonexistent"), None);
    }

    #[test]
    fn dotted_and_flat_registration_collide() {
        let mut schema = StyleSchema::empty();
        schema.register("Border.Size", StyleValue::Int(1));
        schema.register("BorderSize", StyleValue::Int(2));
        // Same canonical key, second registration wins.
        assert_eq!(schema.default_for("bordersize"), Some(&StyleValue::Int(2)));
    }
}
