//! Style declarations and the cascade.
//!
//! A [`Style`] is a sparse bag of declarations: only the fields a rule
//! actually sets are present, so merging two styles overlays the later one's
//! declarations without disturbing the rest. A [`StyleSheet`] is an ordered
//! list of `(selector, style)` rules; [`StyleSheet::apply`] runs the cascade
//! over a control subtree.
//!
//! Cascade order: matching rules are sorted by selector priority, then by
//! registration order within equal priority, and applied low to high. Each
//! declaration overwrites the previous one in the control's store, so the
//! highest-priority rule wins per property while lower-priority rules still
//! fill the properties it leaves unset.

use crate::control::tree::{ControlId, ControlTree};
use crate::style::color::Color;
use crate::style::schema::canonical_name;
use crate::style::selector::Selector;
use crate::style::sides::Sides;
use crate::style::value::{LineKind, StyleValue};

/// Background declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundStyle {
    pub color: Option<Color>,
    pub image: Option<String>,
}

/// Border declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorderStyle {
    pub color: Option<Color>,
    pub size: Option<Sides<i32>>,
    pub kind: Option<LineKind>,
}

/// A sparse set of style declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub background: BackgroundStyle,
    pub border: BorderStyle,
    pub color: Option<Color>,
    pub padding: Option<Sides<i32>>,
    pub margin: Option<Sides<i32>>,
    /// Declarations outside the fixed set, as `(name, value)` pairs in
    /// insertion order.
    custom: Vec<(String, StyleValue)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background.color = Some(color);
        self
    }

    pub fn with_background_image(mut self, image: impl Into<String>) -> Self {
        self.background.image = Some(image.into());
        self
    }

    pub fn with_border_color(mut self, color: Color) -> Self {
        self.border.color = Some(color);
        self
    }

    pub fn with_border_size(mut self, size: Sides<i32>) -> Self {
        self.border.size = Some(size);
        self
    }

    pub fn with_border_kind(mut self, kind: LineKind) -> Self {
        self.border.kind = Some(kind);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_padding(mut self, padding: Sides<i32>) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn with_margin(mut self, margin: Sides<i32>) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Add a declaration outside the fixed set.
    pub fn with_declaration(mut self, name: impl Into<String>, value: StyleValue) -> Self {
        self.custom.push((name.into(), value));
        self
    }

    /// Overlay `other`: its present declarations replace this style's.
    pub fn merge(&mut self, other: &Style) {
        merge_option(&mut self.background.color, &other.background.color);
        merge_option(&mut self.background.image, &other.background.image);
        merge_option(&mut self.border.color, &other.border.color);
        merge_option(&mut self.border.size, &other.border.size);
        merge_option(&mut self.border.kind, &other.border.kind);
        merge_option(&mut self.color, &other.color);
        merge_option(&mut self.padding, &other.padding);
        merge_option(&mut self.margin, &other.margin);
        for (name, value) in &other.custom {
            let key = canonical_name(name);
            match self
                .custom
                .iter_mut()
                .find(|(existing, _)| canonical_name(existing) == key)
            {
                Some(slot) => slot.1 = value.clone(),
                None => self.custom.push((name.clone(), value.clone())),
            }
        }
    }

    /// Present declarations as `(dotted name, value)` pairs, fixed fields
    /// first, then custom declarations in insertion order.
    pub fn declarations(&self) -> Vec<(String, StyleValue)> {
        let mut out = Vec::new();
        if let Some(color) = self.background.color {
            out.push(("Background.Color".into(), StyleValue::Color(color)));
        }
        if let Some(image) = &self.background.image {
            out.push(("Background.Image".into(), StyleValue::Str(image.clone())));
        }
        if let Some(color) = self.border.color {
            out.push(("Border.Color".into(), StyleValue::Color(color)));
        }
        if let Some(size) = self.border.size {
            out.push(("Border.Size".into(), StyleValue::Sides(size)));
        }
        if let Some(kind) = self.border.kind {
            out.push(("Border.Kind".into(), StyleValue::Line(kind)));
        }
        if let Some(color) = self.color {
            out.push(("Color".into(), StyleValue::Color(color)));
        }
        if let Some(padding) = self.padding {
            out.push(("Padding".into(), StyleValue::Sides(padding)));
        }
        if let Some(margin) = self.margin {
            out.push(("Margin".into(), StyleValue::Sides(margin)));
        }
        for (name, value) in &self.custom {
            out.push((name.clone(), value.clone()));
        }
        out
    }
}

fn merge_option<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if let Some(value) = source {
        *target = Some(value.clone());
    }
}

struct Rule {
    selector: Selector,
    style: Style,
    /// Registration order, the tie-break within equal selector priority.
    order: u64,
}

/// An ordered collection of style rules.
#[derive(Default)]
pub struct StyleSheet {
    rules: Vec<Rule>,
    next_order: u64,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. If a rule with a structurally equal selector already
    /// exists, the new declarations merge into it (later declarations win)
    /// and its original position in the cascade is kept.
    pub fn add(&mut self, selector: Selector, style: Style) {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.selector == selector) {
            existing.style.merge(&style);
            return;
        }
        self.rules.push(Rule {
            selector,
            style,
            order: self.next_order,
        });
        self.next_order += 1;
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the cascade over the subtree rooted at `root`.
    ///
    /// Every control in the subtree enters a fresh style pass; its previous
    /// values go stale and only declarations from currently matching rules
    /// come back. Applying the same sheet twice in a row produces no
    /// observable changes.
    pub fn apply(&self, tree: &ControlTree, root: ControlId) {
        for control in tree.walk_depth_first(root) {
            self.apply_to(tree, control);
        }
    }

    fn apply_to(&self, tree: &ControlTree, control: ControlId) {
        let Some(data) = tree.get(control) else {
            return;
        };
        data.styles.start_styling();

        let mut matching: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|rule| rule.selector.matches(tree, control))
            .collect();
        // Ascending sort plus overwrite-in-order makes the highest priority
        // rule land last, and therefore win.
        matching.sort_by_key(|rule| (rule.selector.priority(), rule.order));

        for rule in matching {
            for (name, value) in rule.style.declarations() {
                data.styles.set(&name, value);
            }
        }
    }
}
