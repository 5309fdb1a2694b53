//! The control tree: insert, remove, reparent, walk, visibility.

use std::collections::VecDeque;
use std::rc::Rc;

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::geometry::Rect;
use crate::reactive::Property;
use crate::style::{StyleSchema, StyleStore};

new_key_type! {
    /// Unique identifier for a control. Copy, lightweight (u64).
    pub struct ControlId;
}

/// Empty slice constant for returning when a control has no children.
const EMPTY_CHILDREN: &[ControlId] = &[];

/// Data associated with a single control.
pub struct ControlData {
    /// Control type name (e.g. "Button", "Panel"), matched by type selectors.
    pub type_name: String,
    /// Optional unique id (`#id` selector).
    pub id: Option<String>,
    /// Class tags (`.class` selector).
    classes: Vec<String>,
    /// Left edge, parent-relative.
    pub x: Property<i32>,
    /// Top edge, parent-relative.
    pub y: Property<i32>,
    pub width: Property<i32>,
    pub height: Property<i32>,
    /// Local visibility flag. Effective visibility also requires every
    /// ancestor to be visible; see [`ControlTree::is_effectively_visible`].
    pub visible: Property<bool>,
    pub enabled: Property<bool>,
    /// Resolved style output of the cascade. Rebound to the owning tree's
    /// schema when the control is inserted.
    pub styles: StyleStore,
}

impl ControlData {
    /// Create control data with the given type name and sensible defaults.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
            classes: Vec::new(),
            x: Property::new(0),
            y: Property::new(0),
            width: Property::new(0),
            height: Property::new(0),
            visible: Property::new(true),
            enabled: Property::new(true),
            styles: StyleStore::new(Rc::new(StyleSchema::empty())),
        }
    }

    /// Set the unique id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a single class tag (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Add multiple class tags (builder).
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for class in classes {
            let class = class.into();
            if !self.classes.contains(&class) {
                self.classes.push(class);
            }
        }
        self
    }

    /// Set the initial bounds (builder).
    pub fn with_bounds(self, bounds: Rect) -> Self {
        self.x.set(bounds.x);
        self.y.set(bounds.y);
        self.width.set(bounds.width);
        self.height.set(bounds.height);
        self
    }

    /// Check whether this control carries a class tag.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a class tag. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a class tag. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Toggle a class tag: add if absent, remove if present.
    pub fn toggle_class(&mut self, class: &str) {
        if self.has_class(class) {
            self.remove_class(class);
        } else {
            self.add_class(class);
        }
    }

    /// The control's parent-relative bounds as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x.get(),
            self.y.get(),
            self.width.get(),
            self.height.get(),
        )
    }
}

/// The control tree, backed by a slotmap arena.
///
/// All controls live in a single `SlotMap`. Parent/child relationships are
/// stored in secondary maps so that removal is O(subtree size) and lookup is
/// O(1). The tree owns the style schema every control's store resolves
/// defaults against.
pub struct ControlTree {
    controls: SlotMap<ControlId, ControlData>,
    children: SecondaryMap<ControlId, Vec<ControlId>>,
    parent: SecondaryMap<ControlId, ControlId>,
    root: Option<ControlId>,
    schema: Rc<StyleSchema>,
}

impl ControlTree {
    /// Create an empty tree over the given style schema.
    pub fn new(schema: Rc<StyleSchema>) -> Self {
        Self {
            controls: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
            schema,
        }
    }

    /// The schema shared by every control's style store.
    pub fn schema(&self) -> &Rc<StyleSchema> {
        &self.schema
    }

    /// Insert a root-level control (no parent).
    ///
    /// If no root has been set yet, this control becomes the root.
    pub fn insert(&mut self, mut data: ControlData) -> ControlId {
        data.styles = StyleStore::new(self.schema.clone());
        let id = self.controls.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a control as a child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: ControlId, mut data: ControlData) -> ControlId {
        debug_assert!(
            self.controls.contains_key(parent),
            "parent control does not exist"
        );
        data.styles = StyleStore::new(self.schema.clone());
        let id = self.controls.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        self.children
            .get_mut(parent)
            .expect("parent must have children vec")
            .push(id);
        id
    }

    /// Remove a control and all its descendants recursively.
    ///
    /// Returns the `ControlData` for the removed control, or `None` if it
    /// didn't exist.
    pub fn remove(&mut self, id: ControlId) -> Option<ControlData> {
        if !self.controls.contains_key(id) {
            return None;
        }

        // Detach from parent's children list.
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }

        if self.root == Some(id) {
            self.root = None;
        }

        // Collect all descendants (BFS) to remove them.
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                for &child in &kids {
                    to_remove.push_back(child);
                }
            }
            self.parent.remove(current);
            let data = self.controls.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Move `control` to become a child of `new_parent`.
    ///
    /// The control keeps its subtree intact. If it was previously a child of
    /// another parent, it is detached first.
    ///
    /// # Panics
    ///
    /// Panics (debug) if either `control` or `new_parent` does not exist.
    pub fn reparent(&mut self, control: ControlId, new_parent: ControlId) {
        debug_assert!(self.controls.contains_key(control), "control does not exist");
        debug_assert!(
            self.controls.contains_key(new_parent),
            "new_parent does not exist"
        );

        if let Some(old_parent) = self.parent.remove(control) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != control);
            }
        }

        self.parent.insert(control, new_parent);
        self.children
            .get_mut(new_parent)
            .expect("new_parent must have children vec")
            .push(control);
    }

    /// Get the parent of a control, if it has one.
    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a control. Returns an empty slice if the control
    /// has no children or does not exist.
    pub fn children(&self, id: ControlId) -> &[ControlId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the topmost ancestor.
    pub fn ancestors(&self, id: ControlId) -> Vec<ControlId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to a control's data.
    pub fn get(&self, id: ControlId) -> Option<&ControlData> {
        self.controls.get(id)
    }

    /// Mutable access to a control's data.
    pub fn get_mut(&mut self, id: ControlId) -> Option<&mut ControlData> {
        self.controls.get_mut(id)
    }

    /// The current root control, if set.
    pub fn root(&self) -> Option<ControlId> {
        self.root
    }

    /// Explicitly set the root control.
    pub fn set_root(&mut self, id: ControlId) {
        self.root = Some(id);
    }

    /// Number of controls in the tree.
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Whether the tree contains a control with the given id.
    pub fn contains(&self, id: ControlId) -> bool {
        self.controls.contains_key(id)
    }

    /// Whether `id` participates in the rooted tree: it is the root, or its
    /// ancestor chain ends at the root.
    pub fn is_attached(&self, id: ControlId) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        if id == root {
            return self.contains(id);
        }
        self.ancestors(id).last() == Some(&root)
    }

    /// Whether a control is visible for rendering purposes: it must be
    /// attached to the root and its own `visible` flag plus every ancestor's
    /// must be true. Detached controls are never effectively visible.
    pub fn is_effectively_visible(&self, id: ControlId) -> bool {
        if !self.is_attached(id) {
            return false;
        }
        let Some(data) = self.get(id) else {
            return false;
        };
        if !data.visible.get() {
            return false;
        }
        self.ancestors(id)
            .iter()
            .all(|&a| self.get(a).is_some_and(|d| d.visible.get()))
    }

    /// The absolute bounds of a control: its own parent-relative bounds
    /// translated by every ancestor's origin.
    pub fn absolute_bounds(&self, id: ControlId) -> Option<Rect> {
        let mut bounds = self.get(id)?.bounds();
        for ancestor in self.ancestors(id) {
            let data = self.get(ancestor)?;
            bounds = bounds.translated(data.x.get(), data.y.get());
        }
        Some(bounds)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: ControlId) -> Vec<ControlId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.controls.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            let kids = self.children(current);
            for &child in kids.iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Breadth-first traversal starting from `start`.
    pub fn walk_breadth_first(&self, start: ControlId) -> Vec<ControlId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            if !self.controls.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current) {
                queue.push_back(child);
            }
        }
        result
    }
}

impl Default for ControlTree {
    fn default() -> Self {
        Self::new(Rc::new(StyleSchema::standard()))
    }
}
