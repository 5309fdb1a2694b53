//! Component definitions: templates plus component-scoped styles.
//!
//! A component is a named recipe for a control subtree. The registry is an
//! explicit object handed to whoever instantiates components; there is no
//! global component table.

use std::collections::HashMap;

use crate::control::tree::{ControlData, ControlId, ControlTree};
use crate::style::StyleSheet;

/// Errors from component instantiation.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("unknown component type {0:?}")]
    UnknownType(String),
}

/// A child-construction recipe: called with the tree and the freshly
/// inserted component root to build the internal subtree.
pub type Template = Box<dyn Fn(&mut ControlTree, ControlId)>;

/// A registered component: how to build it, and how to style it.
pub struct ComponentDef {
    template: Template,
    styles: StyleSheet,
}

impl ComponentDef {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            styles: StyleSheet::new(),
        }
    }

    /// Attach a component-scoped stylesheet (builder).
    pub fn with_styles(mut self, styles: StyleSheet) -> Self {
        self.styles = styles;
        self
    }
}

/// Maps component type names to definitions.
#[derive(Default)]
pub struct ComponentRegistry {
    defs: HashMap<String, ComponentDef>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component under a type name, replacing any previous
    /// definition.
    pub fn register(&mut self, type_name: impl Into<String>, def: ComponentDef) {
        self.defs.insert(type_name.into(), def);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.defs.contains_key(type_name)
    }

    /// Instantiate a component as a child of `parent`.
    ///
    /// The component root is inserted first, the template runs to build the
    /// internal subtree, and the component's stylesheet is applied over the
    /// result.
    pub fn create(
        &self,
        tree: &mut ControlTree,
        parent: ControlId,
        type_name: &str,
        id: Option<&str>,
    ) -> Result<ControlId, ComponentError> {
        let def = self
            .defs
            .get(type_name)
            .ok_or_else(|| ComponentError::UnknownType(type_name.to_string()))?;

        let mut data = ControlData::new(type_name);
        if let Some(id) = id {
            data = data.with_id(id);
        }
        let root = tree.insert_child(parent, data);
        (def.template)(tree, root);
        def.styles.apply(tree, root);
        Ok(root)
    }

    /// Instantiate a component with no parent (root-level).
    pub fn create_root(
        &self,
        tree: &mut ControlTree,
        type_name: &str,
        id: Option<&str>,
    ) -> Result<ControlId, ComponentError> {
        let def = self
            .defs
            .get(type_name)
            .ok_or_else(|| ComponentError::UnknownType(type_name.to_string()))?;

        let mut data = ControlData::new(type_name);
        if let Some(id) = id {
            data = data.with_id(id);
        }
        let root = tree.insert(data);
        (def.template)(tree, root);
        def.styles.apply(tree, root);
        Ok(root)
    }

    /// Tear down a component instance and its whole subtree.
    pub fn destroy(&self, tree: &mut ControlTree, root: ControlId) {
        tree.remove(root);
    }
}
