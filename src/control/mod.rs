//! Controls: the tree, components, and the paint pass.

pub mod component;
pub mod paint;
pub mod tree;

pub use component::{ComponentDef, ComponentError, ComponentRegistry, Template};
pub use paint::Painter;
pub use tree::{ControlData, ControlId, ControlTree};
