//! The control paint pass.
//!
//! Each frame, every effectively visible control re-issues its background
//! and border draws through the [`ControlRenderer`] facade, passing the
//! handles it got last frame. The painter keeps a per-control snapshot of
//! what was drawn; when the resolved style or geometry changed it
//! invalidates the old handle so the backend patches the retained object,
//! and when nothing changed the facade skips the call entirely. Handles for
//! controls that disappeared are cleaned up by the facade's end-of-cycle
//! sweep.

use std::collections::{HashMap, HashSet};

use crate::geometry::Rect;
use crate::render::{ControlRenderer, DrawHandle, RenderBackend};
use crate::style::{Color, LineKind, Sides};

use super::tree::{ControlId, ControlTree};

#[derive(Clone, PartialEq)]
struct BackgroundSnapshot {
    rect: Rect,
    color: Color,
}

#[derive(Clone, PartialEq)]
struct BorderSnapshot {
    rect: Rect,
    color: Color,
    size: Sides<i32>,
    kind: LineKind,
}

#[derive(Default)]
struct DrawState {
    background: Option<DrawHandle>,
    background_snapshot: Option<BackgroundSnapshot>,
    border: Option<DrawHandle>,
    border_snapshot: Option<BorderSnapshot>,
}

/// Paints a control tree through a render facade, frame after frame.
#[derive(Default)]
pub struct Painter {
    states: HashMap<ControlId, DrawState>,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint one frame of the subtree under `root`.
    ///
    /// Controls are visited in depth-first order, so children draw over
    /// their parents.
    pub fn paint<B: RenderBackend>(
        &mut self,
        tree: &ControlTree,
        root: ControlId,
        renderer: &mut ControlRenderer<B>,
    ) {
        renderer.start_cycle();

        let mut painted = HashSet::new();
        for control in tree.walk_depth_first(root) {
            if !tree.is_effectively_visible(control) {
                continue;
            }
            self.paint_control(tree, control, renderer);
            painted.insert(control);
        }

        renderer.end_cycle();

        // Forget controls that were not painted; their handles were just
        // swept by end_cycle.
        self.states.retain(|id, _| painted.contains(id));
    }

    fn paint_control<B: RenderBackend>(
        &mut self,
        tree: &ControlTree,
        control: ControlId,
        renderer: &mut ControlRenderer<B>,
    ) {
        let Some(data) = tree.get(control) else {
            return;
        };
        let Some(rect) = tree.absolute_bounds(control) else {
            return;
        };

        let background = data.styles.get::<Color>("Background.Color");
        let border_color = data.styles.get::<Color>("Border.Color");
        let border_size = data.styles.get::<Sides<i32>>("Border.Size");
        let border_kind = data.styles.get::<LineKind>("Border.Kind");

        let state = self.states.entry(control).or_default();

        // Background fill.
        let snapshot = BackgroundSnapshot {
            rect,
            color: background,
        };
        if state.background_snapshot.as_ref() != Some(&snapshot) {
            if let Some(handle) = state.background {
                renderer.invalidate(handle);
            }
        }
        state.background = renderer.fill_rectangle(state.background, rect, background);
        state.background_snapshot = Some(snapshot);

        // Border, solid or patterned.
        let snapshot = BorderSnapshot {
            rect,
            color: border_color,
            size: border_size,
            kind: border_kind,
        };
        if state.border_snapshot.as_ref() != Some(&snapshot) {
            if let Some(handle) = state.border {
                renderer.invalidate(handle);
            }
        }
        state.border = if border_size.is_zero() {
            // Not re-issued, so the end-of-cycle sweep removes the old
            // border object.
            None
        } else {
            match border_kind {
                LineKind::Solid => {
                    renderer.draw_rectangle(state.border, rect, border_color, border_size)
                }
                kind => renderer.draw_rectangle_line(state.border, rect, border_color, kind),
            }
        };
        state.border_snapshot = Some(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::tree::ControlData;
    use crate::render::BatchRenderer;
    use crate::style::{Selector, Style, StyleSheet, StyleValue};

    fn setup() -> (ControlTree, ControlId, ControlId) {
        let mut tree = ControlTree::default();
        let root = tree.insert(
            ControlData::new("Window").with_bounds(Rect::new(0, 0, 800, 600)),
        );
        let button = tree.insert_child(
            root,
            ControlData::new("Button")
                .with_id("ok")
                .with_bounds(Rect::new(10, 10, 100, 30)),
        );
        (tree, root, button)
    }

    fn styled_sheet() -> StyleSheet {
        let mut sheet = StyleSheet::new();
        sheet.add(
            Selector::for_type("Button"),
            Style::new()
                .with_background_color(Color::rgb(0, 0, 255))
                .with_border_color(Color::BLACK)
                .with_border_size(Sides::uniform(1)),
        );
        sheet.add(
            Selector::for_type("Window"),
            Style::new().with_background_color(Color::rgb(240, 240, 240)),
        );
        sheet
    }

    fn renderer() -> ControlRenderer<BatchRenderer> {
        ControlRenderer::new(BatchRenderer::new(Rect::new(0, 0, 800, 600)))
    }

    #[test]
    fn first_frame_draws_backgrounds_and_borders() {
        let (tree, root, _button) = setup();
        styled_sheet().apply(&tree, root);

        let mut renderer = renderer();
        let mut painter = Painter::new();
        painter.paint(&tree, root, &mut renderer);

        // Window fill + button fill + 4 border edges.
        assert_eq!(renderer.backend().sprites().in_use(), 6);
        assert_eq!(renderer.backend().group_count(), 3);
    }

    #[test]
    fn unchanged_second_frame_is_stable() {
        let (tree, root, _button) = setup();
        styled_sheet().apply(&tree, root);

        let mut renderer = renderer();
        let mut painter = Painter::new();
        painter.paint(&tree, root, &mut renderer);
        let groups = renderer.backend().group_count();

        painter.paint(&tree, root, &mut renderer);
        assert_eq!(renderer.backend().group_count(), groups);
        assert_eq!(renderer.backend().sprites().in_use(), 6);
    }

    #[test]
    fn style_change_patches_without_leaking_objects() {
        let (tree, root, button) = setup();
        styled_sheet().apply(&tree, root);

        let mut renderer = renderer();
        let mut painter = Painter::new();
        painter.paint(&tree, root, &mut renderer);
        let groups = renderer.backend().group_count();

        tree.get(button)
            .unwrap()
            .styles
            .set("Background.Color", StyleValue::Color(Color::rgb(255, 0, 0)));
        painter.paint(&tree, root, &mut renderer);

        assert_eq!(renderer.backend().group_count(), groups, "patched, not re-added");
    }

    #[test]
    fn hidden_control_releases_its_draws() {
        let (tree, root, button) = setup();
        styled_sheet().apply(&tree, root);

        let mut renderer = renderer();
        let mut painter = Painter::new();
        painter.paint(&tree, root, &mut renderer);
        assert_eq!(renderer.backend().sprites().in_use(), 6);

        tree.get(button).unwrap().visible.set(false);
        painter.paint(&tree, root, &mut renderer);

        // Only the window background remains.
        assert_eq!(renderer.backend().sprites().in_use(), 1);
        assert_eq!(renderer.backend().group_count(), 1);

        tree.get(button).unwrap().visible.set(true);
        painter.paint(&tree, root, &mut renderer);
        assert_eq!(renderer.backend().sprites().in_use(), 6);
    }

    #[test]
    fn removed_control_is_swept() {
        let (mut tree, root, button) = setup();
        styled_sheet().apply(&tree, root);

        let mut renderer = renderer();
        let mut painter = Painter::new();
        painter.paint(&tree, root, &mut renderer);

        tree.remove(button);
        painter.paint(&tree, root, &mut renderer);
        assert_eq!(renderer.backend().group_count(), 1);
    }

    #[test]
    fn moving_a_control_keeps_handle_but_patches_geometry() {
        let (tree, root, button) = setup();
        styled_sheet().apply(&tree, root);

        let mut renderer = renderer();
        let mut painter = Painter::new();
        painter.paint(&tree, root, &mut renderer);
        let groups = renderer.backend().group_count();

        tree.get(button).unwrap().x.set(200);
        painter.paint(&tree, root, &mut renderer);
        assert_eq!(renderer.backend().group_count(), groups);
    }
}
