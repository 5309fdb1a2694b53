//! Render node lifecycle.
//!
//! A node is the unit of incremental rendering: one quad or polygon whose
//! attributes live in a layer slot. The node decides when it owns a slot at
//! all — only while it is visible, not deleted, and intersecting the layer's
//! virtual screen — and patches the slot in place for everything else.
//! Deletion is terminal and idempotent: the slot is released exactly once
//! and later mutations become no-ops.

use crate::geometry::{Point, Rect};
use crate::style::Color;

use super::layer::RenderLayer;
use super::RenderError;

/// The geometry a node contributes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// An axis-aligned quad.
    Sprite { width: i32, height: i32 },
    /// A polygon, points relative to the node position.
    Shape { points: Vec<Point> },
}

/// One primitive tracked against a layer slot.
pub struct RenderNode {
    kind: NodeKind,
    position: Point,
    color: Color,
    paint_layer: f32,
    /// Normalized texture rect `[u0, v0, u1, v1]`; zeroes for shapes.
    uv_rect: [f32; 4],
    visible: bool,
    deleted: bool,
    slot: Option<u32>,
}

impl RenderNode {
    /// A detached node: no slot until [`attach`](RenderNode::attach).
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            position: Point::new(0, 0),
            color: Color::WHITE,
            paint_layer: 0.0,
            uv_rect: [0.0; 4],
            visible: true,
            deleted: false,
            slot: None,
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_paint_layer(mut self, paint_layer: f32) -> Self {
        self.paint_layer = paint_layer;
        self
    }

    pub fn with_uv(mut self, uv_rect: [f32; 4]) -> Self {
        self.uv_rect = uv_rect;
        self
    }

    /// The node's bounding rectangle in layer coordinates.
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            NodeKind::Sprite { width, height } => {
                Rect::new(self.position.x, self.position.y, *width, *height)
            }
            NodeKind::Shape { points } => {
                let mut min_x = i32::MAX;
                let mut min_y = i32::MAX;
                let mut max_x = i32::MIN;
                let mut max_y = i32::MIN;
                for p in points {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                if points.is_empty() {
                    return Rect::new(self.position.x, self.position.y, 0, 0);
                }
                Rect::new(
                    self.position.x + min_x,
                    self.position.y + min_y,
                    max_x - min_x,
                    max_y - min_y,
                )
            }
        }
    }

    fn on_screen(&self, layer: &RenderLayer) -> bool {
        self.bounds().intersects(layer.screen())
    }

    /// Whether this node currently contributes geometry to the GPU.
    pub fn is_visible_to_gpu(&self) -> bool {
        self.slot.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn slot(&self) -> Option<u32> {
        self.slot
    }

    /// Take a slot if the node should be drawn right now.
    pub fn attach(&mut self, layer: &RenderLayer) -> Result<(), RenderError> {
        self.sync(layer)
    }

    pub fn set_visible(&mut self, layer: &RenderLayer, visible: bool) -> Result<(), RenderError> {
        if self.deleted {
            return Ok(());
        }
        self.visible = visible;
        self.sync(layer)
    }

    /// Move the node. Culling is re-checked first: the move may pull the
    /// node on-screen (allocate), push it off-screen (release), or patch the
    /// existing slot in place.
    pub fn set_position(&mut self, layer: &RenderLayer, position: Point) -> Result<(), RenderError> {
        if self.deleted {
            return Ok(());
        }
        self.position = position;
        self.sync(layer)?;
        if let Some(slot) = self.slot {
            layer.update_positions(slot, &self.vertex_positions(layer));
        }
        Ok(())
    }

    /// Replace the node's geometry, keeping its slot when it stays visible.
    pub fn set_kind(&mut self, layer: &RenderLayer, kind: NodeKind) -> Result<(), RenderError> {
        if self.deleted {
            return Ok(());
        }
        self.kind = kind;
        self.sync(layer)?;
        if let Some(slot) = self.slot {
            layer.update_positions(slot, &self.vertex_positions(layer));
        }
        Ok(())
    }

    pub fn set_color(&mut self, layer: &RenderLayer, color: Color) {
        if self.deleted {
            return;
        }
        self.color = color;
        if let Some(slot) = self.slot {
            layer.update_color(slot, color);
        }
    }

    pub fn set_paint_layer(&mut self, layer: &RenderLayer, paint_layer: f32) {
        if self.deleted {
            return;
        }
        self.paint_layer = paint_layer;
        if let Some(slot) = self.slot {
            layer.update_paint(slot, paint_layer);
        }
    }

    pub fn set_uv(&mut self, layer: &RenderLayer, uv_rect: [f32; 4]) {
        if self.deleted {
            return;
        }
        self.uv_rect = uv_rect;
        if let Some(slot) = self.slot {
            layer.update_uv(slot, &self.vertex_uvs(layer));
        }
    }

    /// Terminal, idempotent teardown. The slot is released exactly once.
    pub fn delete(&mut self, layer: &RenderLayer) {
        if self.deleted {
            return;
        }
        self.deleted = true;
        if let Some(slot) = self.slot.take() {
            layer.remove(slot);
        }
    }

    /// Reconcile slot ownership with the node's current state.
    fn sync(&mut self, layer: &RenderLayer) -> Result<(), RenderError> {
        let wants_slot = self.visible && !self.deleted && self.on_screen(layer);
        match (wants_slot, self.slot) {
            (true, None) => {
                let slot = layer.add(
                    &self.vertex_positions(layer),
                    self.color,
                    self.paint_layer,
                    &self.vertex_uvs(layer),
                )?;
                self.slot = Some(slot);
            }
            (false, Some(slot)) => {
                layer.remove(slot);
                self.slot = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn vertex_positions(&self, layer: &RenderLayer) -> Vec<f32> {
        let verts = layer.vertices_per_element() as usize;
        let (px, py) = (self.position.x as f32, self.position.y as f32);
        match &self.kind {
            NodeKind::Sprite { width, height } => {
                let (w, h) = (*width as f32, *height as f32);
                vec![px, py, px + w, py, px + w, py + h, px, py + h]
            }
            NodeKind::Shape { points } => {
                debug_assert!(points.len() <= verts, "shape exceeds layer vertex budget");
                let mut out = Vec::with_capacity(verts * 2);
                for p in points {
                    out.push(px + p.x as f32);
                    out.push(py + p.y as f32);
                }
                // Pad with the last point so unused vertices degenerate.
                let last = points.last().copied().unwrap_or(Point::new(0, 0));
                while out.len() < verts * 2 {
                    out.push(px + last.x as f32);
                    out.push(py + last.y as f32);
                }
                out
            }
        }
    }

    fn vertex_uvs(&self, layer: &RenderLayer) -> Vec<f32> {
        let verts = layer.vertices_per_element() as usize;
        match &self.kind {
            NodeKind::Sprite { .. } => {
                let [u0, v0, u1, v1] = self.uv_rect;
                vec![u0, v0, u1, v0, u1, v1, u0, v1]
            }
            NodeKind::Shape { .. } => vec![0.0; verts * 2],
        }
    }
}
