//! Render layers: slot-parallel attribute buffers per primitive kind.

use crate::geometry::Rect;
use crate::style::Color;

use super::buffer::{AttributeBuffer, IndexBuffer, Topology};
use super::RenderError;

/// What a layer draws, which fixes its vertex count per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Textured quads: four vertices per element.
    Sprite,
    /// Polygons with up to `max_vertices` points, drawn with primitive
    /// restart.
    Shape { max_vertices: u32 },
}

impl LayerKind {
    pub fn vertices_per_element(self) -> u32 {
        match self {
            LayerKind::Sprite => 4,
            LayerKind::Shape { max_vertices } => max_vertices,
        }
    }

    fn topology(self) -> Topology {
        match self {
            LayerKind::Sprite => Topology::Quads,
            LayerKind::Shape { max_vertices } => Topology::Polygons { max_vertices },
        }
    }
}

/// One primitive kind's worth of GPU state: position, color, paint-layer and
/// UV attribute buffers that allocate in lockstep, plus the index stream.
///
/// The invariant is that an element occupies the same slot in every buffer.
/// Allocation verifies it and reports [`RenderError::SlotMismatch`] if the
/// buffers ever disagree; that error is fatal to the render pass.
pub struct RenderLayer {
    kind: LayerKind,
    /// The virtual screen rectangle nodes are culled against.
    screen: Rect,
    positions: AttributeBuffer,
    colors: AttributeBuffer,
    paint: AttributeBuffer,
    uv: AttributeBuffer,
    indices: IndexBuffer,
}

impl RenderLayer {
    pub fn new(kind: LayerKind, screen: Rect, capacity: u32) -> Self {
        let verts = kind.vertices_per_element() as usize;
        Self {
            kind,
            screen,
            positions: AttributeBuffer::new(verts * 2, capacity),
            colors: AttributeBuffer::new(verts * 4, capacity),
            paint: AttributeBuffer::new(verts, capacity),
            uv: AttributeBuffer::new(verts * 2, capacity),
            indices: IndexBuffer::new(kind.topology()),
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    pub fn vertices_per_element(&self) -> u32 {
        self.kind.vertices_per_element()
    }

    /// Allocate one element across all attribute buffers.
    ///
    /// `positions` and `uv` carry two floats per vertex; the color and paint
    /// layer are broadcast to every vertex.
    pub fn add(
        &self,
        positions: &[f32],
        color: Color,
        paint_layer: f32,
        uv: &[f32],
    ) -> Result<u32, RenderError> {
        let verts = self.vertices_per_element() as usize;
        debug_assert_eq!(positions.len(), verts * 2);
        debug_assert_eq!(uv.len(), verts * 2);

        let slot = self.positions.add(positions)?;
        let color_slot = self.colors.add(&broadcast_color(color, verts))?;
        let paint_slot = self.paint.add(&vec![paint_layer; verts])?;
        let uv_slot = self.uv.add(uv)?;

        for got in [color_slot, paint_slot, uv_slot] {
            if got != slot {
                return Err(RenderError::SlotMismatch {
                    expected: slot,
                    got,
                });
            }
        }

        self.indices.ensure_elements(slot + 1);
        Ok(slot)
    }

    pub fn update_positions(&self, slot: u32, positions: &[f32]) {
        debug_assert_eq!(positions.len(), self.vertices_per_element() as usize * 2);
        self.positions.update(slot, positions);
    }

    pub fn update_color(&self, slot: u32, color: Color) {
        let verts = self.vertices_per_element() as usize;
        self.colors.update(slot, &broadcast_color(color, verts));
    }

    pub fn update_paint(&self, slot: u32, paint_layer: f32) {
        let verts = self.vertices_per_element() as usize;
        self.paint.update(slot, &vec![paint_layer; verts]);
    }

    pub fn update_uv(&self, slot: u32, uv: &[f32]) {
        debug_assert_eq!(uv.len(), self.vertices_per_element() as usize * 2);
        self.uv.update(slot, uv);
    }

    /// Release an element's slot in every buffer. The payloads are zeroed so
    /// the vacated geometry degenerates instead of drawing stale content.
    pub fn remove(&self, slot: u32) {
        self.positions.release(slot);
        self.colors.release(slot);
        self.paint.release(slot);
        self.uv.release(slot);
    }

    pub fn in_use(&self) -> usize {
        self.positions.in_use()
    }

    // Upload access, one buffer at a time.
    pub fn positions(&self) -> &AttributeBuffer {
        &self.positions
    }

    pub fn colors(&self) -> &AttributeBuffer {
        &self.colors
    }

    pub fn paint(&self) -> &AttributeBuffer {
        &self.paint
    }

    pub fn uv(&self) -> &AttributeBuffer {
        &self.uv
    }

    pub fn indices(&self) -> &IndexBuffer {
        &self.indices
    }
}

fn broadcast_color(color: Color, verts: usize) -> Vec<f32> {
    let rgba = color.to_f32();
    let mut out = Vec::with_capacity(verts * 4);
    for _ in 0..verts {
        out.extend_from_slice(&rgba);
    }
    out
}
