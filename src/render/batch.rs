//! Buffer-backed implementation of [`RenderBackend`].
//!
//! Draw calls become groups of [`RenderNode`]s over two layers: a sprite
//! layer for quads (fills, images, shadows) and a shape layer for triangles
//! and polygons. A composite draw like a four-edge border or a dashed
//! outline owns several nodes under one handle, so removal and reuse cascade
//! over the whole group.
//!
//! Per-primitive allocation failures inside a draw are logged and the draw
//! returns `None` — the frame is best-effort, one missing primitive must not
//! abort the pass.

use tracing::warn;

use crate::geometry::{Point, Rect};
use crate::style::{Color, LineKind, Sides};

use super::atlas::{AtlasRegion, TextureAtlas};
use super::backend::{DrawHandle, RenderBackend};
use super::layer::{LayerKind, RenderLayer};
use super::node::{NodeKind, RenderNode};
use super::pool::IndexPool;

/// Dash/gap lengths in pixels per line style.
fn dash_pattern(kind: LineKind) -> Option<(i32, i32)> {
    match kind {
        LineKind::Solid => None,
        LineKind::Dashed => Some((4, 3)),
        LineKind::Dotted => Some((1, 2)),
    }
}

const SHADOW_OFFSET: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Sprite,
    Shape,
}

/// One primitive a draw call wants on screen.
struct Primitive {
    target: Target,
    kind: NodeKind,
    position: Point,
    color: Color,
    uv: [f32; 4],
}

impl Primitive {
    fn quad(rect: Rect, color: Color, uv: [f32; 4]) -> Self {
        Self {
            target: Target::Sprite,
            kind: NodeKind::Sprite {
                width: rect.width,
                height: rect.height,
            },
            position: Point::new(rect.x, rect.y),
            color,
            uv,
        }
    }

    fn polygon(points: Vec<Point>, color: Color) -> Self {
        Self {
            target: Target::Shape,
            kind: NodeKind::Shape { points },
            position: Point::new(0, 0),
            color,
            uv: [0.0; 4],
        }
    }
}

struct GroupNode {
    target: Target,
    node: RenderNode,
}

struct NodeGroup {
    nodes: Vec<GroupNode>,
}

/// Batching renderer over pooled layers and a shared atlas.
pub struct BatchRenderer {
    sprites: RenderLayer,
    shapes: RenderLayer,
    atlas: TextureAtlas,
    handles: IndexPool,
    groups: Vec<Option<NodeGroup>>,
}

impl BatchRenderer {
    /// Default capacities: plenty for a full-screen control tree while
    /// keeping exhaustion testable by constructing smaller pools directly.
    pub fn new(screen: Rect) -> Self {
        Self::with_capacity(screen, 4096, 1024, 16)
    }

    pub fn with_capacity(
        screen: Rect,
        sprite_capacity: u32,
        shape_capacity: u32,
        max_vertices: u32,
    ) -> Self {
        Self {
            sprites: RenderLayer::new(LayerKind::Sprite, screen, sprite_capacity),
            shapes: RenderLayer::new(
                LayerKind::Shape { max_vertices },
                screen,
                shape_capacity,
            ),
            atlas: TextureAtlas::new(1024, 1024),
            handles: IndexPool::new(sprite_capacity + shape_capacity),
            groups: Vec::new(),
        }
    }

    pub fn sprites(&self) -> &RenderLayer {
        &self.sprites
    }

    pub fn shapes(&self) -> &RenderLayer {
        &self.shapes
    }

    pub fn atlas(&self) -> &TextureAtlas {
        &self.atlas
    }

    pub fn atlas_mut(&mut self) -> &mut TextureAtlas {
        &mut self.atlas
    }

    /// Live draw objects.
    pub fn group_count(&self) -> usize {
        self.handles.in_use()
    }

    /// Turn a primitive list into a handle, reusing `prev`'s nodes in place
    /// when the group structure matches.
    fn realize(&mut self, prev: Option<DrawHandle>, prims: Vec<Primitive>) -> Option<DrawHandle> {
        if prims.is_empty() {
            if let Some(prev) = prev {
                self.remove(prev);
            }
            return None;
        }

        if let Some(handle) = prev {
            if self.patch_in_place(handle, &prims) {
                return Some(handle);
            }
            self.remove(handle);
        }

        let index = match self.handles.acquire() {
            Ok(index) => index,
            Err(err) => {
                warn!(%err, "draw dropped: no handle slots left");
                return None;
            }
        };

        let mut nodes: Vec<GroupNode> = Vec::with_capacity(prims.len());
        for prim in prims {
            let layer = match prim.target {
                Target::Sprite => &self.sprites,
                Target::Shape => &self.shapes,
            };
            let mut node = RenderNode::new(prim.kind)
                .with_position(prim.position)
                .with_color(prim.color)
                .with_uv(prim.uv);
            if let Err(err) = node.attach(layer) {
                warn!(%err, "draw dropped: primitive allocation failed");
                for mut group_node in nodes {
                    let layer = match group_node.target {
                        Target::Sprite => &self.sprites,
                        Target::Shape => &self.shapes,
                    };
                    group_node.node.delete(layer);
                }
                self.handles.release(index);
                return None;
            }
            nodes.push(GroupNode {
                target: prim.target,
                node,
            });
        }

        let slot = index as usize;
        if self.groups.len() <= slot {
            self.groups.resize_with(slot + 1, || None);
        }
        self.groups[slot] = Some(NodeGroup { nodes });
        Some(DrawHandle(index))
    }

    /// Patch an existing group when its structure matches the new primitive
    /// list (same length, same targets in order). Returns false when the
    /// group must be rebuilt instead.
    fn patch_in_place(&mut self, handle: DrawHandle, prims: &[Primitive]) -> bool {
        let sprites = &self.sprites;
        let shapes = &self.shapes;
        let Some(group) = self
            .groups
            .get_mut(handle.index() as usize)
            .and_then(Option::as_mut)
        else {
            return false;
        };
        if group.nodes.len() != prims.len() {
            return false;
        }
        if group
            .nodes
            .iter()
            .zip(prims)
            .any(|(node, prim)| node.target != prim.target)
        {
            return false;
        }

        for (group_node, prim) in group.nodes.iter_mut().zip(prims) {
            let layer = match group_node.target {
                Target::Sprite => sprites,
                Target::Shape => shapes,
            };
            group_node.node.set_color(layer, prim.color);
            group_node.node.set_uv(layer, prim.uv);
            if group_node.node.set_position(layer, prim.position).is_err()
                || group_node.node.set_kind(layer, prim.kind.clone()).is_err()
            {
                // Re-allocation after a culling flip can exhaust the pool;
                // the caller rebuilds the group from scratch.
                return false;
            }
        }
        true
    }

    fn border_edges(rect: Rect, widths: Sides<i32>) -> Vec<Rect> {
        let (t, r, b, l) = widths.as_tuple();
        let edges = [
            Rect::new(rect.x, rect.y, rect.width, t),
            Rect::new(rect.x, rect.bottom() - b, rect.width, b),
            Rect::new(rect.x, rect.y + t, l, rect.height - t - b),
            Rect::new(rect.right() - r, rect.y + t, r, rect.height - t - b),
        ];
        edges.into_iter().filter(|e| !e.is_empty()).collect()
    }

    /// Cut a solid outline into dash segments.
    fn dash_edges(rect: Rect, dash: i32, gap: i32) -> Vec<Rect> {
        let mut segments = Vec::new();
        let step = dash + gap;

        // Top and bottom runs. For a 1 px tall rect they are the same row;
        // draw it once.
        let mut rows = vec![rect.y];
        if rect.height > 1 {
            rows.push(rect.bottom() - 1);
        }
        for y in rows {
            let mut x = rect.x;
            while x < rect.right() {
                let len = dash.min(rect.right() - x);
                segments.push(Rect::new(x, y, len, 1));
                x += step;
            }
        }
        // Left and right runs over the interior span, excluding the corners
        // already covered. Same collapse for 1 px wide rects.
        let mut cols = vec![rect.x];
        if rect.width > 1 {
            cols.push(rect.right() - 1);
        }
        for x in cols {
            let mut y = rect.y + 1;
            while y < rect.bottom() - 1 {
                let len = dash.min(rect.bottom() - 1 - y);
                segments.push(Rect::new(x, y, 1, len));
                y += step;
            }
        }
        segments.retain(|s| !s.is_empty());
        segments
    }
}

impl RenderBackend for BatchRenderer {
    fn start_cycle(&mut self) {}

    fn end_cycle(&mut self) {}

    fn fill_rectangle(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
    ) -> Option<DrawHandle> {
        if rect.is_empty() || color.a == 0 {
            return self.realize(prev, Vec::new());
        }
        let uv = self.atlas.white_uv();
        self.realize(prev, vec![Primitive::quad(rect, color, uv)])
    }

    fn draw_rectangle(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
        widths: Sides<i32>,
    ) -> Option<DrawHandle> {
        if rect.is_empty() || color.a == 0 || widths.is_zero() {
            return self.realize(prev, Vec::new());
        }
        let uv = self.atlas.white_uv();
        let prims = Self::border_edges(rect, widths)
            .into_iter()
            .map(|edge| Primitive::quad(edge, color, uv))
            .collect();
        self.realize(prev, prims)
    }

    fn draw_rectangle_line(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
        kind: LineKind,
    ) -> Option<DrawHandle> {
        if rect.is_empty() || color.a == 0 {
            return self.realize(prev, Vec::new());
        }
        let uv = self.atlas.white_uv();
        let segments = match dash_pattern(kind) {
            None => Self::border_edges(rect, Sides::uniform(1)),
            Some((dash, gap)) => Self::dash_edges(rect, dash, gap),
        };
        let prims = segments
            .into_iter()
            .map(|segment| Primitive::quad(segment, color, uv))
            .collect();
        self.realize(prev, prims)
    }

    fn draw_image(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        region: AtlasRegion,
    ) -> Option<DrawHandle> {
        if rect.is_empty() {
            return self.realize(prev, Vec::new());
        }
        let uv = self.atlas.uv(region);
        self.realize(prev, vec![Primitive::quad(rect, Color::WHITE, uv)])
    }

    fn fill_triangle(
        &mut self,
        prev: Option<DrawHandle>,
        a: Point,
        b: Point,
        c: Point,
        color: Color,
    ) -> Option<DrawHandle> {
        self.fill_polygon(prev, &[a, b, c], color)
    }

    fn fill_polygon(
        &mut self,
        prev: Option<DrawHandle>,
        points: &[Point],
        color: Color,
    ) -> Option<DrawHandle> {
        if points.len() < 3 || color.a == 0 {
            return self.realize(prev, Vec::new());
        }
        let budget = self.shapes.vertices_per_element() as usize;
        if points.len() > budget {
            warn!(
                points = points.len(),
                budget, "draw dropped: polygon exceeds layer vertex budget"
            );
            return self.realize(prev, Vec::new());
        }
        self.realize(prev, vec![Primitive::polygon(points.to_vec(), color)])
    }

    fn draw_shadow(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
    ) -> Option<DrawHandle> {
        if rect.is_empty() || color.a == 0 {
            return self.realize(prev, Vec::new());
        }
        let uv = self.atlas.white_uv();
        let shadow = rect.translated(SHADOW_OFFSET, SHADOW_OFFSET);
        self.realize(prev, vec![Primitive::quad(shadow, color, uv)])
    }

    fn remove(&mut self, handle: DrawHandle) {
        let slot = handle.index() as usize;
        let Some(group) = self.groups.get_mut(slot).and_then(Option::take) else {
            return;
        };
        for mut group_node in group.nodes {
            let layer = match group_node.target {
                Target::Sprite => &self.sprites,
                Target::Shape => &self.shapes,
            };
            group_node.node.delete(layer);
        }
        self.handles.release(handle.index());
    }
}
