//! The draw-call surface controls render through.

use crate::geometry::{Point, Rect};
use crate::style::{Color, LineKind, Sides};

use super::atlas::AtlasRegion;

/// Opaque handle to a retained draw object.
///
/// Degenerate draws (empty geometry, fully transparent fill) produce no
/// object; callers receive `None` instead of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawHandle(pub(crate) u32);

impl DrawHandle {
    pub(crate) fn index(self) -> u32 {
        self.0
    }
}

/// A retained-mode draw target.
///
/// Every draw accepts `prev`: the handle this content was drawn under last
/// time, if any. Implementations reuse the retained object in place when the
/// shape allows it and otherwise replace it; either way the returned handle
/// is the caller's key for the next frame.
pub trait RenderBackend {
    /// Begin a frame.
    fn start_cycle(&mut self);

    /// Finish a frame.
    fn end_cycle(&mut self);

    /// A solid rectangle.
    fn fill_rectangle(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
    ) -> Option<DrawHandle>;

    /// A rectangle outline with per-side border widths.
    fn draw_rectangle(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
        widths: Sides<i32>,
    ) -> Option<DrawHandle>;

    /// A one-pixel rectangle outline in the given line style.
    fn draw_rectangle_line(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
        kind: LineKind,
    ) -> Option<DrawHandle>;

    /// A textured quad sampling an atlas region.
    fn draw_image(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        region: AtlasRegion,
    ) -> Option<DrawHandle>;

    /// A filled triangle.
    fn fill_triangle(
        &mut self,
        prev: Option<DrawHandle>,
        a: Point,
        b: Point,
        c: Point,
        color: Color,
    ) -> Option<DrawHandle>;

    /// A filled convex polygon.
    fn fill_polygon(
        &mut self,
        prev: Option<DrawHandle>,
        points: &[Point],
        color: Color,
    ) -> Option<DrawHandle>;

    /// A drop shadow behind `rect`, offset down-right.
    fn draw_shadow(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
    ) -> Option<DrawHandle>;

    /// Remove a retained draw object.
    fn remove(&mut self, handle: DrawHandle);
}
