//! Cycle-scoped draw diffing in front of a backend.
//!
//! Controls re-issue every draw call each frame; [`ControlRenderer`] turns
//! that into incremental work. A call that passes the handle it received
//! last cycle is assumed unchanged and skipped outright — no backend call —
//! unless that handle was invalidated or a force-redraw is pending. At
//! [`end_cycle`](ControlRenderer::end_cycle) every handle from the previous
//! frame that was not re-issued is removed from the backend.

use std::collections::HashSet;

use crate::geometry::{Point, Rect};
use crate::style::{Color, LineKind, Sides};

use super::atlas::AtlasRegion;
use super::backend::{DrawHandle, RenderBackend};

/// Frame-diffing facade over a [`RenderBackend`].
pub struct ControlRenderer<B: RenderBackend> {
    backend: B,
    /// Handles issued last cycle and not yet re-issued this cycle.
    last: HashSet<DrawHandle>,
    /// Handles issued this cycle.
    current: HashSet<DrawHandle>,
    /// Handles whose content changed; the next call with them goes through
    /// to the backend for an in-place patch.
    invalidated: HashSet<DrawHandle>,
    force_redraw: bool,
    in_cycle: bool,
}

impl<B: RenderBackend> ControlRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            last: HashSet::new(),
            current: HashSet::new(),
            invalidated: HashSet::new(),
            force_redraw: false,
            in_cycle: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Push the next cycle's draws through to the backend even when their
    /// handles look reusable.
    pub fn force_redraw(&mut self) {
        self.force_redraw = true;
    }

    /// Mark a handle's content as changed: its next draw call is not
    /// skipped, letting the backend patch the retained object in place.
    pub fn invalidate(&mut self, handle: DrawHandle) {
        self.invalidated.insert(handle);
    }

    /// Begin a frame.
    pub fn start_cycle(&mut self) {
        debug_assert!(!self.in_cycle, "start_cycle while a cycle is open");
        self.in_cycle = true;
        self.current.clear();
        self.backend.start_cycle();
    }

    /// Finish a frame: remove every handle from last cycle that was not
    /// re-issued, then promote this cycle's handles.
    pub fn end_cycle(&mut self) {
        debug_assert!(self.in_cycle, "end_cycle without start_cycle");
        for handle in self.last.drain().collect::<Vec<_>>() {
            self.backend.remove(handle);
        }
        std::mem::swap(&mut self.last, &mut self.current);
        self.current.clear();
        self.invalidated.clear();
        self.force_redraw = false;
        self.in_cycle = false;
        self.backend.end_cycle();
    }

    fn issue(
        &mut self,
        prev: Option<DrawHandle>,
        draw: impl FnOnce(&mut B, Option<DrawHandle>) -> Option<DrawHandle>,
    ) -> Option<DrawHandle> {
        debug_assert!(self.in_cycle, "draw outside start_cycle/end_cycle");

        // A prev handle only counts if it actually survives from last cycle.
        let live_prev = prev.filter(|handle| self.last.contains(handle));

        if let Some(handle) = live_prev {
            if !self.force_redraw && !self.invalidated.contains(&handle) {
                self.last.remove(&handle);
                self.current.insert(handle);
                return Some(handle);
            }
        }

        let result = draw(&mut self.backend, live_prev);

        if let Some(handle) = live_prev {
            self.last.remove(&handle);
            self.invalidated.remove(&handle);
        }
        if let Some(handle) = result {
            self.current.insert(handle);
        }
        result
    }

    pub fn fill_rectangle(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
    ) -> Option<DrawHandle> {
        self.issue(prev, |backend, prev| backend.fill_rectangle(prev, rect, color))
    }

    pub fn draw_rectangle(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
        widths: Sides<i32>,
    ) -> Option<DrawHandle> {
        self.issue(prev, |backend, prev| {
            backend.draw_rectangle(prev, rect, color, widths)
        })
    }

    pub fn draw_rectangle_line(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
        kind: LineKind,
    ) -> Option<DrawHandle> {
        self.issue(prev, |backend, prev| {
            backend.draw_rectangle_line(prev, rect, color, kind)
        })
    }

    pub fn draw_image(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        region: AtlasRegion,
    ) -> Option<DrawHandle> {
        self.issue(prev, |backend, prev| backend.draw_image(prev, rect, region))
    }

    pub fn fill_triangle(
        &mut self,
        prev: Option<DrawHandle>,
        a: Point,
        b: Point,
        c: Point,
        color: Color,
    ) -> Option<DrawHandle> {
        self.issue(prev, |backend, prev| {
            backend.fill_triangle(prev, a, b, c, color)
        })
    }

    pub fn fill_polygon(
        &mut self,
        prev: Option<DrawHandle>,
        points: &[Point],
        color: Color,
    ) -> Option<DrawHandle> {
        self.issue(prev, |backend, prev| {
            backend.fill_polygon(prev, points, color)
        })
    }

    pub fn draw_shadow(
        &mut self,
        prev: Option<DrawHandle>,
        rect: Rect,
        color: Color,
    ) -> Option<DrawHandle> {
        self.issue(prev, |backend, prev| backend.draw_shadow(prev, rect, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Start,
        End,
        Fill { prev: Option<DrawHandle> },
        Remove(DrawHandle),
    }

    /// Records every backend call and issues sequential handles.
    struct Recorder {
        calls: Rc<RefCell<Vec<Call>>>,
        next: u32,
    }

    impl Recorder {
        fn new() -> (Self, Rc<RefCell<Vec<Call>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    next: 0,
                },
                calls,
            )
        }
    }

    impl RenderBackend for Recorder {
        fn start_cycle(&mut self) {
            self.calls.borrow_mut().push(Call::Start);
        }

        fn end_cycle(&mut self) {
            self.calls.borrow_mut().push(Call::End);
        }

        fn fill_rectangle(
            &mut self,
            prev: Option<DrawHandle>,
            _rect: Rect,
            _color: Color,
        ) -> Option<DrawHandle> {
            self.calls.borrow_mut().push(Call::Fill { prev });
            if let Some(handle) = prev {
                return Some(handle);
            }
            let handle = DrawHandle(self.next);
            self.next += 1;
            Some(handle)
        }

        fn draw_rectangle(
            &mut self,
            prev: Option<DrawHandle>,
            rect: Rect,
            color: Color,
            _widths: Sides<i32>,
        ) -> Option<DrawHandle> {
            self.fill_rectangle(prev, rect, color)
        }

        fn draw_rectangle_line(
            &mut self,
            prev: Option<DrawHandle>,
            rect: Rect,
            color: Color,
            _kind: LineKind,
        ) -> Option<DrawHandle> {
            self.fill_rectangle(prev, rect, color)
        }

        fn draw_image(
            &mut self,
            prev: Option<DrawHandle>,
            rect: Rect,
            _region: AtlasRegion,
        ) -> Option<DrawHandle> {
            self.fill_rectangle(prev, rect, Color::WHITE)
        }

        fn fill_triangle(
            &mut self,
            prev: Option<DrawHandle>,
            _a: Point,
            _b: Point,
            _c: Point,
            color: Color,
        ) -> Option<DrawHandle> {
            self.fill_rectangle(prev, Rect::new(0, 0, 1, 1), color)
        }

        fn fill_polygon(
            &mut self,
            prev: Option<DrawHandle>,
            _points: &[Point],
            color: Color,
        ) -> Option<DrawHandle> {
            self.fill_rectangle(prev, Rect::new(0, 0, 1, 1), color)
        }

        fn draw_shadow(
            &mut self,
            prev: Option<DrawHandle>,
            rect: Rect,
            color: Color,
        ) -> Option<DrawHandle> {
            self.fill_rectangle(prev, rect, color)
        }

        fn remove(&mut self, handle: DrawHandle) {
            self.calls.borrow_mut().push(Call::Remove(handle));
        }
    }

    const RECT: Rect = Rect::new(0, 0, 10, 10);

    #[test]
    fn first_cycle_draws_through() {
        let (backend, calls) = Recorder::new();
        let mut facade = ControlRenderer::new(backend);

        facade.start_cycle();
        let handle = facade.fill_rectangle(None, RECT, Color::WHITE).unwrap();
        facade.end_cycle();

        assert_eq!(handle, DrawHandle(0));
        assert_eq!(
            &*calls.borrow(),
            &[Call::Start, Call::Fill { prev: None }, Call::End]
        );
    }

    #[test]
    fn reissued_handle_skips_backend() {
        let (backend, calls) = Recorder::new();
        let mut facade = ControlRenderer::new(backend);

        facade.start_cycle();
        let handle = facade.fill_rectangle(None, RECT, Color::WHITE).unwrap();
        facade.end_cycle();
        calls.borrow_mut().clear();

        facade.start_cycle();
        let again = facade.fill_rectangle(Some(handle), RECT, Color::WHITE);
        facade.end_cycle();

        assert_eq!(again, Some(handle));
        assert_eq!(&*calls.borrow(), &[Call::Start, Call::End], "no draw, no remove");
    }

    #[test]
    fn unreissued_handles_are_removed_at_end_cycle() {
        let (backend, calls) = Recorder::new();
        let mut facade = ControlRenderer::new(backend);

        facade.start_cycle();
        let keep = facade.fill_rectangle(None, RECT, Color::WHITE).unwrap();
        let drop = facade.fill_rectangle(None, RECT, Color::BLACK).unwrap();
        facade.end_cycle();
        calls.borrow_mut().clear();

        facade.start_cycle();
        facade.fill_rectangle(Some(keep), RECT, Color::WHITE);
        facade.end_cycle();

        assert_eq!(
            &*calls.borrow(),
            &[Call::Start, Call::Remove(drop), Call::End]
        );
    }

    #[test]
    fn invalidate_forces_one_call_through() {
        let (backend, calls) = Recorder::new();
        let mut facade = ControlRenderer::new(backend);

        facade.start_cycle();
        let handle = facade.fill_rectangle(None, RECT, Color::WHITE).unwrap();
        facade.end_cycle();
        calls.borrow_mut().clear();

        facade.invalidate(handle);
        facade.start_cycle();
        let patched = facade.fill_rectangle(Some(handle), RECT, Color::BLACK);
        facade.end_cycle();

        assert_eq!(patched, Some(handle), "patched in place, same handle");
        assert!(calls
            .borrow()
            .contains(&Call::Fill { prev: Some(handle) }));

        // The invalidation is consumed: next cycle skips again.
        calls.borrow_mut().clear();
        facade.start_cycle();
        facade.fill_rectangle(Some(handle), RECT, Color::BLACK);
        facade.end_cycle();
        assert_eq!(&*calls.borrow(), &[Call::Start, Call::End]);
    }

    #[test]
    fn force_redraw_pushes_everything_through_once() {
        let (backend, calls) = Recorder::new();
        let mut facade = ControlRenderer::new(backend);

        facade.start_cycle();
        let a = facade.fill_rectangle(None, RECT, Color::WHITE).unwrap();
        let b = facade.fill_rectangle(None, RECT, Color::BLACK).unwrap();
        facade.end_cycle();
        calls.borrow_mut().clear();

        facade.force_redraw();
        facade.start_cycle();
        facade.fill_rectangle(Some(a), RECT, Color::WHITE);
        facade.fill_rectangle(Some(b), RECT, Color::BLACK);
        facade.end_cycle();

        let fills = calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Fill { .. }))
            .count();
        assert_eq!(fills, 2);

        // Flag resets after the cycle.
        calls.borrow_mut().clear();
        facade.start_cycle();
        facade.fill_rectangle(Some(a), RECT, Color::WHITE);
        facade.fill_rectangle(Some(b), RECT, Color::BLACK);
        facade.end_cycle();
        assert_eq!(&*calls.borrow(), &[Call::Start, Call::End]);
    }

    #[test]
    fn stale_prev_handle_is_ignored() {
        let (backend, calls) = Recorder::new();
        let mut facade = ControlRenderer::new(backend);

        facade.start_cycle();
        let handle = facade.fill_rectangle(None, RECT, Color::WHITE).unwrap();
        facade.end_cycle();

        // Not re-issued: removed at the end of this cycle.
        facade.start_cycle();
        facade.end_cycle();
        calls.borrow_mut().clear();

        facade.start_cycle();
        let fresh = facade.fill_rectangle(Some(handle), RECT, Color::WHITE);
        facade.end_cycle();

        assert_ne!(fresh, Some(handle), "dead handle not resurrected");
        assert!(calls.borrow().contains(&Call::Fill { prev: None }));
    }
}
