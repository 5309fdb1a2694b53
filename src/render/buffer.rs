//! Packed attribute and index buffers with dirty coalescing.
//!
//! Each buffer owns a dense `f32`/`u32` array plus a dirty flag. Writers on
//! the UI side mutate slots freely; any number of writes coalesce into a
//! single upload when [`AttributeBuffer::flush`] (or
//! [`IndexBuffer::flush`]) hands the packed byte view to the GPU callback.
//! The upload may run on a different thread than the writers, so all state
//! sits behind a per-buffer mutex.

use std::sync::Mutex;

use super::pool::IndexPool;
use super::RenderError;

/// Primitive-restart sentinel for polygon index streams.
pub const PRIMITIVE_RESTART: u32 = 0xFFFF_FFFF;

struct AttributeState {
    data: Vec<f32>,
    dirty: bool,
    pool: IndexPool,
}

/// A slot-indexed array of fixed-stride `f32` payloads (positions, colors,
/// paint layers, UVs).
pub struct AttributeBuffer {
    stride: usize,
    state: Mutex<AttributeState>,
}

impl AttributeBuffer {
    /// `stride` is the number of floats per element; `capacity` bounds how
    /// many elements the buffer can ever hold.
    pub fn new(stride: usize, capacity: u32) -> Self {
        Self {
            stride,
            state: Mutex::new(AttributeState {
                data: Vec::new(),
                dirty: false,
                pool: IndexPool::new(capacity),
            }),
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Allocate a slot and write its payload. `values` must be exactly one
    /// stride long.
    pub fn add(&self, values: &[f32]) -> Result<u32, RenderError> {
        debug_assert_eq!(values.len(), self.stride);
        let mut state = self.state.lock().expect("attribute buffer poisoned");
        let slot = state.pool.acquire()?;
        let end = (slot as usize + 1) * self.stride;
        if state.data.len() < end {
            // Geometric growth so repeated adds stay amortized O(1).
            let grown = end.max(state.data.len() * 2);
            state.data.resize(grown, 0.0);
        }
        let start = slot as usize * self.stride;
        state.data[start..start + self.stride].copy_from_slice(values);
        state.dirty = true;
        Ok(slot)
    }

    /// Overwrite an existing slot's payload in place.
    pub fn update(&self, slot: u32, values: &[f32]) {
        debug_assert_eq!(values.len(), self.stride);
        let mut state = self.state.lock().expect("attribute buffer poisoned");
        let start = slot as usize * self.stride;
        state.data[start..start + self.stride].copy_from_slice(values);
        state.dirty = true;
    }

    /// Release a slot. Its payload is zeroed so stale geometry cannot draw
    /// while the slot sits in the free list.
    pub fn release(&self, slot: u32) {
        let mut state = self.state.lock().expect("attribute buffer poisoned");
        let start = slot as usize * self.stride;
        let stride = self.stride;
        state.data[start..start + stride].fill(0.0);
        state.pool.release(slot);
        state.dirty = true;
    }

    /// Run `upload` over the packed byte view iff the buffer changed since
    /// the last flush, then clear the dirty flag. The buffer stays locked
    /// for the duration of the callback.
    pub fn flush(&self, upload: impl FnOnce(&[u8])) {
        let mut state = self.state.lock().expect("attribute buffer poisoned");
        if !state.dirty {
            return;
        }
        let live = state.pool.frontier() as usize * self.stride;
        upload(bytemuck::cast_slice(&state.data[..live]));
        state.dirty = false;
    }

    /// Copy of one slot's payload, mainly for assertions.
    pub fn read(&self, slot: u32) -> Vec<f32> {
        let state = self.state.lock().expect("attribute buffer poisoned");
        let start = slot as usize * self.stride;
        state.data[start..start + self.stride].to_vec()
    }

    pub fn in_use(&self) -> usize {
        self.state
            .lock()
            .expect("attribute buffer poisoned")
            .pool
            .in_use()
    }
}

/// Index stream topology: how element slots map to vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Four vertices per element, six indices (two triangles).
    Quads,
    /// `max_vertices` per element, terminated by [`PRIMITIVE_RESTART`].
    Polygons { max_vertices: u32 },
}

impl Topology {
    pub fn vertices_per_element(self) -> u32 {
        match self {
            Topology::Quads => 4,
            Topology::Polygons { max_vertices } => max_vertices,
        }
    }

    fn indices_per_element(self) -> u32 {
        match self {
            Topology::Quads => 6,
            Topology::Polygons { max_vertices } => max_vertices + 1,
        }
    }

    /// Indices for one element. Purely a function of the slot, which is what
    /// lets the stream grow monotonically and never be patched per element.
    fn element_indices(self, slot: u32, out: &mut Vec<u32>) {
        let base = slot * self.vertices_per_element();
        match self {
            Topology::Quads => {
                out.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
            Topology::Polygons { max_vertices } => {
                out.extend((0..max_vertices).map(|v| base + v));
                out.push(PRIMITIVE_RESTART);
            }
        }
    }
}

struct IndexState {
    data: Vec<u32>,
    dirty: bool,
    elements: u32,
}

/// The index stream paired with a layer's attribute buffers.
pub struct IndexBuffer {
    topology: Topology,
    state: Mutex<IndexState>,
}

impl IndexBuffer {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            state: Mutex::new(IndexState {
                data: Vec::new(),
                dirty: false,
                elements: 0,
            }),
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Grow the stream to cover `count` elements. Shrinking never happens;
    /// released slots draw zeroed (degenerate) vertices instead.
    pub fn ensure_elements(&self, count: u32) {
        let mut state = self.state.lock().expect("index buffer poisoned");
        if count <= state.elements {
            return;
        }
        for slot in state.elements..count {
            self.topology.element_indices(slot, &mut state.data);
        }
        state.elements = count;
        state.dirty = true;
    }

    /// Number of indices currently in the stream.
    pub fn len(&self) -> usize {
        self.state.lock().expect("index buffer poisoned").data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same contract as [`AttributeBuffer::flush`].
    pub fn flush(&self, upload: impl FnOnce(&[u8])) {
        let mut state = self.state.lock().expect("index buffer poisoned");
        if !state.dirty {
            return;
        }
        upload(bytemuck::cast_slice(&state.data));
        state.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── AttributeBuffer ──────────────────────────────────────────────

    #[test]
    fn add_then_read() {
        let buffer = AttributeBuffer::new(2, 16);
        let slot = buffer.add(&[1.0, 2.0]).unwrap();
        assert_eq!(buffer.read(slot), vec![1.0, 2.0]);
    }

    #[test]
    fn slots_reuse_released_space() {
        let buffer = AttributeBuffer::new(1, 16);
        let a = buffer.add(&[1.0]).unwrap();
        let _b = buffer.add(&[2.0]).unwrap();
        buffer.release(a);
        let c = buffer.add(&[3.0]).unwrap();
        assert_eq!(c, a);
        assert_eq!(buffer.read(c), vec![3.0]);
    }

    #[test]
    fn released_slot_is_zeroed() {
        let buffer = AttributeBuffer::new(2, 16);
        let slot = buffer.add(&[5.0, 6.0]).unwrap();
        buffer.release(slot);
        assert_eq!(buffer.read(slot), vec![0.0, 0.0]);
    }

    #[test]
    fn flush_only_when_dirty() {
        let buffer = AttributeBuffer::new(1, 16);
        buffer.add(&[1.0]).unwrap();

        let mut uploads = 0;
        buffer.flush(|_| uploads += 1);
        buffer.flush(|_| uploads += 1);
        assert_eq!(uploads, 1, "second flush sees a clean buffer");

        buffer.update(0, &[2.0]);
        buffer.flush(|_| uploads += 1);
        assert_eq!(uploads, 2);
    }

    #[test]
    fn flush_covers_live_prefix_bytes() {
        let buffer = AttributeBuffer::new(2, 16);
        buffer.add(&[1.0, 2.0]).unwrap();
        buffer.add(&[3.0, 4.0]).unwrap();

        let mut seen = 0;
        buffer.flush(|bytes| seen = bytes.len());
        assert_eq!(seen, 2 * 2 * std::mem::size_of::<f32>());
    }

    #[test]
    fn many_writes_coalesce_into_one_flush() {
        let buffer = AttributeBuffer::new(1, 64);
        for i in 0..10 {
            buffer.add(&[i as f32]).unwrap();
        }
        buffer.update(3, &[99.0]);
        buffer.release(7);

        let mut uploads = 0;
        buffer.flush(|_| uploads += 1);
        assert_eq!(uploads, 1);
    }

    #[test]
    fn capacity_exhaustion_propagates() {
        let buffer = AttributeBuffer::new(1, 1);
        buffer.add(&[0.0]).unwrap();
        assert!(matches!(
            buffer.add(&[0.0]),
            Err(RenderError::PoolExhausted { capacity: 1 })
        ));
    }

    // ── IndexBuffer ──────────────────────────────────────────────────

    #[test]
    fn quad_indices_are_two_triangles() {
        let buffer = IndexBuffer::new(Topology::Quads);
        buffer.ensure_elements(2);

        let mut indices: Vec<u32> = Vec::new();
        buffer.flush(|bytes| indices = bytemuck::cast_slice(bytes).to_vec());
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn polygon_indices_use_restart_sentinel() {
        let buffer = IndexBuffer::new(Topology::Polygons { max_vertices: 3 });
        buffer.ensure_elements(2);

        let mut indices: Vec<u32> = Vec::new();
        buffer.flush(|bytes| indices = bytemuck::cast_slice(bytes).to_vec());
        assert_eq!(
            indices,
            vec![0, 1, 2, PRIMITIVE_RESTART, 3, 4, 5, PRIMITIVE_RESTART]
        );
    }

    #[test]
    fn ensure_is_monotonic() {
        let buffer = IndexBuffer::new(Topology::Quads);
        buffer.ensure_elements(3);
        let len = buffer.len();
        buffer.ensure_elements(2);
        assert_eq!(buffer.len(), len, "never shrinks");
        buffer.ensure_elements(4);
        assert_eq!(buffer.len(), 4 * 6);
    }
}
