//! Rendering: pooled slots, packed GPU buffers, node lifecycle, batching.
//!
//! The pipeline is incremental: controls issue draw calls through
//! [`ControlRenderer`], which diffs them against the previous frame and only
//! forwards the changes to the [`RenderBackend`]. The batch backend turns
//! draws into [`RenderNode`]s over slot-parallel attribute buffers, and the
//! buffers coalesce all writes behind a dirty flag until the GPU upload
//! callback runs.

pub mod atlas;
pub mod backend;
pub mod batch;
pub mod buffer;
pub mod facade;
pub mod layer;
pub mod node;
pub mod pool;

pub use atlas::{AtlasRegion, TextureAtlas};
pub use backend::{DrawHandle, RenderBackend};
pub use batch::BatchRenderer;
pub use buffer::{AttributeBuffer, IndexBuffer, Topology, PRIMITIVE_RESTART};
pub use facade::ControlRenderer;
pub use layer::{LayerKind, RenderLayer};
pub use node::{NodeKind, RenderNode};
pub use pool::IndexPool;

/// Errors from the render layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// An index pool ran out of slots.
    #[error("index pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: u32 },

    /// Slot-parallel buffers disagreed on an allocation. The layer's
    /// buffers are corrupt past this point; the render pass must abort.
    #[error("slot mismatch across layer buffers: expected {expected}, got {got}")]
    SlotMismatch { expected: u32, got: u32 },

    /// No atlas shelf can fit the requested region.
    #[error("texture atlas full: cannot place {width}x{height}")]
    AtlasFull { width: u32, height: u32 },
}
