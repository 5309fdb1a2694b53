//! # vitrine
//!
//! A retained-mode UI core: a tree of stateful controls, a CSS-like cascading
//! style system, a push-based reactive layer, and an incremental batched
//! renderer that maps styled controls onto pooled GPU buffer slots.
//!
//! vitrine is the styling/rendering engine beneath a native UI toolkit. It does
//! not talk to a graphics API itself — concrete backends implement
//! [`render::RenderBackend`] and receive packed vertex/color/layer data through
//! the buffer flush hooks.
//!
//! ## Core Systems
//!
//! - **[`style`]** — selectors with cascade priority, sparse style declaration
//!   bags, value parsing (colors, directional shorthand), the per-control
//!   resolved property store, and the default-value schema
//! - **[`reactive`]** — observables, subjects with replay, Any/All combinators,
//!   and change-notifying properties
//! - **[`control`]** — slotmap-backed control tree, component templates with a
//!   type registry, and the paint pass
//! - **[`render`]** — render-node lifecycle, index-pooled attribute buffers
//!   with dirty coalescing, texture atlas placement, and the cycle-scoped
//!   draw-call reuse facade
//! - **[`geometry`]** — rectangle primitives shared by controls and culling
//!
//! The whole engine is single-threaded and synchronous: style application,
//! observable propagation, and buffer patching are direct call chains driven
//! from one frame loop. The only locks are per-buffer, guarding the packed
//! arrays during GPU upload.

// Foundation
pub mod geometry;

// Core systems
pub mod reactive;
pub mod style;

// Control tree
pub mod control;

// Rendering
pub mod render;
