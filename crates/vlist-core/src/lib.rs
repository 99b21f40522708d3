#![forbid(unsafe_code)]

//! Core: windowing math, viewport tracking and load-more gating for
//! virtualized lists.
//!
//! # Role
//! `vlist-core` renders only the slice of a long, uniformly sized list that
//! a scroll container can show (plus an overscan margin), while a
//! full-height spacer keeps the native scrollbar accurate. It has no opinion
//! about the UI layer: items are an opaque `&[T]` and rendering is a caller
//! closure.
//!
//! # Primary responsibilities
//! - **ViewportTracker**: live `{scroll_offset, container_height}` fed by
//!   explicit `on_resize`/`on_scroll` notifications.
//! - **compute_window**: pure index-window calculation.
//! - **render_slice**: hands `items[start..end]` to the caller with spacer
//!   and slice-offset geometry.
//! - **LoadMoreTrigger**: edge detection plus an `idle/loading` gate around
//!   a fire-and-forget loader.
//!
//! [`VirtualList`] combines the four.

pub mod config;
pub mod list;
pub mod load_more;
pub mod logging;
pub mod slice;
pub mod viewport;
pub mod window;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, LoadEdge, LoadThreshold, VirtualListConfig};
pub use list::{ScrollOutcome, VirtualList};
pub use load_more::{
    LoadCompletion, LoadError, LoadGate, LoadMore, LoadMoreTrigger, LoadRequest, LoadState,
    NoopLoader, TriggerOutcome,
};
pub use slice::{RenderedSlice, SliceLayout, render_slice, render_window};
pub use viewport::{ScrollUpdate, SizeObserver, ViewportState, ViewportTracker};
pub use window::{VisibleWindow, compute_window};
