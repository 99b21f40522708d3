#![forbid(unsafe_code)]

//! Slice rendering: hand the windowed items to a caller's render function.
//!
//! The host lays the output out as two layers inside the scroll container:
//!
//! ```text
//! ┌ container (scrolls) ─────────┐
//! │ spacer: total_extent tall    │  keeps the native scrollbar honest
//! │   ┌ slice at `offset` ─────┐ │
//! │   │ items[start..end]      │ │
//! │   └────────────────────────┘ │
//! └──────────────────────────────┘
//! ```

use crate::viewport::ViewportState;
use crate::window::{VisibleWindow, compute_window, is_valid_item_height};

/// Geometry of one rendered slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceLayout {
    /// Rendered index range.
    pub window: VisibleWindow,
    /// Height of the full-list spacer: `item_count * item_height`.
    pub total_extent: f64,
    /// Where the slice sits inside the spacer: `start * item_height`.
    pub offset: f64,
    /// Uniform item height the layout was built with; 0 when it was invalid.
    pub item_height: f64,
}

impl SliceLayout {
    /// Layout for `window` over `item_count` items of `item_height`.
    ///
    /// The window is clamped to `item_count`. An invalid item height gives
    /// a zero extent and offset.
    #[must_use]
    pub fn new(window: VisibleWindow, item_count: usize, item_height: f64) -> Self {
        let window = window.clamp_to(item_count);
        if !is_valid_item_height(item_height) {
            return Self {
                window: VisibleWindow::EMPTY,
                total_extent: 0.0,
                offset: 0.0,
                item_height: 0.0,
            };
        }
        Self {
            window,
            total_extent: item_count as f64 * item_height,
            offset: window.start as f64 * item_height,
            item_height,
        }
    }

    /// Vertical position of item `idx` relative to the slice origin.
    ///
    /// `None` when `idx` is outside the window.
    #[must_use]
    pub fn item_top(&self, idx: usize) -> Option<f64> {
        self.window
            .contains(idx)
            .then(|| (idx - self.window.start) as f64 * self.item_height)
    }
}

/// A rendered subset together with its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSlice<R> {
    /// Spacer extent, slice offset and rendered range.
    pub layout: SliceLayout,
    /// Whatever the render function returned for the visible items.
    pub output: R,
}

impl<R> RenderedSlice<R> {
    /// Rendered index range.
    #[must_use]
    pub fn window(&self) -> VisibleWindow {
        self.layout.window
    }

    /// Map the output, keeping the layout.
    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> RenderedSlice<U> {
        RenderedSlice {
            layout: self.layout,
            output: f(self.output),
        }
    }
}

/// Invoke `render` with exactly `items[window]` and return its output.
///
/// `render` is called once, with a contiguous (possibly empty) slice.
pub fn render_slice<T, R, F>(
    items: &[T],
    item_height: f64,
    window: VisibleWindow,
    render: F,
) -> RenderedSlice<R>
where
    F: FnOnce(&[T]) -> R,
{
    let layout = SliceLayout::new(window, items.len(), item_height);
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "render_slice",
        start = layout.window.start,
        end = layout.window.end,
        items = items.len()
    )
    .entered();
    let output = render(&items[layout.window.range()]);
    RenderedSlice { layout, output }
}

/// Stateless render of a list for a given viewport.
///
/// Computes the window for `viewport` and renders it in one step; this is
/// the whole pipeline minus event tracking and load-more.
pub fn render_window<T, R, F>(
    items: &[T],
    item_height: f64,
    overscan: usize,
    viewport: ViewportState,
    render: F,
) -> RenderedSlice<R>
where
    F: FnOnce(&[T]) -> R,
{
    let window = compute_window(
        viewport.scroll_offset,
        viewport.container_height,
        item_height,
        overscan,
        items.len(),
    );
    render_slice(items, item_height, window, render)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_item_layout() {
        let items: Vec<usize> = (0..1000).collect();
        let rendered = render_window(
            &items,
            100.0,
            3,
            ViewportState::new(1200.0, 500.0),
            |s| s.to_vec(),
        );
        assert_eq!(rendered.output, (9..20).collect::<Vec<_>>());
        assert_eq!(rendered.layout.total_extent, 100_000.0);
        assert_eq!(rendered.layout.offset, 900.0);
    }

    #[test]
    fn empty_list_renders_empty_slice() {
        let items: Vec<u8> = Vec::new();
        let rendered = render_window(&items, 20.0, 3, ViewportState::new(0.0, 400.0), |s| {
            s.len()
        });
        assert_eq!(rendered.output, 0);
        assert_eq!(rendered.layout.total_extent, 0.0);
        assert_eq!(rendered.layout.offset, 0.0);
    }

    #[test]
    fn render_called_exactly_once() {
        let items = [1, 2, 3];
        let mut calls = 0;
        let _ = render_slice(&items, 10.0, VisibleWindow::new(0, 2), |s| {
            calls += 1;
            s.len()
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn stale_window_is_clamped_to_items() {
        // A window computed for a longer list must not slice out of range.
        let items = [1, 2, 3];
        let rendered = render_slice(&items, 10.0, VisibleWindow::new(2, 9), |s| s.to_vec());
        assert_eq!(rendered.output, vec![3]);
        assert_eq!(rendered.layout.offset, 20.0);
        assert_eq!(rendered.layout.total_extent, 30.0);
    }

    #[test]
    fn invalid_height_renders_nothing() {
        let items = [1, 2, 3];
        let rendered = render_slice(&items, 0.0, VisibleWindow::new(0, 3), |s| s.to_vec());
        assert!(rendered.output.is_empty());
        assert_eq!(rendered.layout.total_extent, 0.0);
    }

    #[test]
    fn item_top_is_relative_to_slice() {
        let layout = SliceLayout::new(VisibleWindow::new(4, 8), 10, 25.0);
        assert_eq!(layout.item_height, 25.0);
        assert_eq!(layout.item_top(4), Some(0.0));
        assert_eq!(layout.item_top(6), Some(50.0));
        assert_eq!(layout.item_top(8), None);
    }

    #[test]
    fn item_top_uses_rendered_height() {
        let items: Vec<u32> = (0..50).collect();
        let rendered = render_window(&items, 40.0, 0, ViewportState::new(200.0, 120.0), |s| {
            s.len()
        });
        assert_eq!(rendered.window().range(), 5..8);
        assert_eq!(rendered.layout.item_top(7), Some(80.0));

        let invalid = render_slice(&items, f64::NAN, VisibleWindow::new(0, 3), |s| s.len());
        assert_eq!(invalid.layout.item_height, 0.0);
        assert_eq!(invalid.layout.item_top(0), None);
    }

    #[test]
    fn map_keeps_layout() {
        let items = ["a", "b"];
        let rendered = render_slice(&items, 1.0, VisibleWindow::new(0, 2), |s| s.len());
        let layout = rendered.layout;
        let mapped = rendered.map(|n| n * 2);
        assert_eq!(mapped.output, 4);
        assert_eq!(mapped.layout, layout);
    }
}
