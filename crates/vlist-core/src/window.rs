#![forbid(unsafe_code)]

//! Window calculation: which item indices a viewport needs.
//!
//! [`compute_window`] is a pure function of the viewport measurements, the
//! uniform item height, the overscan margin and the item count. It performs
//! no I/O and keeps no state, so every caller (the list component, tests,
//! benchmarks) gets the same answer for the same inputs.
//!
//! ```
//! use vlist_core::window::compute_window;
//!
//! let window = compute_window(1200.0, 500.0, 100.0, 3, 1000);
//! assert_eq!(window.range(), 9..20);
//! ```

use std::ops::Range;

/// Contiguous index range `[start, end)` of items to render.
///
/// Always satisfies `start <= end <= item_count` for the count it was
/// computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VisibleWindow {
    /// First rendered index (inclusive).
    pub start: usize,
    /// One past the last rendered index (exclusive).
    pub end: usize,
}

impl VisibleWindow {
    /// The empty window at index 0.
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    /// Create a window; `start` is clamped to `end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        let start = if start > end { end } else { start };
        Self { start, end }
    }

    /// Number of items in the window.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the window holds no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The window as a slice range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether `idx` falls inside the window.
    #[must_use]
    pub const fn contains(&self, idx: usize) -> bool {
        idx >= self.start && idx < self.end
    }

    /// Clamp the window to a (possibly shorter) item count.
    #[must_use]
    pub fn clamp_to(self, item_count: usize) -> Self {
        let end = self.end.min(item_count);
        Self::new(self.start.min(end), end)
    }
}

/// Whether an item height can be divided by.
#[inline]
#[must_use]
pub fn is_valid_item_height(item_height: f64) -> bool {
    item_height.is_finite() && item_height > 0.0
}

/// Clamp a measurement to a finite, non-negative value.
#[inline]
pub(crate) fn sanitize_measure(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Convert a non-negative item position to an index, saturating.
#[inline]
fn to_index(position: f64) -> usize {
    // `as` saturates for f64 -> usize and maps NaN to 0.
    position as usize
}

/// Compute the index window for a viewport.
///
/// - `start = max(0, floor(scroll_offset / item_height) - overscan)`
/// - `end = min(item_count, ceil((scroll_offset + container_height) / item_height) + overscan)`
///
/// `start` is additionally clamped to `end`, which matters when the offset
/// lies past the end of the list. A non-positive or non-finite
/// `item_height`, or an empty list, yields [`VisibleWindow::EMPTY`].
/// Negative or non-finite measurements are treated as 0.
#[must_use]
pub fn compute_window(
    scroll_offset: f64,
    container_height: f64,
    item_height: f64,
    overscan: usize,
    item_count: usize,
) -> VisibleWindow {
    if item_count == 0 || !is_valid_item_height(item_height) {
        return VisibleWindow::EMPTY;
    }

    let offset = sanitize_measure(scroll_offset);
    let height = sanitize_measure(container_height);

    let first = to_index((offset / item_height).floor());
    let last = to_index(((offset + height) / item_height).ceil());

    let end = last.saturating_add(overscan).min(item_count);
    let start = first.saturating_sub(overscan).min(end);

    VisibleWindow { start, end }
}

/// Indices strictly visible in the viewport, without overscan.
#[must_use]
pub fn visible_range(
    scroll_offset: f64,
    container_height: f64,
    item_height: f64,
    item_count: usize,
) -> VisibleWindow {
    compute_window(scroll_offset, container_height, item_height, 0, item_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_item_scenario() {
        let window = compute_window(1200.0, 500.0, 100.0, 3, 1000);
        assert_eq!(window.start, 9);
        assert_eq!(window.end, 20);
        assert_eq!(window.len(), 11);
    }

    #[test]
    fn empty_list_is_empty_window() {
        assert_eq!(compute_window(0.0, 500.0, 20.0, 3, 0), VisibleWindow::EMPTY);
        assert_eq!(
            compute_window(900.0, 500.0, 20.0, 3, 0),
            VisibleWindow::EMPTY
        );
    }

    #[test]
    fn zero_item_height_is_empty_window() {
        assert_eq!(compute_window(10.0, 500.0, 0.0, 3, 50), VisibleWindow::EMPTY);
        assert_eq!(
            compute_window(10.0, 500.0, -4.0, 3, 50),
            VisibleWindow::EMPTY
        );
        assert_eq!(
            compute_window(10.0, 500.0, f64::NAN, 3, 50),
            VisibleWindow::EMPTY
        );
    }

    #[test]
    fn unmeasured_container_renders_overscan_only() {
        // Before the first resize notification the height is 0.
        let window = compute_window(0.0, 0.0, 20.0, 3, 100);
        assert_eq!(window.range(), 0..3);
    }

    #[test]
    fn unmeasured_container_without_overscan_is_empty() {
        let window = compute_window(0.0, 0.0, 20.0, 0, 100);
        assert!(window.is_empty());
    }

    #[test]
    fn offset_past_end_clamps_start() {
        let window = compute_window(1_000_000.0, 500.0, 10.0, 2, 40);
        assert_eq!(window.start, 40);
        assert_eq!(window.end, 40);
    }

    #[test]
    fn negative_and_nan_measurements_are_zero() {
        let a = compute_window(-50.0, f64::NAN, 10.0, 1, 40);
        let b = compute_window(0.0, 0.0, 10.0, 1, 40);
        assert_eq!(a, b);
    }

    #[test]
    fn infinite_offset_does_not_overflow() {
        let window = compute_window(f64::INFINITY, 100.0, 10.0, usize::MAX, 40);
        assert!(window.start <= window.end);
        assert!(window.end <= 40);
    }

    #[test]
    fn huge_overscan_covers_list() {
        let window = compute_window(500.0, 100.0, 10.0, usize::MAX, 40);
        assert_eq!(window.range(), 0..40);
    }

    #[test]
    fn fractional_offset_rounds_outward() {
        // 15px into 10px rows: row 1 is partially visible at the top,
        // row 3 partially visible at the bottom.
        let window = visible_range(15.0, 20.0, 10.0, 100);
        assert_eq!(window.range(), 1..4);
    }

    #[test]
    fn list_shorter_than_viewport() {
        let window = compute_window(0.0, 1000.0, 20.0, 3, 5);
        assert_eq!(window.range(), 0..5);
    }

    #[test]
    fn window_helpers() {
        let window = VisibleWindow::new(4, 9);
        assert!(window.contains(4));
        assert!(!window.contains(9));
        assert_eq!(window.clamp_to(6), VisibleWindow::new(4, 6));
        assert_eq!(window.clamp_to(2), VisibleWindow::new(2, 2));
        assert_eq!(VisibleWindow::new(7, 3), VisibleWindow::new(3, 3));
    }
}
