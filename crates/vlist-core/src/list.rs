#![forbid(unsafe_code)]

//! The virtualized list component.
//!
//! [`VirtualList`] wires the parts together:
//!
//! 1. resize / scroll notifications update the [`ViewportTracker`];
//! 2. scroll handling consults the [`LoadMoreTrigger`];
//! 3. [`VirtualList::render`] recomputes the window from the latest viewport
//!    and the caller's items and renders exactly that slice.
//!
//! The window is never cached: every render derives it from the current
//! viewport and item count, so there is no stale state to invalidate.
//!
//! # Example
//!
//! ```
//! use vlist_core::{VirtualList, VirtualListConfig};
//!
//! let items: Vec<u32> = (0..1000).collect();
//! let mut list = VirtualList::new(VirtualListConfig::new(100.0).with_overscan(3));
//! list.attach_manual();
//! list.on_resize(500.0);
//! list.on_scroll(1200.0, items.len());
//!
//! let rendered = list.render(&items, |visible| visible.len());
//! assert_eq!(rendered.output, 11);
//! assert_eq!(rendered.layout.offset, 900.0);
//! ```

use crate::config::VirtualListConfig;
use crate::load_more::{
    LoadCompletion, LoadGate, LoadMore, LoadMoreTrigger, NoopLoader, TriggerOutcome,
};
use crate::slice::{RenderedSlice, SliceLayout, render_slice};
use crate::viewport::{ScrollUpdate, SizeObserver, ViewportState, ViewportTracker};
use crate::window::{VisibleWindow, compute_window, is_valid_item_height};

/// What one scroll notification did.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollOutcome {
    /// Viewport update.
    pub update: ScrollUpdate,
    /// Window after the update.
    pub window: VisibleWindow,
    /// Load-more result.
    pub load: TriggerOutcome,
}

/// A windowed list over caller-owned items of uniform height.
#[derive(Debug)]
pub struct VirtualList<L = NoopLoader> {
    config: VirtualListConfig,
    tracker: ViewportTracker,
    trigger: LoadMoreTrigger<L>,
}

impl VirtualList<NoopLoader> {
    /// Create a list without a loader.
    #[must_use]
    pub fn new(config: VirtualListConfig) -> Self {
        let trigger = LoadMoreTrigger::noop(config.load_edge, config.load_threshold);
        Self {
            config,
            tracker: ViewportTracker::new(),
            trigger,
        }
    }
}

impl<L: LoadMore> VirtualList<L> {
    /// Attach a loader that is called near the load edge.
    pub fn with_loader<M: LoadMore>(self, loader: M) -> VirtualList<M> {
        let Self {
            config,
            tracker,
            trigger,
        } = self;
        VirtualList {
            config,
            tracker,
            trigger: trigger.with_loader(loader),
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &VirtualListConfig {
        &self.config
    }

    /// Replace the configuration. The viewport is kept.
    pub fn set_config(&mut self, config: VirtualListConfig) {
        self.trigger
            .set_policy(config.load_edge, config.load_threshold);
        self.config = config;
    }

    /// Current viewport measurements.
    #[must_use]
    pub fn viewport(&self) -> ViewportState {
        self.tracker.state()
    }

    /// Load gate state.
    #[must_use]
    pub fn load_gate(&self) -> &LoadGate {
        self.trigger.gate()
    }

    /// Mutable access to the loader.
    pub fn loader_mut(&mut self) -> &mut L {
        self.trigger.loader_mut()
    }

    /// Whether the viewport tracker is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.tracker.is_attached()
    }

    /// Start observing the scroll container (`None` = not rendered yet).
    pub fn attach(&mut self, observer: Option<Box<dyn SizeObserver>>) -> bool {
        self.tracker.attach(observer)
    }

    /// Attach without a platform observer; the host delivers resize and
    /// scroll notifications by hand.
    pub fn attach_manual(&mut self) -> bool {
        self.tracker.attach(Some(Box::new(ManualObserver)))
    }

    /// Stop observing.
    pub fn detach(&mut self) {
        self.tracker.detach();
    }

    /// Container size notification.
    pub fn on_resize(&mut self, height: f64) -> bool {
        let changed = self.tracker.on_resize(height);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            height = self.tracker.container_height(),
            changed,
            "viewport resize"
        );
        changed
    }

    /// Scroll notification.
    ///
    /// Updates the offset, then consults the load-more trigger. Loader
    /// failures are reported in the outcome and never propagate.
    pub fn on_scroll(&mut self, offset: f64, item_count: usize) -> ScrollOutcome {
        let update = self.tracker.on_scroll(offset);
        let load = if update.is_applied() {
            self.trigger
                .on_scroll(self.tracker.state(), self.config.item_height, item_count)
        } else {
            TriggerOutcome::Quiet
        };
        ScrollOutcome {
            update,
            window: self.window(item_count),
            load,
        }
    }

    /// Report completion of an in-flight load.
    pub fn complete_load(&mut self, completion: LoadCompletion) {
        self.trigger.complete(completion);
    }

    /// Re-arm the loader, e.g. after switching to another conversation.
    pub fn reset_load(&mut self) {
        self.trigger.reset();
    }

    /// Window for `item_count` items at the current viewport.
    #[must_use]
    pub fn window(&self, item_count: usize) -> VisibleWindow {
        let viewport = self.tracker.state();
        compute_window(
            viewport.scroll_offset,
            viewport.container_height,
            self.config.item_height,
            self.config.overscan,
            item_count,
        )
    }

    /// Layout (spacer extent, slice offset) for `item_count` items.
    #[must_use]
    pub fn layout(&self, item_count: usize) -> SliceLayout {
        SliceLayout::new(
            self.window(item_count),
            item_count,
            self.config.item_height,
        )
    }

    /// Render the windowed slice of `items`.
    pub fn render<T, R, F>(&self, items: &[T], render: F) -> RenderedSlice<R>
    where
        F: FnOnce(&[T]) -> R,
    {
        let window = self.window(items.len());
        render_slice(items, self.config.item_height, window, render)
    }

    /// Total scrollable extent for `item_count` items.
    #[must_use]
    pub fn total_extent(&self, item_count: usize) -> f64 {
        if is_valid_item_height(self.config.item_height) {
            item_count as f64 * self.config.item_height
        } else {
            0.0
        }
    }

    /// Largest offset that still fills the container.
    #[must_use]
    pub fn max_scroll_offset(&self, item_count: usize) -> f64 {
        (self.total_extent(item_count) - self.tracker.container_height()).max(0.0)
    }

    /// Move the viewport so item `idx` is at the top (clamped).
    ///
    /// Programmatic moves do not consult the loader. Returns the new offset.
    pub fn scroll_to_index(&mut self, idx: usize, item_count: usize) -> f64 {
        let idx = idx.min(item_count.saturating_sub(1));
        let target = if is_valid_item_height(self.config.item_height) {
            (idx as f64 * self.config.item_height).min(self.max_scroll_offset(item_count))
        } else {
            0.0
        };
        self.tracker.set_scroll_offset(target);
        target
    }

    /// Move the viewport to the newest item. Returns the new offset.
    pub fn scroll_to_bottom(&mut self, item_count: usize) -> f64 {
        let target = self.max_scroll_offset(item_count);
        self.tracker.set_scroll_offset(target);
        target
    }

    /// Shift the offset by `delta` (clamped at 0), e.g. to keep content in
    /// place after items were prepended. Returns the new offset.
    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        let target = self.tracker.scroll_offset() + delta;
        self.tracker.set_scroll_offset(target);
        self.tracker.scroll_offset()
    }

    /// Whether the viewport shows the last item.
    ///
    /// `tolerance` absorbs fractional offsets reported by the host.
    #[must_use]
    pub fn is_at_bottom(&self, item_count: usize, tolerance: f64) -> bool {
        self.tracker.scroll_offset() + tolerance.max(0.0) >= self.max_scroll_offset(item_count)
    }

    /// Restore a saved viewport.
    pub fn restore_viewport(&mut self, state: ViewportState) {
        self.tracker.restore(state);
    }
}

/// Observer for hosts that deliver events by hand.
#[derive(Debug, Clone, Copy, Default)]
struct ManualObserver;

impl SizeObserver for ManualObserver {
    fn disconnect(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoadEdge, LoadThreshold};
    use crate::load_more::{LoadRequest, LoadState};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn attached(config: VirtualListConfig) -> VirtualList {
        let mut list = VirtualList::new(config);
        list.attach_manual();
        list
    }

    #[test]
    fn unattached_list_ignores_events() {
        let mut list = VirtualList::new(VirtualListConfig::new(20.0));
        list.on_resize(400.0);
        let outcome = list.on_scroll(300.0, 100);
        assert_eq!(outcome.update, ScrollUpdate::Ignored);
        assert_eq!(outcome.load, TriggerOutcome::Quiet);
        assert_eq!(list.viewport(), ViewportState::default());
        // Overscan-only window until a measurement arrives.
        assert_eq!(list.window(100).range(), 0..3);
    }

    #[test]
    fn scroll_updates_window_synchronously() {
        let mut list = attached(VirtualListConfig::new(100.0).with_overscan(3));
        list.on_resize(500.0);
        let outcome = list.on_scroll(1200.0, 1000);
        assert_eq!(outcome.window.range(), 9..20);
        let rendered = list.render(&(0..1000).collect::<Vec<_>>(), |s| s.to_vec());
        assert_eq!(rendered.window(), outcome.window);
        assert_eq!(rendered.output.first(), Some(&9));
        assert_eq!(rendered.output.last(), Some(&19));
    }

    #[test]
    fn render_tracks_shrinking_items() {
        let mut list = attached(VirtualListConfig::new(10.0).with_overscan(0));
        list.on_resize(50.0);
        list.on_scroll(300.0, 100);
        let items: Vec<u32> = (0..20).collect();
        let rendered = list.render(&items, |s| s.len());
        assert_eq!(rendered.output, 0);
        assert_eq!(rendered.layout.total_extent, 200.0);
    }

    #[test]
    fn loader_fires_on_scroll_near_top() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut list = VirtualList::new(VirtualListConfig::new(20.0))
            .with_loader(move |req: LoadRequest| sink.borrow_mut().push(req));
        list.attach_manual();
        list.on_resize(200.0);

        list.on_scroll(100.0, 50);
        assert!(seen.borrow().is_empty());
        let outcome = list.on_scroll(10.0, 50);
        assert!(matches!(outcome.load, TriggerOutcome::Fired(_)));
        list.on_scroll(5.0, 50);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(list.load_gate().state(), LoadState::Loading);

        list.complete_load(LoadCompletion::More);
        assert_eq!(list.load_gate().state(), LoadState::Idle);
    }

    #[test]
    fn programmatic_scroll_does_not_load() {
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let mut list = VirtualList::new(VirtualListConfig::new(20.0))
            .with_loader(move |_req: LoadRequest| *sink.borrow_mut() += 1);
        list.attach_manual();
        list.on_resize(100.0);
        list.scroll_to_index(0, 50);
        list.scroll_by(-500.0);
        assert_eq!(*seen.borrow(), 0);
        assert_eq!(list.viewport().scroll_offset, 0.0);
    }

    #[test]
    fn with_loader_keeps_attachment() {
        let list = attached(VirtualListConfig::new(20.0));
        let list = list.with_loader(|_req: LoadRequest| {});
        assert!(list.is_attached());
    }

    #[test]
    fn scroll_helpers_clamp() {
        let mut list = attached(VirtualListConfig::new(10.0));
        list.on_resize(100.0);
        assert_eq!(list.max_scroll_offset(50), 400.0);
        assert_eq!(list.scroll_to_index(45, 50), 400.0);
        assert!(list.is_at_bottom(50, 0.0));
        assert_eq!(list.scroll_to_index(3, 50), 30.0);
        assert!(!list.is_at_bottom(50, 0.5));
        assert_eq!(list.scroll_to_bottom(50), 400.0);
        assert_eq!(list.scroll_by(-25.0), 375.0);
        assert_eq!(list.scroll_to_index(10, 0), 0.0);
    }

    #[test]
    fn short_list_is_always_at_bottom() {
        let mut list = attached(VirtualListConfig::new(10.0));
        list.on_resize(500.0);
        assert_eq!(list.max_scroll_offset(5), 0.0);
        assert!(list.is_at_bottom(5, 0.0));
    }

    #[test]
    fn bottom_edge_policy_from_config() {
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let config = VirtualListConfig::new(10.0)
            .with_load_edge(LoadEdge::Bottom)
            .with_load_threshold(LoadThreshold::Pixels(25.0));
        let mut list = VirtualList::new(config)
            .with_loader(move |_req: LoadRequest| *sink.borrow_mut() += 1);
        list.attach_manual();
        list.on_resize(100.0);
        list.on_scroll(0.0, 50);
        assert_eq!(*seen.borrow(), 0);
        list.on_scroll(380.0, 50);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn set_config_updates_policy() {
        let mut list = attached(VirtualListConfig::new(10.0));
        list.on_resize(100.0);
        list.set_config(VirtualListConfig::new(10.0).with_load_edge(LoadEdge::Bottom));
        let outcome = list.on_scroll(0.0, 50);
        assert_eq!(outcome.load, TriggerOutcome::Quiet);
        assert_eq!(list.config().load_edge, LoadEdge::Bottom);
    }

    #[test]
    fn zero_item_height_is_safe() {
        let mut list = attached(VirtualListConfig::new(0.0));
        list.on_resize(100.0);
        let outcome = list.on_scroll(50.0, 10);
        assert!(outcome.window.is_empty());
        assert_eq!(outcome.load, TriggerOutcome::Quiet);
        let rendered = list.render(&[1, 2, 3], |s| s.len());
        assert_eq!(rendered.output, 0);
        assert_eq!(list.scroll_to_index(2, 3), 0.0);
    }
}
