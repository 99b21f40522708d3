#![forbid(unsafe_code)]

//! Viewport tracking: the live `{scroll_offset, container_height}` pair.
//!
//! The tracker is fed by two explicit subscription points,
//! [`ViewportTracker::on_resize`] and [`ViewportTracker::on_scroll`], so the
//! host decides where the signals come from (a DOM `ResizeObserver`, a
//! terminal resize event, or a synthetic script in tests).
//!
//! Observation is tied to an attached [`SizeObserver`]. Detaching, or
//! dropping the tracker while attached, disconnects the observer exactly
//! once.

use crate::window::sanitize_measure;

/// Measured state of the scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ViewportState {
    /// Distance scrolled from the top of the content.
    pub scroll_offset: f64,
    /// Height of the visible container.
    pub container_height: f64,
}

impl ViewportState {
    /// Create a state, clamping both measurements to finite values `>= 0`.
    #[must_use]
    pub fn new(scroll_offset: f64, container_height: f64) -> Self {
        Self {
            scroll_offset: sanitize_measure(scroll_offset),
            container_height: sanitize_measure(container_height),
        }
    }

    /// Offset of the bottom edge of the viewport.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.scroll_offset + self.container_height
    }
}

/// A source of container size notifications that can be disconnected.
///
/// Implemented by the wasm `ResizeObserver` binding and by test doubles.
pub trait SizeObserver {
    /// Stop delivering notifications. Called at most once per attachment.
    fn disconnect(&mut self);
}

impl<O: SizeObserver + ?Sized> SizeObserver for Box<O> {
    fn disconnect(&mut self) {
        (**self).disconnect();
    }
}

/// Result of applying a scroll notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollUpdate {
    /// The tracker is not attached; nothing changed.
    Ignored,
    /// The offset was recorded.
    Applied {
        /// Offset before the event.
        previous: f64,
        /// Offset after the event.
        current: f64,
    },
}

impl ScrollUpdate {
    /// Whether the event reached the viewport state.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Tracks container height and scroll offset while attached.
pub struct ViewportTracker {
    state: ViewportState,
    observer: Option<Box<dyn SizeObserver>>,
}

impl std::fmt::Debug for ViewportTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportTracker")
            .field("state", &self.state)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportTracker {
    /// Create a detached tracker with zero offset and height.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ViewportState::default(),
            observer: None,
        }
    }

    /// Current measurements.
    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Current scroll offset.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.state.scroll_offset
    }

    /// Current container height.
    #[must_use]
    pub fn container_height(&self) -> f64 {
        self.state.container_height
    }

    /// Whether an observer is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.observer.is_some()
    }

    /// Start observing a container.
    ///
    /// `None` (no container rendered yet) leaves the tracker detached.
    /// Attaching while already attached disconnects the previous observer
    /// first. Returns whether the tracker is now attached.
    pub fn attach(&mut self, observer: Option<Box<dyn SizeObserver>>) -> bool {
        let Some(observer) = observer else {
            #[cfg(feature = "tracing")]
            tracing::debug!("viewport attach skipped: no container");
            return self.is_attached();
        };
        self.detach();
        self.observer = Some(observer);
        #[cfg(feature = "tracing")]
        tracing::debug!("viewport attached");
        true
    }

    /// Stop observing. Measurements are kept; further events are ignored.
    pub fn detach(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
            #[cfg(feature = "tracing")]
            tracing::debug!("viewport detached");
        }
    }

    /// Record a container size notification. Ignored while detached.
    ///
    /// Returns whether the height changed.
    pub fn on_resize(&mut self, height: f64) -> bool {
        if !self.is_attached() {
            return false;
        }
        let height = sanitize_measure(height);
        let changed = height != self.state.container_height;
        self.state.container_height = height;
        changed
    }

    /// Record a scroll notification. Ignored while detached.
    pub fn on_scroll(&mut self, offset: f64) -> ScrollUpdate {
        if !self.is_attached() {
            return ScrollUpdate::Ignored;
        }
        let previous = self.state.scroll_offset;
        self.state.scroll_offset = sanitize_measure(offset);
        ScrollUpdate::Applied {
            previous,
            current: self.state.scroll_offset,
        }
    }

    /// Move the offset programmatically (scroll-to, anchoring).
    ///
    /// Unlike [`on_scroll`](Self::on_scroll) this works while detached, so a
    /// host can position the list before the container exists.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.state.scroll_offset = sanitize_measure(offset);
    }

    /// Replace the whole state, e.g. when restoring a saved position.
    pub fn restore(&mut self, state: ViewportState) {
        self.state = ViewportState::new(state.scroll_offset, state.container_height);
    }
}

impl Drop for ViewportTracker {
    fn drop(&mut self) {
        self.detach();
    }
}
