#![forbid(unsafe_code)]

//! Load-more triggering near a scroll edge.
//!
//! Scroll handling asks the [`LoadMoreTrigger`] whether the viewport is
//! within the configured distance of the load edge. Firing is gated by a
//! small state machine so a burst of scroll events inside the band produces
//! one request, not one per event:
//!
//! ```text
//!            in band, armed              complete(More | Failed)
//!   Idle ───────────────────▶ Loading ───────────────────────────▶ Idle
//!     ▲                          │
//!     │ reset()                  │ complete(Exhausted)
//!     └──────── Exhausted ◀──────┘
//! ```
//!
//! The gate disarms when it fires and re-arms only once the viewport has
//! left the band, so a single threshold crossing requests at most one load.
//!
//! Loaders are fire-and-forget. An `Err` or a panic from the loader is
//! contained here, logged, and treated as `complete(Failed)`; it never
//! reaches the render path.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;

use crate::config::{LoadEdge, LoadThreshold};
use crate::viewport::ViewportState;
use crate::window::is_valid_item_height;

/// Request handed to a loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadRequest {
    /// Monotonic request number, starting at 1.
    pub seq: u64,
    /// Edge the viewport approached.
    pub edge: LoadEdge,
    /// Offset at the time of the request.
    pub scroll_offset: f64,
    /// Item count at the time of the request.
    pub item_count: usize,
}

/// Why a load request could not be handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The receiving side is gone.
    Disconnected,
    /// The loader refused the request.
    Rejected(String),
    /// The loader panicked; carries the panic message.
    Panicked(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("load-more receiver disconnected"),
            Self::Rejected(reason) => write!(f, "load-more rejected: {reason}"),
            Self::Panicked(msg) => write!(f, "load-more loader panicked: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// A sink for load-more requests.
pub trait LoadMore {
    /// Start loading more items. Completion is reported separately through
    /// [`LoadGate::complete`].
    fn load_more(&mut self, request: LoadRequest) -> Result<(), LoadError>;
}

impl<F> LoadMore for F
where
    F: FnMut(LoadRequest),
{
    fn load_more(&mut self, request: LoadRequest) -> Result<(), LoadError> {
        self(request);
        Ok(())
    }
}

impl LoadMore for mpsc::Sender<LoadRequest> {
    fn load_more(&mut self, request: LoadRequest) -> Result<(), LoadError> {
        self.send(request).map_err(|_| LoadError::Disconnected)
    }
}

/// Loader that accepts and ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoader;

impl LoadMore for NoopLoader {
    fn load_more(&mut self, _request: LoadRequest) -> Result<(), LoadError> {
        Ok(())
    }
}

/// Gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Ready to fire.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The source reported no more items.
    Exhausted,
}

/// How a load finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCompletion {
    /// Items arrived; more may follow.
    More,
    /// The source has nothing further.
    Exhausted,
    /// The load failed; a new crossing may retry.
    Failed,
}

/// The `idle → loading → idle` state machine.
#[derive(Debug, Clone, Default)]
pub struct LoadGate {
    state: LoadState,
    /// Cleared when firing, set again once the viewport leaves the band.
    disarmed: bool,
    seq: u64,
}

impl LoadGate {
    /// Create an idle, armed gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Number of requests issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.seq
    }

    /// Feed one band observation. Returns the sequence number to use when
    /// the loader should fire.
    pub fn observe(&mut self, in_band: bool) -> Option<u64> {
        if !in_band {
            self.disarmed = false;
            return None;
        }
        if self.state != LoadState::Idle || self.disarmed {
            return None;
        }
        self.state = LoadState::Loading;
        self.disarmed = true;
        self.seq = self.seq.saturating_add(1);
        Some(self.seq)
    }

    /// Report the outcome of the in-flight request.
    ///
    /// Ignored unless a request is in flight.
    pub fn complete(&mut self, completion: LoadCompletion) {
        if self.state != LoadState::Loading {
            return;
        }
        self.state = match completion {
            LoadCompletion::More | LoadCompletion::Failed => LoadState::Idle,
            LoadCompletion::Exhausted => LoadState::Exhausted,
        };
    }

    /// Return to idle and re-arm, e.g. after the item source changed.
    pub fn reset(&mut self) {
        self.state = LoadState::Idle;
        self.disarmed = false;
    }
}

/// Whether `viewport` is within `distance` of `edge`.
///
/// Uses a strict comparison: with the default top edge and a distance of
/// two item heights, offset `2 * item_height` is outside the band.
#[must_use]
pub fn in_load_band(
    edge: LoadEdge,
    distance: f64,
    viewport: ViewportState,
    total_extent: f64,
) -> bool {
    match edge {
        LoadEdge::Top => viewport.scroll_offset < distance,
        LoadEdge::Bottom => total_extent - viewport.bottom() < distance,
    }
}

/// What a scroll event did to the trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// Outside the band, gated, or exhausted.
    Quiet,
    /// The loader accepted a request.
    Fired(LoadRequest),
    /// The loader failed; the gate is idle again.
    Failed(LoadRequest, LoadError),
}

impl TriggerOutcome {
    /// The request issued by this event, if any.
    #[must_use]
    pub fn request(&self) -> Option<&LoadRequest> {
        match self {
            Self::Quiet => None,
            Self::Fired(req) | Self::Failed(req, _) => Some(req),
        }
    }
}

/// Edge detection plus gate plus loader.
#[derive(Debug)]
pub struct LoadMoreTrigger<L> {
    edge: LoadEdge,
    threshold: LoadThreshold,
    gate: LoadGate,
    loader: L,
}

impl LoadMoreTrigger<NoopLoader> {
    /// Trigger that never calls out.
    #[must_use]
    pub fn noop(edge: LoadEdge, threshold: LoadThreshold) -> Self {
        Self::new(edge, threshold, NoopLoader)
    }
}

impl<L: LoadMore> LoadMoreTrigger<L> {
    /// Create a trigger for `edge` with the given loader.
    #[must_use]
    pub fn new(edge: LoadEdge, threshold: LoadThreshold, loader: L) -> Self {
        Self {
            edge,
            threshold,
            gate: LoadGate::new(),
            loader,
        }
    }

    /// Replace the loader, keeping gate state.
    pub fn with_loader<M: LoadMore>(self, loader: M) -> LoadMoreTrigger<M> {
        LoadMoreTrigger {
            edge: self.edge,
            threshold: self.threshold,
            gate: self.gate,
            loader,
        }
    }

    /// Gate state.
    #[must_use]
    pub fn gate(&self) -> &LoadGate {
        &self.gate
    }

    /// Mutable access to the loader.
    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Update edge and threshold.
    pub fn set_policy(&mut self, edge: LoadEdge, threshold: LoadThreshold) {
        self.edge = edge;
        self.threshold = threshold;
    }

    /// Evaluate a scroll position and fire the loader if warranted.
    pub fn on_scroll(
        &mut self,
        viewport: ViewportState,
        item_height: f64,
        item_count: usize,
    ) -> TriggerOutcome {
        if !is_valid_item_height(item_height) {
            return TriggerOutcome::Quiet;
        }
        let distance = self.threshold.resolve(item_height);
        let total_extent = item_count as f64 * item_height;
        let in_band = in_load_band(self.edge, distance, viewport, total_extent);
        let Some(seq) = self.gate.observe(in_band) else {
            return TriggerOutcome::Quiet;
        };

        let request = LoadRequest {
            seq,
            edge: self.edge,
            scroll_offset: viewport.scroll_offset,
            item_count,
        };
        #[cfg(feature = "tracing")]
        tracing::info!(
            seq,
            edge = %self.edge,
            offset = viewport.scroll_offset,
            items = item_count,
            "load-more fired"
        );

        let loader = &mut self.loader;
        let result = catch_unwind(AssertUnwindSafe(|| loader.load_more(request)))
            .unwrap_or_else(|payload| Err(LoadError::Panicked(panic_message(payload.as_ref()))));

        match result {
            Ok(()) => TriggerOutcome::Fired(request),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(seq, error = %err, "load-more loader failed");
                self.gate.complete(LoadCompletion::Failed);
                TriggerOutcome::Failed(request, err)
            }
        }
    }

    /// Report completion of the in-flight request.
    pub fn complete(&mut self, completion: LoadCompletion) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            seq = self.gate.issued(),
            in_flight = self.gate.is_loading(),
            ?completion,
            "load-more completion"
        );
        self.gate.complete(completion);
    }

    /// Re-arm the gate and leave any exhausted state.
    pub fn reset(&mut self) {
        self.gate.reset();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
