#![forbid(unsafe_code)]

//! Synthetic events and observers for exercising a list without a host.
//!
//! Enabled for this crate's tests and, for dependants, through the
//! `test-helpers` feature.

use std::cell::Cell;
use std::rc::Rc;

use crate::list::VirtualList;
use crate::load_more::{LoadMore, LoadRequest};
use crate::viewport::SizeObserver;
use crate::window::VisibleWindow;

/// Observer that counts disconnects.
#[derive(Debug)]
pub struct RecordingObserver {
    disconnects: Rc<Cell<u32>>,
}

/// Read side of a [`RecordingObserver`].
#[derive(Debug, Clone)]
pub struct DisconnectProbe {
    disconnects: Rc<Cell<u32>>,
}

impl RecordingObserver {
    /// Create an observer and the probe that watches it.
    #[must_use]
    pub fn pair() -> (Box<dyn SizeObserver>, DisconnectProbe) {
        let disconnects = Rc::new(Cell::new(0));
        let observer = Self {
            disconnects: Rc::clone(&disconnects),
        };
        (Box::new(observer), DisconnectProbe { disconnects })
    }
}

impl SizeObserver for RecordingObserver {
    fn disconnect(&mut self) {
        self.disconnects.set(self.disconnects.get() + 1);
    }
}

impl DisconnectProbe {
    /// Times the observer was disconnected.
    #[must_use]
    pub fn disconnects(&self) -> u32 {
        self.disconnects.get()
    }
}

/// A host notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    Resize(f64),
    Scroll(f64),
}

/// State after one replayed event.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    pub event: ViewportEvent,
    pub window: VisibleWindow,
    pub fired: Option<LoadRequest>,
}

/// Feed `events` to `list` over `item_count` items, recording each frame.
pub fn replay<L, I>(list: &mut VirtualList<L>, item_count: usize, events: I) -> Vec<ReplayFrame>
where
    L: LoadMore,
    I: IntoIterator<Item = ViewportEvent>,
{
    events
        .into_iter()
        .map(|event| {
            let fired = match event {
                ViewportEvent::Resize(height) => {
                    list.on_resize(height);
                    None
                }
                ViewportEvent::Scroll(offset) => {
                    list.on_scroll(offset, item_count).load.request().copied()
                }
            };
            ReplayFrame {
                event,
                window: list.window(item_count),
                fired,
            }
        })
        .collect()
}

/// Scroll events from `from` to `to` in steps of `step` (inclusive of `to`).
#[must_use]
pub fn scroll_sweep(from: f64, to: f64, step: f64) -> Vec<ViewportEvent> {
    let step = step.abs();
    if !step.is_finite() || step == 0.0 || !from.is_finite() || !to.is_finite() {
        return vec![ViewportEvent::Scroll(to)];
    }
    let mut events = Vec::new();
    let mut offset = from;
    if from <= to {
        while offset < to {
            events.push(ViewportEvent::Scroll(offset));
            offset += step;
        }
    } else {
        while offset > to {
            events.push(ViewportEvent::Scroll(offset));
            offset -= step;
        }
    }
    events.push(ViewportEvent::Scroll(to));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VirtualListConfig;

    #[test]
    fn sweep_includes_endpoints() {
        let events = scroll_sweep(0.0, 30.0, 10.0);
        assert_eq!(
            events,
            vec![
                ViewportEvent::Scroll(0.0),
                ViewportEvent::Scroll(10.0),
                ViewportEvent::Scroll(20.0),
                ViewportEvent::Scroll(30.0),
            ]
        );
        let down = scroll_sweep(25.0, 0.0, 10.0);
        assert_eq!(down.first(), Some(&ViewportEvent::Scroll(25.0)));
        assert_eq!(down.last(), Some(&ViewportEvent::Scroll(0.0)));
        assert_eq!(down.len(), 4);
    }

    #[test]
    fn zero_step_jumps() {
        assert_eq!(
            scroll_sweep(0.0, 50.0, 0.0),
            vec![ViewportEvent::Scroll(50.0)]
        );
    }

    #[test]
    fn replay_records_windows() {
        let mut list = VirtualList::new(VirtualListConfig::new(10.0).with_overscan(0));
        let (observer, probe) = RecordingObserver::pair();
        list.attach(Some(observer));
        let mut events = vec![ViewportEvent::Resize(30.0)];
        events.extend(scroll_sweep(0.0, 20.0, 10.0));
        let frames = replay(&mut list, 100, events);
        let windows: Vec<_> = frames.iter().map(|f| f.window.range()).collect();
        assert_eq!(windows, vec![0..3, 0..3, 1..4, 2..5]);
        drop(list);
        assert_eq!(probe.disconnects(), 1);
    }
}
