#![forbid(unsafe_code)]

//! Browser binding for the viewport tracker (wasm32 only).
//!
//! [`DomResizeObserver`] wraps a DOM `ResizeObserver` on the scroll
//! container and reports the observed content height. Passing it to
//! [`VirtualList::attach`](crate::list::VirtualList::attach) ties its
//! lifetime to the list: detaching disconnects the DOM observer.
//!
//! The host still owns the event plumbing: the height callback should
//! forward to `on_resize`, and the container's `scroll` listener to
//! `on_scroll` with [`scroll_offset`].

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, ResizeObserver, ResizeObserverEntry};

use crate::viewport::SizeObserver;

/// A live `ResizeObserver` plus the closure it calls.
pub struct DomResizeObserver {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, ResizeObserver)>,
}

impl DomResizeObserver {
    /// Observe `element`, calling `on_height` with the first entry's
    /// `contentRect.height` on every notification.
    pub fn observe<F>(element: &Element, mut on_height: F) -> Result<Self, JsValue>
    where
        F: FnMut(f64) + 'static,
    {
        let callback = Closure::<dyn FnMut(js_sys::Array, ResizeObserver)>::new(
            move |entries: js_sys::Array, _observer: ResizeObserver| {
                if let Ok(entry) = entries.get(0).dyn_into::<ResizeObserverEntry>() {
                    on_height(entry.content_rect().height());
                }
            },
        );
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(element);
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl SizeObserver for DomResizeObserver {
    fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

/// Current vertical scroll position of `element`.
#[must_use]
pub fn scroll_offset(element: &Element) -> f64 {
    f64::from(element.scroll_top())
}
