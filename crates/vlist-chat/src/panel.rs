#![forbid(unsafe_code)]

//! The chat history panel.
//!
//! # Data flow
//!
//! ```text
//!   host scroll ──▶ on_scroll ──▶ VirtualList ──(near top)──▶ mpsc::Sender
//!                                                                  │
//!   tick(now) ◀── drains requests ─────────────────────────────────┘
//!       │ ├─▶ MockHistory::request / poll ──▶ prepend + anchor + complete_load
//!       │ └─▶ MockResponder::poll ──▶ mark sent + append reply
//!       ▼
//!   view() ──▶ rows[window] formatted to the panel width
//! ```
//!
//! # Follow mode
//!
//! While the viewport sits at the bottom the panel follows new messages:
//! appends and container resizes keep the newest row in view. Scrolling
//! away from the bottom stops following; sending a message resumes it.
//! Older pages never move visible content: the offset is shifted by the
//! height of the rows inserted above.

use std::sync::mpsc;

use web_time::Instant;

use vlist_core::{
    LoadCompletion, LoadRequest, RenderedSlice, ScrollOutcome, SizeObserver, VirtualList,
    VirtualListConfig,
};

use crate::history::MockHistory;
use crate::message::{ChatClock, DeliveryStatus, Message, MessageKind, Sender};
use crate::responder::MockResponder;
use crate::rows::{ChatRow, build_rows};
use crate::text::{single_line, truncate_to_width};

/// Shown for an empty conversation.
pub const NO_MESSAGES: &str = "No messages yet";

/// Row height in pixels.
pub const DEFAULT_ITEM_HEIGHT: f64 = 100.0;

/// Rows rendered beyond each edge of the viewport.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Row width in columns.
pub const DEFAULT_WIDTH: usize = 80;

/// Panel settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPanelConfig {
    pub list: VirtualListConfig,
    /// Row width in display columns.
    pub width: usize,
    /// Slack, in pixels, for deciding the viewport is at the bottom.
    pub follow_tolerance: f64,
}

impl Default for ChatPanelConfig {
    fn default() -> Self {
        Self {
            list: VirtualListConfig::new(DEFAULT_ITEM_HEIGHT).with_overscan(DEFAULT_OVERSCAN),
            width: DEFAULT_WIDTH,
            follow_tolerance: 1.0,
        }
    }
}

/// What one [`ChatPanel::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Load requests drained from the list.
    pub requested: usize,
    /// Older messages inserted at the top.
    pub prepended: usize,
    /// Agent replies appended.
    pub replies: usize,
    /// A history page failed.
    pub failed: bool,
    /// History reported exhaustion.
    pub exhausted: bool,
}

/// Rendered panel content.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    /// Placeholder for an empty conversation.
    Empty(&'static str),
    /// Windowed rows plus whether older history is loading.
    Rows {
        slice: RenderedSlice<Vec<String>>,
        loading: bool,
    },
}

/// A scrollable, paged conversation.
#[derive(Debug)]
pub struct ChatPanel {
    config: ChatPanelConfig,
    messages: Vec<Message>,
    rows: Vec<ChatRow>,
    list: VirtualList<mpsc::Sender<LoadRequest>>,
    requests: mpsc::Receiver<LoadRequest>,
    history: MockHistory,
    responder: MockResponder,
    clock: ChatClock,
    follow: bool,
    next_local_id: u64,
}

impl ChatPanel {
    /// Empty panel paging older messages from `history`.
    #[must_use]
    pub fn new(config: ChatPanelConfig, history: MockHistory, clock: ChatClock) -> Self {
        let (tx, rx) = mpsc::channel();
        let list = VirtualList::new(config.list.clone()).with_loader(tx);
        Self {
            config,
            messages: Vec::new(),
            rows: Vec::new(),
            list,
            requests: rx,
            history,
            responder: MockResponder::new(),
            clock,
            follow: true,
            next_local_id: 1,
        }
    }

    /// Seed the newest messages (oldest first).
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self.rebuild_rows();
        self.stick_to_bottom();
        self
    }

    #[must_use]
    pub fn with_responder(mut self, responder: MockResponder) -> Self {
        self.responder = responder;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ChatPanelConfig {
        &self.config
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn rows(&self) -> &[ChatRow] {
        &self.rows
    }

    /// The underlying list.
    #[must_use]
    pub fn list(&self) -> &VirtualList<mpsc::Sender<LoadRequest>> {
        &self.list
    }

    #[must_use]
    pub fn history(&self) -> &MockHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut MockHistory {
        &mut self.history
    }

    #[must_use]
    pub fn responder(&self) -> &MockResponder {
        &self.responder
    }

    /// Offset the host should apply to its scroll container.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.list.viewport().scroll_offset
    }

    #[must_use]
    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Whether an older page is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.list.load_gate().is_loading()
    }

    /// Start observing the scroll container.
    pub fn attach(&mut self, observer: Option<Box<dyn SizeObserver>>) -> bool {
        self.list.attach(observer)
    }

    /// Attach for hosts that deliver events by hand.
    pub fn attach_manual(&mut self) -> bool {
        self.list.attach_manual()
    }

    pub fn detach(&mut self) {
        self.list.detach();
    }

    /// Container resize. Keeps the newest row in view while following.
    pub fn on_resize(&mut self, height: f64) -> bool {
        let changed = self.list.on_resize(height);
        if self.follow {
            self.stick_to_bottom();
        }
        changed
    }

    /// User scroll.
    pub fn on_scroll(&mut self, offset: f64) -> ScrollOutcome {
        let outcome = self.list.on_scroll(offset, self.rows.len());
        if outcome.update.is_applied() {
            self.follow = self
                .list
                .is_at_bottom(self.rows.len(), self.config.follow_tolerance);
        }
        outcome
    }

    /// Send a user message. Blank content is ignored.
    ///
    /// Returns the new message id.
    pub fn send(&mut self, content: &str, now: Instant) -> Option<String> {
        if content.trim().is_empty() {
            return None;
        }
        let id = self.next_id();
        let message = Message::text(id.clone(), Sender::user(), self.clock.timestamp(now), content)
            .with_status(DeliveryStatus::Sending);
        self.messages.push(message);
        self.responder.schedule(id.clone(), now);
        self.rebuild_rows();
        self.follow = true;
        self.stick_to_bottom();
        Some(id)
    }

    /// Advance simulated time: hand load requests to the history, collect
    /// pages and deliver due replies.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport::default();

        for _request in self.requests.try_iter() {
            report.requested += 1;
            if self.history.is_exhausted() && !self.history.is_pending() {
                self.list.complete_load(LoadCompletion::Exhausted);
                report.exhausted = true;
            } else {
                self.history.request(now);
            }
        }

        match self.history.poll(now) {
            Some(Ok(page)) => {
                report.prepended = page.messages.len();
                report.exhausted |= page.exhausted;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    messages = page.messages.len(),
                    exhausted = page.exhausted,
                    "history page arrived"
                );
                self.prepend(page.messages);
                self.list.complete_load(if page.exhausted {
                    LoadCompletion::Exhausted
                } else {
                    LoadCompletion::More
                });
            }
            Some(Err(_err)) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_err, "history page failed");
                report.failed = true;
                self.list.complete_load(LoadCompletion::Failed);
            }
            None => {}
        }

        for id in self.responder.poll(now) {
            let Some(pos) = self.messages.iter().position(|m| m.id == id) else {
                continue;
            };
            self.messages[pos].status = Some(DeliveryStatus::Sent);
            let reply_id = self.next_id();
            let reply = MockResponder::reply(&self.messages[pos], reply_id, self.clock.timestamp(now));
            self.messages.push(reply);
            report.replies += 1;
        }
        if report.replies > 0 {
            self.rebuild_rows();
            if self.follow {
                self.stick_to_bottom();
            }
        }

        report
    }

    /// Swap in another conversation and re-arm paging.
    pub fn replace_conversation(&mut self, messages: Vec<Message>, history: MockHistory) {
        while self.requests.try_recv().is_ok() {}
        self.messages = messages;
        self.history = history;
        self.rebuild_rows();
        self.list.reset_load();
        self.follow = true;
        self.stick_to_bottom();
    }

    /// Current content.
    #[must_use]
    pub fn view(&self) -> PanelView {
        if self.messages.is_empty() {
            return PanelView::Empty(NO_MESSAGES);
        }
        let slice = self.list.render(&self.rows, |rows| {
            rows.iter().map(|row| self.format_row(row)).collect::<Vec<_>>()
        });
        PanelView::Rows {
            slice,
            loading: self.is_loading(),
        }
    }

    /// Messages as pretty JSON.
    pub fn transcript_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.messages)
    }

    fn prepend(&mut self, mut older: Vec<Message>) {
        if older.is_empty() {
            return;
        }
        let before = self.rows.len();
        older.append(&mut self.messages);
        self.messages = older;
        self.rebuild_rows();
        if self.follow {
            self.stick_to_bottom();
        } else {
            let added = self.rows.len().saturating_sub(before);
            self.list.scroll_by(added as f64 * self.config.list.item_height);
        }
    }

    fn rebuild_rows(&mut self) {
        self.rows = build_rows(&self.messages);
    }

    fn stick_to_bottom(&mut self) {
        self.list.scroll_to_bottom(self.rows.len());
    }

    fn next_id(&mut self) -> String {
        let id = format!("local-{:04}", self.next_local_id);
        self.next_local_id += 1;
        id
    }

    fn format_row(&self, row: &ChatRow) -> String {
        let line = match row {
            ChatRow::DateSeparator(date) => format!("── {date} ──"),
            ChatRow::Message(idx) => self
                .messages
                .get(*idx)
                .map(format_message)
                .unwrap_or_default(),
        };
        truncate_to_width(&line, self.config.width)
    }
}

fn format_message(message: &Message) -> String {
    let time = message
        .time_label()
        .unwrap_or_else(|| "--:--".to_string());
    let body = match &message.kind {
        MessageKind::Text => single_line(&message.content),
        MessageKind::Code { language } => match language {
            Some(lang) => format!("[code:{lang}] {}", single_line(&message.content)),
            None => format!("[code] {}", single_line(&message.content)),
        },
        MessageKind::Image => format!("[image] {}", message.content),
    };
    let quote = message
        .reply_to
        .as_ref()
        .map(|r| format!("↪ {}: {} | ", r.sender_name, r.excerpt))
        .unwrap_or_default();
    let status = message
        .status
        .map(|s| format!(" · {s}"))
        .unwrap_or_default();
    format!("{time} {}: {quote}{body}{status}", message.sender.name)
}
