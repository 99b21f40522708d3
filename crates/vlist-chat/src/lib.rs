#![forbid(unsafe_code)]

//! Chat history panel built on [`vlist_core`].
//!
//! A conversation is flattened into uniform-height rows (a date separator
//! ahead of each day's messages) and shown through a
//! [`VirtualList`](vlist_core::VirtualList). Scrolling near the top pages in
//! older history from a [`MockHistory`]; sending a message schedules a
//! simulated agent reply from a [`MockResponder`]. Time is injected, so the
//! whole panel runs deterministically under a synthetic clock.

pub mod history;
pub mod message;
pub mod panel;
pub mod responder;
pub mod rows;
pub mod text;

pub use history::{HistoryError, HistoryPage, MockHistory, synthetic_backlog};
pub use message::{
    ChatClock, DeliveryStatus, Message, MessageKind, ReplyPreview, Sender, SenderRole,
    format_rfc3339, parse_messages, parse_rfc3339,
};
pub use panel::{ChatPanel, ChatPanelConfig, NO_MESSAGES, PanelView, TickReport};
pub use responder::MockResponder;
pub use rows::{ChatRow, build_rows};
pub use text::truncate_to_width;
