#![forbid(unsafe_code)]

//! Simulated agent replies.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

use crate::message::{Message, ReplyPreview, Sender};

/// Time between a user message and the agent's reply.
pub const REPLY_DELAY: Duration = Duration::from_millis(1000);

/// Body of every simulated reply.
pub const REPLY_TEXT: &str =
    "This is a simulated agent response. The actual implementation will connect to your backend API.";

/// Queues one agent reply per user message.
#[derive(Debug, Clone)]
pub struct MockResponder {
    delay: Duration,
    /// `(due, user message id)`, in due order.
    queue: VecDeque<(Instant, String)>,
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResponder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            delay: REPLY_DELAY,
            queue: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replies not yet delivered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Schedule a reply to `message_id`.
    pub fn schedule(&mut self, message_id: impl Into<String>, now: Instant) {
        self.queue.push_back((now + self.delay, message_id.into()));
    }

    /// Ids of user messages whose reply is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<String> {
        let mut due = Vec::new();
        while self.queue.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, id)) = self.queue.pop_front() {
                due.push(id);
            }
        }
        due
    }

    /// The reply message for `original`.
    #[must_use]
    pub fn reply(original: &Message, id: impl Into<String>, timestamp: impl Into<String>) -> Message {
        Message::text(id, Sender::agent(), timestamp, REPLY_TEXT)
            .with_reply_to(ReplyPreview::of(original))
    }
}
