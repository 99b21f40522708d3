#![forbid(unsafe_code)]

//! Simulated message history served in pages.
//!
//! [`MockHistory`] stands in for a backend: a request is accepted
//! immediately and its page becomes available after a fixed delay, observed
//! by polling with the caller's clock. Pages are taken from the newest end
//! of the backlog, so each page is older than the last.

use std::fmt;
use std::time::Duration;

use web_time::Instant;

use crate::message::{DeliveryStatus, Message, MessageKind, Sender, format_rfc3339};

/// Messages per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Time from request to page.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// A page of older messages, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub messages: Vec<Message>,
    /// No older messages remain.
    pub exhausted: bool,
}

/// A page request that did not produce messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The simulated backend failed this request.
    Unavailable,
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("history backend unavailable"),
        }
    }
}

impl std::error::Error for HistoryError {}

#[derive(Debug, Clone, Copy)]
struct Pending {
    ready_at: Instant,
    fail: bool,
}

/// Deterministic paged history.
#[derive(Debug, Clone)]
pub struct MockHistory {
    /// Oldest first.
    backlog: Vec<Message>,
    page_size: usize,
    delay: Duration,
    pending: Option<Pending>,
    fail_next: bool,
}

impl MockHistory {
    /// Serve `backlog` (oldest first) in pages of `page_size` (at least 1).
    #[must_use]
    pub fn new(backlog: Vec<Message>, page_size: usize) -> Self {
        Self {
            backlog,
            page_size: page_size.max(1),
            delay: DEFAULT_DELAY,
            pending: None,
            fail_next: false,
        }
    }

    /// History with nothing to serve.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), DEFAULT_PAGE_SIZE)
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Messages not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.backlog.len()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.backlog.is_empty()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Make the next request fail.
    pub fn fail_next_request(&mut self) {
        self.fail_next = true;
    }

    /// Ask for the next page. Returns `false` if one is already pending.
    pub fn request(&mut self, now: Instant) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(Pending {
            ready_at: now + self.delay,
            fail: std::mem::take(&mut self.fail_next),
        });
        true
    }

    /// Collect the pending page once its delay has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Result<HistoryPage, HistoryError>> {
        let pending = self.pending?;
        if now < pending.ready_at {
            return None;
        }
        self.pending = None;
        if pending.fail {
            return Some(Err(HistoryError::Unavailable));
        }
        let split = self.backlog.len().saturating_sub(self.page_size);
        let messages = self.backlog.split_off(split);
        Some(Ok(HistoryPage {
            messages,
            exhausted: self.backlog.is_empty(),
        }))
    }
}

const LINES: &[&str] = &[
    "Can you summarise where the simulation ended up?",
    "Three of the five agents converged on the cooperative strategy.",
    "What changed between run 4 and run 5?",
    "The reward for defection was lowered, so the holdouts switched after round 12.",
    "Show me the scoring function.",
    "Looks good. Can we try a longer horizon next?",
    "Queued a 200-round run with the same seed.",
];

const CODE: &str = "fn score(round: u32, coop: bool) -> f64 {\n    if coop { 3.0 } else { 5.0 / f64::from(round + 1) }\n}";

/// `count` alternating user/agent messages, oldest first, the newest at
/// `newest_unix` and each `spacing_secs` apart.
#[must_use]
pub fn synthetic_backlog(count: usize, newest_unix: u64, spacing_secs: u64) -> Vec<Message> {
    (0..count)
        .map(|i| {
            let age = (count - 1 - i) as u64;
            let ts = format_rfc3339(newest_unix.saturating_sub(age.saturating_mul(spacing_secs)))
                .unwrap_or_default();
            let id = format!("h{i:05}");
            if i % 2 == 0 {
                Message::text(id, Sender::user(), ts, LINES[i % LINES.len()])
                    .with_status(DeliveryStatus::Read)
            } else if i % 10 == 9 {
                Message::text(id, Sender::agent(), ts, CODE).with_kind(MessageKind::Code {
                    language: Some("rust".into()),
                })
            } else if i % 22 == 21 {
                Message::text(id, Sender::agent(), ts, format!("https://example.com/plot-{i}.png"))
                    .with_kind(MessageKind::Image)
            } else {
                Message::text(id, Sender::agent(), ts, LINES[i % LINES.len()])
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_arrive_after_delay_newest_first() {
        let t0 = Instant::now();
        let mut history = MockHistory::new(synthetic_backlog(45, 1_718_409_600, 60), 20)
            .with_delay(Duration::from_millis(100));

        assert!(history.request(t0));
        assert!(!history.request(t0));
        assert!(history.poll(t0 + Duration::from_millis(99)).is_none());

        let page = history
            .poll(t0 + Duration::from_millis(100))
            .expect("ready")
            .expect("ok");
        assert_eq!(page.messages.len(), 20);
        assert_eq!(page.messages[0].id, "h00025");
        assert_eq!(page.messages[19].id, "h00044");
        assert!(!page.exhausted);
        assert!(!history.is_pending());

        history.request(t0);
        history.poll(t0 + Duration::from_secs(1));
        history.request(t0);
        let last = history
            .poll(t0 + Duration::from_secs(1))
            .expect("ready")
            .expect("ok");
        assert_eq!(last.messages.len(), 5);
        assert!(last.exhausted);
        assert!(history.is_exhausted());
    }

    #[test]
    fn failure_is_one_shot() {
        let t0 = Instant::now();
        let mut history = MockHistory::new(synthetic_backlog(5, 1_718_409_600, 60), 2)
            .with_delay(Duration::ZERO);
        history.fail_next_request();
        history.request(t0);
        assert_eq!(history.poll(t0), Some(Err(HistoryError::Unavailable)));
        assert_eq!(history.remaining(), 5);

        history.request(t0);
        assert!(matches!(history.poll(t0), Some(Ok(_))));
        assert_eq!(history.remaining(), 3);
    }

    #[test]
    fn poll_without_request_is_quiet() {
        let mut history = MockHistory::empty();
        assert!(history.poll(Instant::now()).is_none());
    }

    #[test]
    fn empty_history_reports_exhausted_page() {
        let t0 = Instant::now();
        let mut history = MockHistory::empty().with_delay(Duration::ZERO);
        history.request(t0);
        let page = history.poll(t0).expect("ready").expect("ok");
        assert!(page.messages.is_empty());
        assert!(page.exhausted);
    }

    #[test]
    fn synthetic_backlog_is_ordered() {
        let backlog = synthetic_backlog(30, 1_718_409_600, 3600);
        assert_eq!(backlog.len(), 30);
        assert_eq!(backlog[29].timestamp, "2024-06-15T00:00:00Z");
        assert!(backlog.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(matches!(backlog[9].kind, MessageKind::Code { .. }));
        assert!(matches!(backlog[21].kind, MessageKind::Image));
        assert_eq!(backlog, synthetic_backlog(30, 1_718_409_600, 3600));
    }
}
