#![forbid(unsafe_code)]

//! Chat message model and timestamps.
//!
//! Messages serialize with lowercase tags so transcripts stay readable:
//!
//! ```json
//! {"id":"m00001","content":"fn main() {}","kind":{"type":"code","language":"rust"},
//!  "sender":{"id":"agent1","name":"Assistant","role":"agent"},
//!  "timestamp":"2024-06-15T09:30:00Z","status":"sent"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use web_time::{Instant, SystemTime, UNIX_EPOCH};

use crate::text::truncate_to_width;

/// Display width of a reply excerpt.
const REPLY_EXCERPT_WIDTH: usize = 60;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    User,
    Agent,
}

/// Message author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: String,
    pub name: String,
    pub role: SenderRole,
}

impl Sender {
    /// The local user.
    #[must_use]
    pub fn user() -> Self {
        Self {
            id: "user1".into(),
            name: "User".into(),
            role: SenderRole::User,
        }
    }

    /// The simulated assistant.
    #[must_use]
    pub fn agent() -> Self {
        Self {
            id: "agent1".into(),
            name: "Assistant".into(),
            role: SenderRole::Agent,
        }
    }
}

/// Body type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    /// `content` holds the image URL.
    Image,
}

/// Delivery state of an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sending,
    Sent,
    Error,
    Read,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Error => "error",
            Self::Read => "read",
        })
    }
}

/// Quoted message shown above a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPreview {
    pub id: String,
    pub sender_name: String,
    pub excerpt: String,
}

impl ReplyPreview {
    /// Preview of `message`, excerpt cut to a single short line.
    #[must_use]
    pub fn of(message: &Message) -> Self {
        let first_line = message.content.lines().next().unwrap_or_default();
        Self {
            id: message.id.clone(),
            sender_name: message.sender.name.clone(),
            excerpt: truncate_to_width(first_line, REPLY_EXCERPT_WIDTH),
        }
    }
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub sender: Sender,
    /// RFC 3339, UTC.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReplyPreview>,
}

impl Message {
    /// Plain text message.
    #[must_use]
    pub fn text(
        id: impl Into<String>,
        sender: Sender,
        timestamp: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            kind: MessageKind::Text,
            sender,
            timestamp: timestamp.into(),
            status: None,
            reply_to: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: DeliveryStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_reply_to(mut self, reply: ReplyPreview) -> Self {
        self.reply_to = Some(reply);
        self
    }

    /// Timestamp parsed as RFC 3339 and shifted to UTC.
    #[must_use]
    pub fn timestamp_utc(&self) -> Option<OffsetDateTime> {
        parse_rfc3339(&self.timestamp)
    }

    /// UTC calendar date (`YYYY-MM-DD`), if the timestamp parses.
    #[must_use]
    pub fn date_label(&self) -> Option<String> {
        let at = self.timestamp_utc()?;
        Some(format!(
            "{:04}-{:02}-{:02}",
            at.year(),
            u8::from(at.month()),
            at.day()
        ))
    }

    /// UTC wall-clock time (`HH:MM`), if the timestamp parses.
    #[must_use]
    pub fn time_label(&self) -> Option<String> {
        let at = self.timestamp_utc()?;
        Some(format!("{:02}:{:02}", at.hour(), at.minute()))
    }

    #[must_use]
    pub fn is_from_agent(&self) -> bool {
        self.sender.role == SenderRole::Agent
    }
}

/// Parse a JSON array of messages.
pub fn parse_messages(json: &str) -> Result<Vec<Message>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Maps the panel's monotonic clock onto wall-clock timestamps.
#[derive(Debug, Clone, Copy)]
pub struct ChatClock {
    origin: Instant,
    origin_unix: u64,
}

impl ChatClock {
    /// `origin` corresponds to `origin_unix` seconds since the epoch.
    #[must_use]
    pub fn new(origin: Instant, origin_unix: u64) -> Self {
        Self {
            origin,
            origin_unix,
        }
    }

    /// Anchor at the current system time.
    #[must_use]
    pub fn system() -> Self {
        let unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::new(Instant::now(), unix)
    }

    #[must_use]
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Seconds since the epoch at `now`.
    #[must_use]
    pub fn unix_secs(&self, now: Instant) -> u64 {
        self.origin_unix
            .saturating_add(now.saturating_duration_since(self.origin).as_secs())
    }

    /// RFC 3339 timestamp for `now`. Empty past the year 9999.
    #[must_use]
    pub fn timestamp(&self, now: Instant) -> String {
        format_rfc3339(self.unix_secs(now)).unwrap_or_default()
    }
}

/// Format seconds since the epoch as an RFC 3339 UTC timestamp
/// (`2024-06-15T09:30:00Z`). `None` when the instant has no four-digit year.
#[must_use]
pub fn format_rfc3339(unix_secs: u64) -> Option<String> {
    let secs = i64::try_from(unix_secs).ok()?;
    OffsetDateTime::from_unix_timestamp(secs)
        .ok()?
        .format(&Rfc3339)
        .ok()
}

/// Parse an RFC 3339 timestamp and shift it to UTC.
#[must_use]
pub fn parse_rfc3339(timestamp: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(timestamp, &Rfc3339)
        .ok()?
        .checked_to_offset(UtcOffset::UTC)
}
