#![forbid(unsafe_code)]

//! Flattening a conversation into uniform-height rows.
//!
//! Messages are grouped by calendar date. Groups appear in order of their
//! first message, and a date that recurs later in the list joins its
//! existing group. Each group is led by a separator row.

use std::collections::HashMap;

use crate::message::Message;

/// Label for messages whose timestamp is not valid RFC 3339.
pub const UNKNOWN_DATE: &str = "Unknown date";

/// One list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRow {
    /// Day heading.
    DateSeparator(String),
    /// Index into the message list.
    Message(usize),
}

/// Build rows for `messages`.
#[must_use]
pub fn build_rows(messages: &[Message]) -> Vec<ChatRow> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, message) in messages.iter().enumerate() {
        let date = message
            .date_label()
            .unwrap_or_else(|| UNKNOWN_DATE.to_string());
        if let Some(indices) = groups.get_mut(&date) {
            indices.push(idx);
        } else {
            order.push(date.clone());
            groups.insert(date, vec![idx]);
        }
    }

    let mut rows = Vec::with_capacity(messages.len() + order.len());
    for date in order {
        if let Some(indices) = groups.remove(&date) {
            rows.push(ChatRow::DateSeparator(date));
            rows.extend(indices.into_iter().map(ChatRow::Message));
        }
    }
    rows
}
