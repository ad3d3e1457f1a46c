//! Raw inbox messages and the eligibility gate in front of the pipeline.

use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// A message as delivered by a [`super::MailSource`]. Immutable input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Sender address (e.g. `jobs@greenhouse.io`).
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Body preview text.
    pub preview: String,
    /// Received timestamp, ISO-8601 UTC.
    pub received_at: String,
}

impl RawMessage {
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        preview: impl Into<String>,
        received_at: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            preview: preview.into(),
            received_at: received_at.into(),
        }
    }

    /// Validates the message and parses its timestamp.
    ///
    /// Returns `None` when any of the four fields is blank or the timestamp
    /// does not parse; such messages are skipped by the pipeline.
    pub fn into_eligible(self) -> Option<EligibleMessage> {
        if self.sender.trim().is_empty()
            || self.subject.trim().is_empty()
            || self.preview.trim().is_empty()
        {
            debug!("Skipping message with missing sender, subject or preview");
            return None;
        }

        let Some(received_at) = parse_received(&self.received_at) else {
            debug!("Skipping message with malformed timestamp '{}'", self.received_at);
            return None;
        };

        Some(EligibleMessage {
            message: self,
            received_at,
        })
    }
}

/// A message that passed eligibility, carrying its parsed timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleMessage {
    pub message: RawMessage,
    pub received_at: DateTime<Utc>,
}

impl EligibleMessage {
    /// Lowercased, trimmed sender address.
    pub fn sender_key(&self) -> String {
        self.message.sender.trim().to_lowercase()
    }

    /// Thread identity: the lowercased, trimmed subject.
    pub fn thread_id(&self) -> String {
        thread_id_for(&self.message.subject)
    }
}

/// Derives the thread identity key from a subject line.
pub fn thread_id_for(subject: &str) -> String {
    subject.trim().to_lowercase()
}

/// Parses a received timestamp: RFC 3339 first, then the bare `Z` form.
pub fn parse_received(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ")
        .ok()
        .map(|naive| naive.and_utc())
}
