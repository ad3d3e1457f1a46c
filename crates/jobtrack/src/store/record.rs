//! The persisted application record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::classifier::ResponseType;
use crate::email::message::{thread_id_for, EligibleMessage};
use crate::error::RecordError;
use crate::extractor::ExtractedFields;

/// Storage columns, in file order.
pub const COLUMNS: [&str; 7] = [
    "company",
    "job_title",
    "date_applied",
    "response_type",
    "subject",
    "email",
    "thread_id",
];

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One tracked application thread. `thread_id` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub company: String,
    pub job_title: String,
    /// `YYYY-MM-DD`. Rows loaded from disk may hold hand-edited values.
    pub date_applied: String,
    pub response_type: ResponseType,
    pub subject: String,
    /// Lowercased sender address.
    pub email: String,
    pub thread_id: String,
}

impl ApplicationRecord {
    /// Validated constructor: rejects an empty thread id or a bad date.
    pub fn new(
        company: impl Into<String>,
        job_title: impl Into<String>,
        date_applied: &str,
        response_type: ResponseType,
        subject: impl Into<String>,
        email: &str,
        thread_id: &str,
    ) -> Result<Self, RecordError> {
        let thread_id = thread_id_for(thread_id);
        if thread_id.is_empty() {
            return Err(RecordError::EmptyThreadId);
        }

        let date = NaiveDate::parse_from_str(date_applied.trim(), DATE_FORMAT)
            .map_err(|_| RecordError::InvalidDate(date_applied.to_string()))?;

        Ok(Self {
            company: company.into(),
            job_title: job_title.into(),
            date_applied: date.format(DATE_FORMAT).to_string(),
            response_type,
            subject: subject.into(),
            email: email.trim().to_lowercase(),
            thread_id,
        })
    }

    /// Builds the record for a deduplicated message.
    pub fn from_message(
        msg: &EligibleMessage,
        fields: ExtractedFields,
        response_type: ResponseType,
    ) -> Self {
        Self {
            company: fields.company,
            job_title: fields.job_title,
            date_applied: msg.received_at.format(DATE_FORMAT).to_string(),
            response_type,
            subject: msg.message.subject.trim().to_string(),
            email: msg.sender_key(),
            thread_id: msg.thread_id(),
        }
    }

    /// Parsed `date_applied`; tolerates a trailing time component.
    pub fn applied_on(&self) -> Option<NaiveDate> {
        let value = self.date_applied.trim();
        let date_part = value.get(..10).unwrap_or(value);
        NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
    }

    /// Case-insensitive identity key.
    pub fn thread_key(&self) -> String {
        thread_id_for(&self.thread_id)
    }

    /// Field values in [`COLUMNS`] order.
    pub fn to_row(&self) -> [&str; 7] {
        [
            self.company.as_str(),
            self.job_title.as_str(),
            self.date_applied.as_str(),
            self.response_type.label(),
            self.subject.as_str(),
            self.email.as_str(),
            self.thread_id.as_str(),
        ]
    }
}
