//! Builders for test records and inbox messages.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use jobtrack::classifier::ResponseType;
use jobtrack::email::RawMessage;
use jobtrack::store::ApplicationRecord;

/// Fixed "now" used by most pipeline tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 16, 8, 0, 0).unwrap()
}

/// Inbox message with a non-empty preview.
pub fn message(sender: &str, subject: &str, received_at: &str) -> RawMessage {
    RawMessage::new(
        sender,
        subject,
        format!("Regarding: {}", subject),
        received_at,
    )
}

/// Builder for `ApplicationRecord` instances.
pub struct RecordBuilder {
    company: String,
    job_title: String,
    date_applied: String,
    response_type: ResponseType,
    subject: String,
    email: String,
    thread_id: String,
}

impl RecordBuilder {
    /// New record whose subject and thread id are both `thread`.
    pub fn new(thread: &str) -> Self {
        Self {
            company: "Acme".to_string(),
            job_title: "Engineer".to_string(),
            date_applied: "2024-03-10".to_string(),
            response_type: ResponseType::Interview,
            subject: thread.to_string(),
            email: "jobs@acme.com".to_string(),
            thread_id: thread.to_lowercase(),
        }
    }

    pub fn company(mut self, company: &str) -> Self {
        self.company = company.to_string();
        self
    }

    pub fn job_title(mut self, title: &str) -> Self {
        self.job_title = title.to_string();
        self
    }

    pub fn applied(mut self, date: &str) -> Self {
        self.date_applied = date.to_string();
        self
    }

    pub fn response(mut self, response: ResponseType) -> Self {
        self.response_type = response;
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    pub fn build(self) -> ApplicationRecord {
        ApplicationRecord {
            company: self.company,
            job_title: self.job_title,
            date_applied: self.date_applied,
            response_type: self.response_type,
            subject: self.subject,
            email: self.email,
            thread_id: self.thread_id,
        }
    }
}
