//! Follow-up report over active records awaiting a reply.

pub mod csv;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::classifier::ResponseType;
use crate::error::ReportError;
use crate::store::ApplicationRecord;
use crate::tracking::{tag, TaggedRecord};

pub use self::csv::{report_file_name, CsvReportSink};

/// Receives the pending set at the end of a run.
pub trait ReportSink: Send + Sync {
    /// Writes the report and returns where it went.
    fn export(&self, pending: &[TaggedRecord], now: DateTime<Utc>) -> Result<PathBuf, ReportError>;
}

/// Active records still awaiting an answer, sorted by response label then
/// date, each tagged.
pub fn pending(
    active: &[ApplicationRecord],
    now: DateTime<Utc>,
    stale_after_days: u32,
) -> Vec<TaggedRecord> {
    let mut rows: Vec<TaggedRecord> = active
        .iter()
        .filter(|r| matches!(r.response_type, ResponseType::Applied | ResponseType::NoReplyYet))
        .map(|record| TaggedRecord {
            record: record.clone(),
            status: tag(record, now, stale_after_days),
        })
        .collect();

    rows.sort_by(|a, b| {
        a.record
            .response_type
            .label()
            .cmp(b.record.response_type.label())
            .then_with(|| a.record.date_applied.cmp(&b.record.date_applied))
    });
    rows
}
