//! Derived follow-up status of stored records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classifier::ResponseType;
use crate::store::ApplicationRecord;

pub const DEFAULT_STALE_AFTER_DAYS: u32 = 10;

/// Follow-up status derived from response type and age. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTag {
    Positive,
    Negative,
    Waiting,
    Stale,
    Unknown,
}

impl StatusTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTag::Positive => "positive",
            StatusTag::Negative => "negative",
            StatusTag::Waiting => "waiting",
            StatusTag::Stale => "stale",
            StatusTag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when a record's date is parsable and older than the threshold.
pub fn is_stale(record: &ApplicationRecord, now: DateTime<Utc>, stale_after_days: u32) -> bool {
    record
        .applied_on()
        .map(|date| (now.date_naive() - date).num_days() > i64::from(stale_after_days))
        .unwrap_or(false)
}

pub fn tag(record: &ApplicationRecord, now: DateTime<Utc>, stale_after_days: u32) -> StatusTag {
    match record.response_type {
        ResponseType::Interview | ResponseType::Offer => StatusTag::Positive,
        ResponseType::Rejected => StatusTag::Negative,
        ResponseType::NoReplyYet => {
            if is_stale(record, now, stale_after_days) {
                StatusTag::Stale
            } else {
                StatusTag::Waiting
            }
        }
        _ => StatusTag::Unknown,
    }
}

/// A record with its derived tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRecord {
    pub record: ApplicationRecord,
    pub status: StatusTag,
}

pub fn annotate(
    records: &[ApplicationRecord],
    now: DateTime<Utc>,
    stale_after_days: u32,
) -> Vec<TaggedRecord> {
    records
        .iter()
        .map(|record| TaggedRecord {
            record: record.clone(),
            status: tag(record, now, stale_after_days),
        })
        .collect()
}

/// Tag totals over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub positive: usize,
    pub negative: usize,
    pub waiting: usize,
    pub stale: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: StatusTag) {
        match status {
            StatusTag::Positive => self.positive += 1,
            StatusTag::Negative => self.negative += 1,
            StatusTag::Waiting => self.waiting += 1,
            StatusTag::Stale => self.stale += 1,
            StatusTag::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.waiting + self.stale + self.unknown
    }

    pub fn from_tagged<'a, I>(tagged: I) -> Self
    where
        I: IntoIterator<Item = &'a TaggedRecord>,
    {
        let mut counts = Self::default();
        for t in tagged {
            counts.add(t.status);
        }
        counts
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "positive={} negative={} waiting={} stale={} unknown={}",
            self.positive, self.negative, self.waiting, self.stale, self.unknown
        )
    }
}
