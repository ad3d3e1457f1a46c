use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::store::ApplicationRecord;
use crate::tracking::StatusCounts;

use super::error::PipelineWarning;

/// Mutable state of one run, filled in step by step.
pub struct RunContext {
    pub run_id: Uuid,
    pub now: DateTime<Utc>,

    // Watermark step
    pub since: Option<DateTime<Utc>>,

    // Fetch + eligibility
    pub fetched: usize,
    pub eligible: usize,

    // Dedupe + classify
    pub deduplicated: usize,
    pub incoming: Vec<ApplicationRecord>,

    // Store
    pub added: usize,
    pub archived: usize,
    pub watermark_advanced: bool,

    // Tagging + report
    pub active_counts: StatusCounts,
    pub archived_counts: StatusCounts,
    pub report_path: Option<PathBuf>,

    // Non-fatal warnings
    pub warnings: Vec<PipelineWarning>,
}

impl RunContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            now,
            since: None,
            fetched: 0,
            eligible: 0,
            deduplicated: 0,
            incoming: Vec::new(),
            added: 0,
            archived: 0,
            watermark_advanced: false,
            active_counts: StatusCounts::default(),
            archived_counts: StatusCounts::default(),
            report_path: None,
            warnings: Vec::new(),
        }
    }

    pub fn into_summary(self) -> RunSummary {
        let classification_errors = self
            .incoming
            .iter()
            .filter(|r| r.response_type == crate::classifier::ResponseType::Error)
            .count();

        RunSummary {
            run_id: self.run_id,
            since: self.since.unwrap_or(self.now),
            fetched: self.fetched,
            eligible: self.eligible,
            deduplicated: self.deduplicated,
            classification_errors,
            added: self.added,
            archived: self.archived,
            watermark_advanced: self.watermark_advanced,
            report_path: self.report_path,
            active_counts: self.active_counts,
            archived_counts: self.archived_counts,
            warnings: self.warnings,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub since: DateTime<Utc>,
    pub fetched: usize,
    pub eligible: usize,
    /// Messages left after keeping the latest per sender.
    pub deduplicated: usize,
    pub classification_errors: usize,
    pub added: usize,
    pub archived: usize,
    pub watermark_advanced: bool,
    pub report_path: Option<PathBuf>,
    pub active_counts: StatusCounts,
    pub archived_counts: StatusCounts,
    pub warnings: Vec<PipelineWarning>,
}
