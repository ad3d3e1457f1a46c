//! Dated CSV report files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use log::info;

use super::ReportSink;
use crate::error::ReportError;
use crate::store::COLUMNS;
use crate::tracking::TaggedRecord;

/// `job_followup_YYYY-MM-DD.csv`
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!("job_followup_{}.csv", now.format("%Y-%m-%d"))
}

/// Writes the pending set to a dated CSV file in one directory.
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    directory: PathBuf,
}

impl CsvReportSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ReportSink for CsvReportSink {
    fn export(&self, pending: &[TaggedRecord], now: DateTime<Utc>) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.directory).map_err(|source| ReportError::CreateDirectory {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.directory.join(report_file_name(now));
        let write_err = |source| ReportError::Write {
            path: path.clone(),
            source,
        };

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(write_err)?;

        writer
            .write_record(COLUMNS.iter().copied().chain(["status"]))
            .map_err(write_err)?;
        for row in pending {
            writer
                .write_record(row.record.to_row().into_iter().chain([row.status.as_str()]))
                .map_err(write_err)?;
        }
        writer
            .flush()
            .map_err(|e| write_err(csv::Error::from(e)))?;

        info!("Report saved to {} ({} rows)", path.display(), pending.len());
        Ok(path)
    }
}
