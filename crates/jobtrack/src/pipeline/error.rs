use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failures that abort a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Authentication failed: {0}")]
    Auth(#[source] crate::email::EmailError),

    #[error("Store access failed: {0}")]
    Store(#[from] crate::error::StoreError),
}

/// Recovered problems, reported in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PipelineWarning {
    /// The mail fetch failed; the run continued with no messages.
    FetchFailed { error: String },
    SchemaDrift {
        path: PathBuf,
        missing_columns: Vec<String>,
        rebuilt: bool,
    },
    WatermarkNotSaved { error: String },
    /// The store was committed but the report could not be written.
    ReportFailed { error: String },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::FetchFailed { error } => write!(f, "mail fetch failed: {}", error),
            PipelineWarning::SchemaDrift {
                path,
                missing_columns,
                rebuilt,
            } => {
                write!(
                    f,
                    "{} is missing columns [{}]",
                    path.display(),
                    missing_columns.join(", ")
                )?;
                if *rebuilt {
                    write!(f, "; rows ignored and file rebuilt on next save")?;
                }
                Ok(())
            }
            PipelineWarning::WatermarkNotSaved { error } => {
                write!(f, "watermark not saved: {}", error)
            }
            PipelineWarning::ReportFailed { error } => write!(f, "report not written: {}", error),
        }
    }
}

impl From<crate::store::SchemaDrift> for PipelineWarning {
    fn from(drift: crate::store::SchemaDrift) -> Self {
        PipelineWarning::SchemaDrift {
            path: drift.path,
            missing_columns: drift.missing_columns,
            rebuilt: drift.rebuilt,
        }
    }
}
