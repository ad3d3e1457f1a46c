use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Email source error: {0}")]
    Email(#[from] crate::email::EmailError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] crate::classifier::ClassifierError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid title pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("No config file found and no default config directory available")]
    NoConfigDirectory,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read store file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write store file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode row for '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create report directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Rejected input when constructing an [`crate::store::ApplicationRecord`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    #[error("thread_id must not be empty")]
    EmptyThreadId,

    #[error("Invalid date_applied '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
