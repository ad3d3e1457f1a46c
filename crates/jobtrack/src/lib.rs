pub mod classifier;
pub mod config;
pub mod email;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod sanitize;
pub mod secrets;
pub mod store;
pub mod tracking;

pub use classifier::{Classifier, KeywordClassifier, OpenAiClassifier, ResponseType};
pub use config::{load_config, load_or_default, Config};
pub use email::{GraphMailSource, MailSource, RawMessage, TokenProvider};
pub use error::{ConfigError, RecordError, ReportError, Result, StoreError, TrackerError};
pub use extractor::{ExtractedFields, FieldExtractor};
pub use pipeline::{Collaborators, Pipeline, PipelineConfig, PipelineError, RunSummary};
pub use report::{CsvReportSink, ReportSink};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError, SecretSource};
pub use store::{ApplicationRecord, CsvStore, Store};
pub use tracking::{StatusTag, WatermarkTracker};
