//! The run orchestration: watermark, fetch, classify, merge, archive, report.

pub mod config;
pub mod context;
pub mod error;
pub mod maintenance;
pub mod progress;
pub mod runner;

pub use config::PipelineConfig;
pub use context::{RunContext, RunSummary};
pub use error::{PipelineError, PipelineWarning};
pub use maintenance::{archive_store, export_report, store_status, StoreStatus};
pub use progress::{LogProgress, NoopProgress, ProgressEvent, ProgressReporter, RunPhase};
pub use runner::{Collaborators, Pipeline};
