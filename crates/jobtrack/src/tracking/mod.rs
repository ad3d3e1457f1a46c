//! Watermark, status tagging and archiving.

pub mod archive;
pub mod status;
pub mod watermark;

pub use archive::{partition, should_archive, Partitioned};
pub use status::{annotate, tag, StatusCounts, StatusTag, TaggedRecord, DEFAULT_STALE_AFTER_DAYS};
pub use watermark::{WatermarkTracker, DEFAULT_LOOKBACK_DAYS};
