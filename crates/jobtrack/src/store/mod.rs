//! Persistent storage of application records.

pub mod csv;
pub mod merge;
pub mod record;

use std::path::PathBuf;

use crate::error::StoreError;

pub use self::csv::CsvStore;
pub use merge::{merge, merge_with_archive, MergeOutcome};
pub use record::{ApplicationRecord, COLUMNS, DATE_FORMAT};

/// A stored partition whose header did not match the expected columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDrift {
    pub path: PathBuf,
    pub missing_columns: Vec<String>,
    /// The partition lacked `thread_id` and was read as empty.
    pub rebuilt: bool,
}

/// Both partitions as loaded from storage.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub active: Vec<ApplicationRecord>,
    pub archived: Vec<ApplicationRecord>,
    pub drift: Vec<SchemaDrift>,
}

impl StoreSnapshot {
    /// All records of both partitions.
    pub fn all(&self) -> impl Iterator<Item = &ApplicationRecord> {
        self.active.iter().chain(self.archived.iter())
    }
}

/// Whole-file record storage with active and archived partitions.
///
/// Assumes a single writer; concurrent runs need external locking.
pub trait Store: Send + Sync {
    fn load(&self) -> Result<StoreSnapshot, StoreError>;

    fn save(
        &self,
        active: &[ApplicationRecord],
        archived: &[ApplicationRecord],
    ) -> Result<(), StoreError>;
}
