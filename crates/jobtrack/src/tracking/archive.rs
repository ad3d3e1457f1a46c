//! One-way relocation of settled records to the archived partition.

use chrono::{DateTime, Utc};
use log::debug;

use super::status::is_stale;
use crate::classifier::ResponseType;
use crate::store::ApplicationRecord;

/// Whether an active record should move to the archive.
pub fn should_archive(record: &ApplicationRecord, now: DateTime<Utc>, stale_after_days: u32) -> bool {
    match record.response_type {
        ResponseType::Rejected | ResponseType::Applied => true,
        ResponseType::NoReplyYet => is_stale(record, now, stale_after_days),
        _ => false,
    }
}

/// Result of [`partition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partitioned {
    pub active: Vec<ApplicationRecord>,
    pub archived: Vec<ApplicationRecord>,
    pub moved: usize,
}

/// Moves qualifying active records to the end of `archived`.
///
/// Archived records are never re-evaluated, so repeated calls are no-ops.
pub fn partition(
    active: Vec<ApplicationRecord>,
    mut archived: Vec<ApplicationRecord>,
    now: DateTime<Utc>,
    stale_after_days: u32,
) -> Partitioned {
    let (to_archive, keep): (Vec<_>, Vec<_>) = active
        .into_iter()
        .partition(|r| should_archive(r, now, stale_after_days));

    let moved = to_archive.len();
    archived.extend(to_archive);
    debug!("Archived {} records, {} remain active", moved, keep.len());

    Partitioned {
        active: keep,
        archived,
        moved,
    }
}
