//! Store operations that run without touching the mailbox.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, info_span};

use crate::error::{Result, StoreError};
use crate::report::{pending, ReportSink};
use crate::store::{SchemaDrift, Store};
use crate::tracking::{annotate, partition, StatusCounts};

/// Tag totals for both partitions.
#[derive(Debug, Clone, Default)]
pub struct StoreStatus {
    pub active: StatusCounts,
    pub archived: StatusCounts,
    pub drift: Vec<SchemaDrift>,
}

pub fn store_status(
    store: &dyn Store,
    now: DateTime<Utc>,
    stale_after_days: u32,
) -> std::result::Result<StoreStatus, StoreError> {
    let snapshot = store.load()?;
    Ok(StoreStatus {
        active: StatusCounts::from_tagged(&annotate(&snapshot.active, now, stale_after_days)),
        archived: StatusCounts::from_tagged(&annotate(&snapshot.archived, now, stale_after_days)),
        drift: snapshot.drift,
    })
}

/// Relocates settled records and saves the store if anything moved.
/// Returns the number of records moved.
pub fn archive_store(
    store: &dyn Store,
    now: DateTime<Utc>,
    stale_after_days: u32,
) -> std::result::Result<usize, StoreError> {
    let _span = info_span!("archive").entered();

    let snapshot = store.load()?;
    let result = partition(snapshot.active, snapshot.archived, now, stale_after_days);
    if result.moved > 0 {
        store.save(&result.active, &result.archived)?;
    }

    info!(moved = result.moved, "Archive pass finished");
    Ok(result.moved)
}

/// Archives, then writes the follow-up report for the remaining active records.
pub fn export_report(
    store: &dyn Store,
    sink: &dyn ReportSink,
    now: DateTime<Utc>,
    stale_after_days: u32,
) -> Result<PathBuf> {
    archive_store(store, now, stale_after_days)?;

    let _span = info_span!("report").entered();
    let snapshot = store.load()?;
    let rows = pending(&snapshot.active, now, stale_after_days);
    Ok(sink.export(&rows, now)?)
}
