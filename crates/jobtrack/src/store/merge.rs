//! Idempotent merge of new records into stored ones.

use std::collections::HashSet;

use log::debug;

use super::record::ApplicationRecord;

/// Result of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub records: Vec<ApplicationRecord>,
    pub added: usize,
}

/// Appends incoming records whose thread id is not already present.
///
/// Existing records keep their order and content. Incoming records are
/// appended in order; repeated ids within the batch are kept once.
pub fn merge<I>(existing: Vec<ApplicationRecord>, incoming: I) -> MergeOutcome
where
    I: IntoIterator<Item = ApplicationRecord>,
{
    merge_with_archive(existing, &[], incoming)
}

/// Like [`merge`], but ids found in `archived` also count as existing.
pub fn merge_with_archive<I>(
    existing: Vec<ApplicationRecord>,
    archived: &[ApplicationRecord],
    incoming: I,
) -> MergeOutcome
where
    I: IntoIterator<Item = ApplicationRecord>,
{
    let mut seen: HashSet<String> = existing
        .iter()
        .chain(archived.iter())
        .map(ApplicationRecord::thread_key)
        .collect();

    let mut records = existing;
    let before = records.len();

    for record in incoming {
        let key = record.thread_key();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        records.push(record);
    }

    let added = records.len() - before;
    debug!("Merged {} new records into {}", added, before);
    MergeOutcome { records, added }
}
