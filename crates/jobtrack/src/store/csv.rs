//! CSV-backed store with an active and an archived partition.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, info, warn};

use super::record::{ApplicationRecord, COLUMNS};
use super::{SchemaDrift, Store, StoreSnapshot};
use crate::classifier::ResponseType;
use crate::error::StoreError;

/// Store over two CSV files with identical schema.
///
/// Reads and writes are whole-file. Writes go to a temporary sibling file
/// which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct CsvStore {
    active_path: PathBuf,
    archive_path: PathBuf,
}

/// Rows read from one partition, plus any schema drift found.
struct Partition {
    records: Vec<ApplicationRecord>,
    drift: Option<SchemaDrift>,
}

impl CsvStore {
    pub fn new(active_path: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            active_path: active_path.into(),
            archive_path: archive_path.into(),
        }
    }

    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    fn read_partition(path: &Path) -> Result<Partition, StoreError> {
        if !path.exists() {
            debug!("Store file {} does not exist yet", path.display());
            return Ok(Partition {
                records: Vec::new(),
                drift: None,
            });
        }

        let read_err = |source| StoreError::ReadFile {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(read_err)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Ok(Partition {
                records: Vec::new(),
                drift: None,
            });
        }

        let index_of = |column: &str| headers.iter().position(|h| h == column);
        let indices: Vec<Option<usize>> = COLUMNS.iter().map(|c| index_of(c)).collect();
        let missing: Vec<String> = COLUMNS
            .iter()
            .zip(&indices)
            .filter(|(_, idx)| idx.is_none())
            .map(|(c, _)| c.to_string())
            .collect();

        if index_of("thread_id").is_none() {
            warn!(
                "Store file {} has no thread_id column; treating it as empty and rebuilding it on next save",
                path.display()
            );
            return Ok(Partition {
                records: Vec::new(),
                drift: Some(SchemaDrift {
                    path: path.to_path_buf(),
                    missing_columns: missing,
                    rebuilt: true,
                }),
            });
        }

        let drift = if missing.is_empty() {
            None
        } else {
            warn!(
                "Store file {} is missing columns {:?}; filling them with empty values",
                path.display(),
                missing
            );
            Some(SchemaDrift {
                path: path.to_path_buf(),
                missing_columns: missing,
                rebuilt: false,
            })
        };

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(read_err)?;
            records.push(record_from_row(&row, &indices));
        }

        let unrecognized = records
            .iter()
            .filter(|r| !r.response_type.is_recognized())
            .count();
        if unrecognized > 0 {
            warn!(
                "Store file {} has {} rows with an unrecognised response_type; keeping their labels unchanged",
                path.display(),
                unrecognized
            );
        }

        debug!("Loaded {} rows from {}", records.len(), path.display());
        Ok(Partition { records, drift })
    }

    /// Writes `records` to the temporary sibling of `path` and returns it.
    fn write_temp(path: &Path, records: &[ApplicationRecord]) -> Result<PathBuf, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let tmp_path = Self::temp_path(path);
        let encode_err = |source| StoreError::Encode {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp_path)
            .map_err(encode_err)?;
        writer.write_record(COLUMNS).map_err(encode_err)?;
        for record in records {
            writer.write_record(record.to_row()).map_err(encode_err)?;
        }
        writer.flush().map_err(|source| StoreError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(tmp_path)
    }

    fn temp_path(path: &Path) -> PathBuf {
        path.with_extension("csv.tmp")
    }

    fn commit(tmp_path: &Path, path: &Path) -> Result<(), StoreError> {
        fs::rename(tmp_path, path).map_err(|source| StoreError::WriteFile {
            path: path.to_path_buf(),
            source,
        })
    }

    fn discard(tmp_paths: &[&Path]) {
        for tmp_path in tmp_paths {
            if let Err(e) = fs::remove_file(tmp_path) {
                debug!("Could not remove {}: {}", tmp_path.display(), e);
            }
        }
    }
}

fn record_from_row(row: &StringRecord, indices: &[Option<usize>]) -> ApplicationRecord {
    let field = |i: usize| -> String {
        indices[i]
            .and_then(|idx| row.get(idx))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    ApplicationRecord {
        company: field(0),
        job_title: field(1),
        date_applied: field(2),
        response_type: ResponseType::from_stored(&field(3)),
        subject: field(4),
        email: field(5),
        thread_id: field(6),
    }
}

impl Store for CsvStore {
    fn load(&self) -> Result<StoreSnapshot, StoreError> {
        let active = Self::read_partition(&self.active_path)?;
        let archived = Self::read_partition(&self.archive_path)?;

        let drift = [active.drift, archived.drift].into_iter().flatten().collect();

        Ok(StoreSnapshot {
            active: active.records,
            archived: archived.records,
            drift,
        })
    }

    /// Both partitions are written out before either file is replaced, and
    /// the archive is replaced first. A failure part way leaves every
    /// thread id in at least one partition.
    fn save(&self, active: &[ApplicationRecord], archived: &[ApplicationRecord]) -> Result<(), StoreError> {
        let active_tmp = Self::write_temp(&self.active_path, active)?;
        let archive_tmp = match Self::write_temp(&self.archive_path, archived) {
            Ok(tmp) => tmp,
            Err(e) => {
                let archive_tmp = Self::temp_path(&self.archive_path);
                Self::discard(&[active_tmp.as_path(), archive_tmp.as_path()]);
                return Err(e);
            }
        };

        if let Err(e) = Self::commit(&archive_tmp, &self.archive_path) {
            Self::discard(&[active_tmp.as_path(), archive_tmp.as_path()]);
            return Err(e);
        }
        if let Err(e) = Self::commit(&active_tmp, &self.active_path) {
            Self::discard(&[active_tmp.as_path()]);
            return Err(e);
        }

        info!(
            "Saved store: {} active, {} archived",
            active.len(),
            archived.len()
        );
        Ok(())
    }
}
