//! Incremental fetch watermark.
//!
//! The lower bound for the next fetch comes from, in order: the watermark
//! file, the newest `date_applied` in storage, and finally a fixed lookback
//! from now. Every step degrades silently to the next.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::email::message::parse_received;
use crate::store::{ApplicationRecord, Store, DATE_FORMAT};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 200;

#[derive(Debug, Serialize, Deserialize)]
struct WatermarkFile {
    last_run: String,
}

/// Midnight UTC of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Newest parsable `date_applied` among `records`, at midnight UTC.
pub fn latest_applied<'a, I>(records: I) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    records
        .into_iter()
        .filter_map(ApplicationRecord::applied_on)
        .max()
        .map(start_of_day)
}

#[derive(Debug, Clone)]
pub struct WatermarkTracker {
    path: PathBuf,
    lookback_days: u32,
}

impl WatermarkTracker {
    pub fn new(path: impl Into<PathBuf>, lookback_days: u32) -> Self {
        Self {
            path: path.into(),
            lookback_days,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Timestamp stored in the watermark file, if present and readable.
    pub fn read(&self) -> Option<DateTime<Utc>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read watermark {}: {}", self.path.display(), e);
                return None;
            }
        };

        let file: WatermarkFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!("Ignoring corrupt watermark {}: {}", self.path.display(), e);
                return None;
            }
        };

        let value = file.last_run.trim();
        let parsed = NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .map(start_of_day)
            .or_else(|| parse_received(value));

        if parsed.is_none() {
            warn!(
                "Ignoring watermark {} with unparsable last_run '{}'",
                self.path.display(),
                value
            );
        }
        parsed
    }

    /// `now - lookback_days`, truncated to midnight UTC.
    pub fn default_since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        start_of_day((now - Duration::days(i64::from(self.lookback_days))).date_naive())
    }

    /// Lower bound for the next fetch. Never fails.
    pub fn get_since(&self, store: &dyn Store, now: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(since) = self.read() {
            debug!("Watermark from file: {}", since);
            return since;
        }

        match store.load() {
            Ok(snapshot) => {
                if let Some(since) = latest_applied(snapshot.all()) {
                    info!("Watermark derived from stored records: {}", since);
                    return since;
                }
            }
            Err(e) => warn!("Could not read store for watermark fallback: {}", e),
        }

        let since = self.default_since(now);
        info!(
            "No watermark or stored dates, looking back {} days to {}",
            self.lookback_days, since
        );
        since
    }

    /// Records `now` (as a date) as the new watermark.
    pub fn save_since(&self, now: DateTime<Utc>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = WatermarkFile {
            last_run: now.date_naive().format(DATE_FORMAT).to_string(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;

        info!("Watermark advanced to {}", file.last_run);
        Ok(())
    }
}
