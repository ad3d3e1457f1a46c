//! Test harness for isolated pipeline runs.
//!
//! `TestHarness` owns a temp directory holding the active and archived
//! partitions, the watermark file and the report directory, and wires a
//! `Pipeline` against fake mail and token collaborators.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tempfile::TempDir;

use jobtrack::classifier::{Classifier, ResponseType};
use jobtrack::email::{EmailError, MailSource, RawMessage, TokenProvider};
use jobtrack::error::ReportError;
use jobtrack::extractor::FieldExtractor;
use jobtrack::pipeline::{Collaborators, NoopProgress, Pipeline, PipelineConfig, PipelineError, RunSummary};
use jobtrack::report::{CsvReportSink, ReportSink};
use jobtrack::store::{CsvStore, Store, StoreSnapshot};
use jobtrack::tracking::TaggedRecord;

/// Token provider returning a fixed token, or failing.
pub struct StaticTokenProvider {
    fail: bool,
}

impl StaticTokenProvider {
    pub fn ok() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn acquire(&self) -> Result<SecretString, EmailError> {
        if self.fail {
            return Err(EmailError::AuthenticationFailed(
                "device code expired".to_string(),
            ));
        }
        Ok(SecretString::from("test-token"))
    }
}

/// Mail source serving a fixed batch and recording each `since` it was asked for.
pub struct FakeMailSource {
    messages: Vec<RawMessage>,
    fail: bool,
    requests: Mutex<Vec<DateTime<Utc>>>,
}

impl FakeMailSource {
    pub fn with_messages(messages: Vec<RawMessage>) -> Self {
        Self {
            messages,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_messages(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            messages: Vec::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<DateTime<Utc>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSource for FakeMailSource {
    async fn fetch(
        &self,
        _token: &SecretString,
        since: DateTime<Utc>,
    ) -> Result<Vec<RawMessage>, EmailError> {
        self.requests.lock().unwrap().push(since);
        if self.fail {
            return Err(EmailError::FetchFailed("Graph returned 503".to_string()));
        }
        Ok(self
            .messages
            .iter()
            .filter(|m| {
                jobtrack::email::message::parse_received(&m.received_at)
                    .map(|at| at >= since)
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }
}

/// Classifier answering from subject keywords; anything else gets `fallback`.
pub struct ScriptedClassifier {
    rules: Vec<(&'static str, ResponseType)>,
    fallback: ResponseType,
    calls: Mutex<usize>,
}

impl ScriptedClassifier {
    pub fn new(rules: Vec<(&'static str, ResponseType)>, fallback: ResponseType) -> Self {
        Self {
            rules,
            fallback,
            calls: Mutex::new(0),
        }
    }

    /// Answers every message with `response`.
    pub fn always(response: ResponseType) -> Self {
        Self::new(Vec::new(), response)
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, subject: &str, _preview: &str) -> ResponseType {
        *self.calls.lock().unwrap() += 1;
        let subject = subject.to_lowercase();
        self.rules
            .iter()
            .find(|(needle, _)| subject.contains(needle))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Report sink that always fails.
pub struct FailingReportSink;

impl ReportSink for FailingReportSink {
    fn export(&self, _pending: &[TaggedRecord], _now: DateTime<Utc>) -> Result<PathBuf, ReportError> {
        Err(ReportError::CreateDirectory {
            path: PathBuf::from("/unwritable"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

/// Test harness providing an isolated store, watermark and report directory.
pub struct TestHarness {
    temp_dir: TempDir,
    pub active_path: PathBuf,
    pub archive_path: PathBuf,
    pub watermark_path: PathBuf,
    pub report_dir: PathBuf,
    pub lookback_days: u32,
    pub stale_after_days: u32,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        Self {
            active_path: base.join("job_applications.csv"),
            archive_path: base.join("job_applications_archived.csv"),
            watermark_path: base.join("last_run.json"),
            report_dir: base.join("reports"),
            lookback_days: 200,
            stale_after_days: 10,
            temp_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn store(&self) -> CsvStore {
        CsvStore::new(&self.active_path, &self.archive_path)
    }

    pub fn load(&self) -> StoreSnapshot {
        self.store().load().expect("Failed to load store")
    }

    pub fn seed(&self, active: &[jobtrack::store::ApplicationRecord], archived: &[jobtrack::store::ApplicationRecord]) {
        self.store().save(active, archived).expect("Failed to seed store");
    }

    pub fn write_active_csv(&self, content: &str) {
        std::fs::write(&self.active_path, content).expect("Failed to write active CSV");
    }

    pub fn write_watermark(&self, last_run: &str) {
        std::fs::write(
            &self.watermark_path,
            format!(r#"{{"last_run": "{}"}}"#, last_run),
        )
        .expect("Failed to write watermark");
    }

    pub fn watermark_contents(&self) -> Option<String> {
        std::fs::read_to_string(&self.watermark_path).ok()
    }

    pub fn pipeline_config(&self) -> Arc<PipelineConfig> {
        Arc::new(PipelineConfig {
            watermark_path: self.watermark_path.clone(),
            lookback_days: self.lookback_days,
            stale_after_days: self.stale_after_days,
        })
    }

    pub fn collaborators(
        &self,
        mail: Arc<FakeMailSource>,
        classifier: Arc<dyn Classifier>,
    ) -> Collaborators {
        Collaborators {
            tokens: Arc::new(StaticTokenProvider::ok()),
            mail,
            classifier,
            store: Arc::new(self.store()),
            reports: Arc::new(CsvReportSink::new(&self.report_dir)),
        }
    }

    pub fn pipeline(&self, deps: Collaborators) -> Pipeline {
        Pipeline::new(self.pipeline_config(), FieldExtractor::new(), deps)
    }

    /// Runs one pipeline cycle against `mail` and `classifier` at `now`.
    pub async fn run(
        &self,
        mail: Arc<FakeMailSource>,
        classifier: Arc<dyn Classifier>,
        now: DateTime<Utc>,
    ) -> Result<RunSummary, PipelineError> {
        let pipeline = self.pipeline(self.collaborators(mail, classifier));
        pipeline.run(now, &NoopProgress).await
    }
}
