use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::classifier::Classifier;
use crate::email::{dedupe_latest_per_sender, MailSource, RawMessage, TokenProvider};
use crate::extractor::FieldExtractor;
use crate::report::{pending, ReportSink};
use crate::sanitize;
use crate::store::{merge_with_archive, ApplicationRecord, Store};
use crate::tracking::{annotate, partition, StatusCounts, WatermarkTracker};

use super::config::PipelineConfig;
use super::context::{RunContext, RunSummary};
use super::error::{PipelineError, PipelineWarning};
use super::progress::{ProgressEvent, ProgressReporter, RunPhase};

/// External collaborators of a run.
#[derive(Clone)]
pub struct Collaborators {
    pub tokens: Arc<dyn TokenProvider>,
    pub mail: Arc<dyn MailSource>,
    pub classifier: Arc<dyn Classifier>,
    pub store: Arc<dyn Store>,
    pub reports: Arc<dyn ReportSink>,
}

/// One fetch → classify → store → archive → report cycle.
///
/// The store and watermark file assume a single writer: callers must not run
/// two pipelines against the same files at once.
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    extractor: FieldExtractor,
    watermark: WatermarkTracker,
    deps: Collaborators,
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>, extractor: FieldExtractor, deps: Collaborators) -> Self {
        let watermark = WatermarkTracker::new(&config.watermark_path, config.lookback_days);
        Self {
            config,
            extractor,
            watermark,
            deps,
        }
    }

    pub fn watermark(&self) -> &WatermarkTracker {
        &self.watermark
    }

    /// Runs the pipeline as of `now`.
    ///
    /// Fails only on authentication errors and store read/write errors;
    /// everything else is recorded as a warning in the summary.
    pub async fn run(
        &self,
        now: DateTime<Utc>,
        progress: &dyn ProgressReporter,
    ) -> Result<RunSummary, PipelineError> {
        let ctx = RunContext::new(now);
        let span = info_span!("run", run_id = %ctx.run_id);

        match self.run_steps(ctx, progress).instrument(span).await {
            Ok(ctx) => {
                progress.report(ProgressEvent::Completed {
                    added: ctx.added,
                    archived: ctx.archived,
                });
                Ok(ctx.into_summary())
            }
            Err(e) => {
                progress.report(ProgressEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_steps(
        &self,
        mut ctx: RunContext,
        progress: &dyn ProgressReporter,
    ) -> Result<RunContext, PipelineError> {
        // Step 1: Fetch lower bound
        let since = {
            let _step = info_span!("watermark").entered();
            self.watermark.get_since(self.deps.store.as_ref(), ctx.now)
        };
        ctx.since = Some(since);

        // Step 2: Authenticate
        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Authenticating,
            message: "Acquiring mail access token...".to_string(),
        });
        let token = self
            .deps
            .tokens
            .acquire()
            .instrument(info_span!("authenticate"))
            .await
            .map_err(PipelineError::Auth)?;

        // Step 3: Fetch
        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Fetching,
            message: format!("Fetching messages since {}...", since.format("%Y-%m-%d")),
        });
        let messages = match self
            .deps
            .mail
            .fetch(&token, since)
            .instrument(info_span!("fetch"))
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Mail fetch failed, continuing with no messages: {}", e);
                ctx.warnings.push(PipelineWarning::FetchFailed {
                    error: e.to_string(),
                });
                Vec::new()
            }
        };

        // Step 4: Eligibility + dedupe + classify
        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Classifying,
            message: "Classifying messages...".to_string(),
        });
        self.step_classify(&mut ctx, messages, progress)
            .instrument(info_span!("classify"))
            .await;

        // Step 5: Merge + archive + save
        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Storing,
            message: "Merging into store...".to_string(),
        });
        let active = {
            let _step = info_span!("store").entered();
            self.step_store(&mut ctx, progress)?
        };

        // Step 6: Watermark
        if ctx.added > 0 {
            match self.watermark.save_since(ctx.now) {
                Ok(()) => ctx.watermark_advanced = true,
                Err(e) => {
                    warn!("Failed to save watermark: {}", e);
                    ctx.warnings.push(PipelineWarning::WatermarkNotSaved {
                        error: e.to_string(),
                    });
                }
            }
        } else {
            debug!("No new rows, watermark unchanged");
        }

        // Step 7: Report
        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Reporting,
            message: "Writing follow-up report...".to_string(),
        });
        {
            let _step = info_span!("report").entered();
            self.step_report(&mut ctx, &active);
        }

        info!(
            fetched = ctx.fetched,
            eligible = ctx.eligible,
            added = ctx.added,
            archived = ctx.archived,
            "Run finished: active [{}], archived [{}]",
            ctx.active_counts,
            ctx.archived_counts
        );
        Ok(ctx)
    }

    async fn step_classify(
        &self,
        ctx: &mut RunContext,
        messages: Vec<RawMessage>,
        progress: &dyn ProgressReporter,
    ) {
        ctx.fetched = messages.len();
        let eligible: Vec<_> = messages
            .into_iter()
            .filter_map(RawMessage::into_eligible)
            .collect();
        ctx.eligible = eligible.len();
        if ctx.eligible < ctx.fetched {
            info!(
                "Skipped {} messages with missing fields or bad timestamps",
                ctx.fetched - ctx.eligible
            );
        }

        let latest = dedupe_latest_per_sender(eligible);
        ctx.deduplicated = latest.len();

        let total = latest.len();
        for (i, msg) in latest.iter().enumerate() {
            let fields =
                self.extractor
                    .extract(&msg.message.sender, &msg.message.subject, &msg.message.preview);
            let response = self
                .deps
                .classifier
                .classify(&msg.message.subject, &msg.message.preview)
                .await;

            debug!(
                sender = %sanitize::redact_email(&msg.message.sender),
                sender_id = %sanitize::hash_email(&msg.message.sender),
                company = %fields.company,
                response = %response,
                "Classified message"
            );

            ctx.incoming
                .push(ApplicationRecord::from_message(msg, fields, response));
            progress.report(ProgressEvent::Classified { done: i + 1, total });
        }
    }

    /// Returns the active partition as saved.
    fn step_store(
        &self,
        ctx: &mut RunContext,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<ApplicationRecord>, PipelineError> {
        let snapshot = self.deps.store.load()?;
        ctx.warnings
            .extend(snapshot.drift.into_iter().map(PipelineWarning::from));

        let merged = merge_with_archive(snapshot.active, &snapshot.archived, ctx.incoming.clone());
        ctx.added = merged.added;

        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Archiving,
            message: "Archiving settled applications...".to_string(),
        });
        let result = partition(
            merged.records,
            snapshot.archived,
            ctx.now,
            self.config.stale_after_days,
        );
        ctx.archived = result.moved;

        if ctx.added > 0 || ctx.archived > 0 {
            self.deps.store.save(&result.active, &result.archived)?;
        } else {
            debug!("Store unchanged, skipping save");
        }

        let stale = self.config.stale_after_days;
        ctx.active_counts = StatusCounts::from_tagged(&annotate(&result.active, ctx.now, stale));
        ctx.archived_counts =
            StatusCounts::from_tagged(&annotate(&result.archived, ctx.now, stale));

        Ok(result.active)
    }

    fn step_report(&self, ctx: &mut RunContext, active: &[ApplicationRecord]) {
        let rows = pending(active, ctx.now, self.config.stale_after_days);
        match self.deps.reports.export(&rows, ctx.now) {
            Ok(path) => ctx.report_path = Some(path),
            Err(e) => {
                warn!("Failed to write report: {}", e);
                ctx.warnings.push(PipelineWarning::ReportFailed {
                    error: e.to_string(),
                });
            }
        }
    }
}
