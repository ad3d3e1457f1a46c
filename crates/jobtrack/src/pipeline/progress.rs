use tracing::info;

/// Phases of one run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Authenticating,
    Fetching,
    Classifying,
    Storing,
    Archiving,
    Reporting,
}

/// Events emitted by the pipeline during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Phase {
        phase: RunPhase,
        message: String,
    },
    Classified {
        done: usize,
        total: usize,
    },
    Completed {
        added: usize,
        archived: usize,
    },
    Failed {
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Writes phase changes to the log; per-message events go to debug.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => info!(?phase, "{}", message),
            ProgressEvent::Classified { done, total } => {
                tracing::debug!("Classified {}/{}", done, total)
            }
            ProgressEvent::Completed { added, archived } => {
                info!(added, archived, "Run completed")
            }
            ProgressEvent::Failed { error } => tracing::error!("Run failed: {}", error),
        }
    }
}
