//! Job boundary: busy-guarded export triggering, download hand-off and user notification.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info};

use docsplit_shared::{DocsplitError, Result};

use crate::pipeline::{ExportJob, ExportManifest, ExportOptions, ProgressReporter, run_export};
use crate::renderer::SectionRenderer;

/// Host save-file mechanism receiving the finished archive.
pub trait DownloadSink: Send + Sync {
    fn save(&self, file_name: &str, archive: &[u8]) -> Result<()>;
}

/// User-facing messages about export results.
pub trait Notifier: Send + Sync {
    fn success(&self, manifest: &ExportManifest);
    /// Called exactly once for a failed job.
    fn failure(&self, message: &str);
}

/// Result of one call to [`Exporter::trigger`].
#[derive(Debug, Clone)]
pub enum TriggerOutcome {
    /// Another export was in flight; nothing happened.
    Busy,
    /// The archive was built and handed to the download sink.
    Exported(ExportManifest),
    /// The job failed; the user was notified with this message.
    Failed(String),
}

/// Runs export jobs one at a time on behalf of a user-facing trigger.
pub struct Exporter<R> {
    renderer: R,
    options: ExportOptions,
    sink: Arc<dyn DownloadSink>,
    notifier: Arc<dyn Notifier>,
    busy: AtomicBool,
}

/// Clears the busy flag on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: SectionRenderer> Exporter<R> {
    pub fn new(
        renderer: R,
        options: ExportOptions,
        sink: Arc<dyn DownloadSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            renderer,
            options,
            sink,
            notifier,
            busy: AtomicBool::new(false),
        }
    }

    /// Whether a job is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Export `job`, unless another job is already running.
    ///
    /// A successful job hands the archive to the sink and notifies success.
    /// Any failure is logged and reported to the notifier once; no partial
    /// archive reaches the sink. No retries are attempted.
    pub async fn trigger(&self, job: ExportJob, progress: &dyn ProgressReporter) -> TriggerOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(job_id = %job.id, "export already in progress, ignoring trigger");
            return TriggerOutcome::Busy;
        }
        let _guard = BusyGuard(&self.busy);

        match self.export(&job, progress).await {
            Ok(manifest) => {
                info!(
                    job_id = %job.id,
                    file = %manifest.archive_file_name,
                    "archive handed to download"
                );
                self.notifier.success(&manifest);
                TriggerOutcome::Exported(manifest)
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "export failed");
                let message = failure_message(&e);
                self.notifier.failure(&message);
                TriggerOutcome::Failed(message)
            }
        }
    }

    async fn export(&self, job: &ExportJob, progress: &dyn ProgressReporter) -> Result<ExportManifest> {
        let outcome = run_export(job, &self.renderer, &self.options, progress).await?;
        self.sink
            .save(&outcome.manifest.archive_file_name, &outcome.archive)?;
        Ok(outcome.manifest)
    }
}

/// Short, user-facing description of a failed export.
fn failure_message(err: &DocsplitError) -> String {
    let reason = match err {
        DocsplitError::Render(_) => "a section could not be rendered",
        DocsplitError::Archive(_) => "the archive could not be built",
        DocsplitError::Io { .. } => "the archive could not be saved",
        _ => "an unexpected error occurred",
    };
    format!("Export failed: {reason} ({err}). Please try again.")
}
