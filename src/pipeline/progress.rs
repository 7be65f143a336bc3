use tracing::info;

use crate::storage::Outcome;

/// Events emitted by the batch pipeline, consumed by the front end
/// (CLI transcript, progress bar, tests). Control yields to the reporter
/// only at image boundaries, never mid-image.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Batch accepted; `total` is fixed for the whole run.
    Started { total: usize },
    /// One image reached a terminal outcome and was routed.
    Image {
        filename: String,
        outcome: Outcome,
        /// Failure reason, present only for failed outcomes.
        detail: Option<String>,
        /// Completion percentage after this image, 0-100 inclusive.
        percent: u8,
    },
    /// All images processed.
    Completed { ready: usize, failed: usize },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Reporter that writes the status transcript through `tracing`.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => {
                info!("Processing started: {} images", total);
            }
            ProgressEvent::Image {
                filename,
                outcome,
                detail,
                percent,
            } => match detail {
                Some(reason) => info!("[{percent:>3}%] {filename} -> {outcome} ({reason})"),
                None => info!("[{percent:>3}%] {filename} -> {outcome}"),
            },
            ProgressEvent::Completed { ready, failed } => {
                info!("Processing completed: {} ready, {} failed", ready, failed);
            }
        }
    }
}
