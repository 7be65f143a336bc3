pub mod progress;
pub mod runner;

pub use progress::{LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::{BatchPipeline, TagEmbedder};

/// Aggregate counts for one completed batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub ready: usize,
    pub failed: usize,
}
