pub mod api;
pub mod config;
pub mod error;
pub mod exif;
pub mod hint;
pub mod pipeline;
pub mod scanner;
pub mod storage;

pub use api::{ImageMetadata, MetadataSource, PhotoTagClient};
pub use config::{resolve_token, BatchConfig, ConfigError};
pub use error::{ApiError, BatchError, ExifError, ScanError, StorageError};
pub use exif::ExifWriter;
pub use hint::derive_hint;
pub use pipeline::{
    BatchPipeline, BatchSummary, LogProgress, NoopProgress, ProgressEvent, ProgressReporter,
    TagEmbedder,
};
pub use scanner::{BatchScanner, ImageRecord};
pub use storage::{Outcome, OutcomeRouter};
