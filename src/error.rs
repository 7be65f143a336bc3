use std::path::PathBuf;
use thiserror::Error;

/// Failure to acquire metadata from the annotation service.
///
/// Every variant routes the affected image to the failed bucket; none of
/// them aborts the batch.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to read image '{path}': {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service returned status {code}")]
    Status { code: u16 },

    #[error("Failed to parse response body: {0}")]
    ParseBody(#[from] serde_json::Error),

    #[error("Response contained no data section")]
    MissingData,
}

/// Failure to embed metadata into an image's EXIF container.
#[derive(Error, Debug)]
pub enum ExifError {
    #[error("Failed to read image '{path}': {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JPEG '{path}': {reason}")]
    ParseJpeg { path: PathBuf, reason: String },

    #[error("Image '{path}' has no EXIF container")]
    MissingContainer { path: PathBuf },

    #[error("Failed to load EXIF container from '{path}': {reason}")]
    LoadContainer { path: PathBuf, reason: String },

    #[error("Failed to encode tag {tag_id:#06x}: {reason}")]
    EncodeTag { tag_id: u16, reason: String },

    #[error("Failed to serialize EXIF container for '{path}': {reason}")]
    SerializeContainer { path: PathBuf, reason: String },

    #[error("Failed to write image '{path}': {source}")]
    WriteImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move file from '{from}' to '{to}': {source}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Batch-fatal errors. Per-image failures never show up here; they are
/// absorbed at the image boundary and become the Failed outcome.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Batch setup failed: {0}")]
    Setup(#[source] StorageError),

    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Failed to route '{filename}' to {destination}: {source}")]
    Route {
        filename: String,
        destination: String,
        #[source]
        source: StorageError,
    },
}
