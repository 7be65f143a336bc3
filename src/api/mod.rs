mod client;

pub use client::PhotoTagClient;

use std::path::Path;

use serde::Deserialize;

use crate::error::ApiError;

/// Descriptive metadata for one image, as returned by the annotation
/// service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ImageMetadata {
    /// A result is usable only with a non-empty title and at least one
    /// keyword; the description may be empty.
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.keywords.is_empty()
    }
}

/// Capability interface over the remote annotation service, so the
/// pipeline can run against a deterministic stub in tests.
pub trait MetadataSource: Send + Sync {
    /// Requests metadata for the image at `image_path`, passing
    /// `context_hint` to steer the service. One request, no retries; any
    /// transport or protocol problem surfaces as an [`ApiError`].
    fn fetch_metadata(&self, image_path: &Path, context_hint: &str)
        -> Result<ImageMetadata, ApiError>;
}
