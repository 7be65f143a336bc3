use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::config::BatchConfig;
use crate::error::ApiError;

use super::{ImageMetadata, MetadataSource};

/// Default connect timeout for HTTP requests (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout (60 seconds). The service runs inference per
/// image, so this is more generous than a plain REST call would get.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct KeywordResponse {
    data: Option<ImageMetadata>,
}

/// Client for the PhotoTag.ai keywording endpoint.
///
/// Sends one multipart POST per image: the raw image bytes plus the
/// configuration payload (language, keyword cap, custom context),
/// authenticated with a bearer token.
pub struct PhotoTagClient {
    client: Client,
    endpoint: String,
    language: String,
    max_keywords: u16,
    api_token: SecretString,
}

impl PhotoTagClient {
    pub fn new(config: BatchConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
            language: config.language,
            max_keywords: config.max_keywords,
            api_token: config.api_token,
        })
    }
}

impl MetadataSource for PhotoTagClient {
    fn fetch_metadata(
        &self,
        image_path: &Path,
        context_hint: &str,
    ) -> Result<ImageMetadata, ApiError> {
        let image_bytes = std::fs::read(image_path).map_err(|e| ApiError::ReadImage {
            path: image_path.to_path_buf(),
            source: e,
        })?;

        let filename = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.jpg")
            .to_string();

        let part = Part::bytes(image_bytes)
            .file_name(filename)
            .mime_str("image/jpeg")?;
        let form = Form::new()
            .text("language", self.language.clone())
            .text("maxKeywords", self.max_keywords.to_string())
            .text("customContext", context_hint.to_string())
            .part("file", part);

        debug!(
            path = %image_path.display(),
            hint = context_hint,
            "requesting metadata"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_token.expose_secret())
            .multipart(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
            });
        }

        parse_body(&response.text()?)
    }
}

/// Parses a success-status response body. A missing `data` section is an
/// acquisition failure even on a 2xx status.
fn parse_body(body: &str) -> Result<ImageMetadata, ApiError> {
    let response: KeywordResponse = serde_json::from_str(body)?;
    response.data.ok_or(ApiError::MissingData)
}
