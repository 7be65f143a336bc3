//! Batch configuration and credential resolution.

use secrecy::SecretString;
use thiserror::Error;

/// Endpoint of the PhotoTag.ai keywording API.
pub const DEFAULT_ENDPOINT: &str = "https://server.phototag.ai/api/keywords";

/// Language requested for generated metadata.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Upper bound on the number of keywords requested per image.
pub const DEFAULT_MAX_KEYWORDS: u16 = 40;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No API token provided (pass one explicitly or set {env_var})")]
    NoTokenSource { env_var: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// Settings for one batch run. The defaults mirror the service's expected
/// payload; tests point `endpoint` at a stub instead.
pub struct BatchConfig {
    pub endpoint: String,
    pub language: String,
    pub max_keywords: u16,
    pub api_token: SecretString,
}

impl BatchConfig {
    pub fn new(api_token: SecretString) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            max_keywords: DEFAULT_MAX_KEYWORDS,
            api_token,
        }
    }
}

/// Resolves the bearer token from the available sources in priority order:
///
/// 1. Direct value (if provided and non-empty)
/// 2. Environment variable `env_var`
pub fn resolve_token(direct: Option<&str>, env_var: &str) -> Result<SecretString, ConfigError> {
    if let Some(value) = direct {
        if !value.is_empty() {
            return Ok(SecretString::from(value.to_string()));
        }
    }

    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
        Ok(_) | Err(std::env::VarError::NotPresent) => Err(ConfigError::NoTokenSource {
            env_var: env_var.to_string(),
        }),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::EnvVarNotUnicode {
            name: env_var.to_string(),
        }),
    }
}
