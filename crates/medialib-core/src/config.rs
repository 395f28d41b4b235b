//! Configuration module
//!
//! Client settings are read from `MEDIALIB_*` environment variables (optionally seeded from a
//! `.env` file) and validated before use.

use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 500;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Client configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the media API, without trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Number of items requested per list/search call.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Bearer token to start the session with, if already known.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            http_timeout_secs: default_http_timeout_secs(),
            token: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ClientConfig {
    /// Load from the process environment. A `.env` file in the working directory is applied
    /// first if present.
    pub fn from_env() -> ClientResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of variables (used by tests and embedders).
    pub fn from_vars<I>(vars: I) -> ClientResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: ClientConfig = envy::prefixed("MEDIALIB_")
            .from_iter(vars)
            .map_err(|e| ClientError::Validation(format!("Invalid configuration: {}", e)))?;
        config.validate()
    }

    fn validate(mut self) -> ClientResult<Self> {
        self.api_url = self.api_url.trim().trim_end_matches('/').to_string();
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ClientError::Validation(format!(
                "MEDIALIB_API_URL must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ClientError::Validation(format!(
                "MEDIALIB_PAGE_SIZE must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(ClientError::Validation(
                "MEDIALIB_HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        self.token = self.token.filter(|t| !t.trim().is_empty());
        Ok(self)
    }
}
