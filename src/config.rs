use std::fmt;
use std::time::Duration;

use crate::connector::fetch::{DEFAULT_MAX_TOOLS, DEFAULT_PAGE_SIZE};
use crate::error::SyncError;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Credentials and endpoints, read from the environment.
#[derive(Clone)]
pub struct Settings {
    pub connector_api_key: String,
    pub connector_base_url: String,
    pub voice_api_key: String,
    pub voice_base_url: String,
    pub directory_url: String,
    pub directory_service_key: String,
    pub site_url: String,
    pub page_size: usize,
    pub max_tools: usize,
    pub http_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SyncError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| SyncError::Configuration(format!("{key} is not set")))
        };
        let number = |key: &str, default: u64| -> Result<u64, SyncError> {
            match get(key) {
                Some(v) => v.parse().map_err(|_| {
                    SyncError::Configuration(format!("{key} must be a positive integer, got {v:?}"))
                }),
                None => Ok(default),
            }
        };
        let url = |key: &str| required(key).map(|v| v.trim_end_matches('/').to_string());

        Ok(Self {
            connector_api_key: required("CONNECTOR_API_KEY")?,
            connector_base_url: url("CONNECTOR_BASE_URL")?,
            voice_api_key: required("VOICE_API_KEY")?,
            voice_base_url: url("VOICE_BASE_URL")?,
            directory_url: url("DIRECTORY_URL")?,
            directory_service_key: required("DIRECTORY_SERVICE_KEY")?,
            site_url: url("SITE_URL")?,
            page_size: number("TOOLSYNC_PAGE_SIZE", DEFAULT_PAGE_SIZE as u64)?.max(1) as usize,
            max_tools: number("TOOLSYNC_MAX_TOOLS", DEFAULT_MAX_TOOLS as u64)? as usize,
            http_timeout: Duration::from_secs(number(
                "TOOLSYNC_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }

    /// Shared HTTP client for every collaborator, with the transport timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, SyncError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| SyncError::Configuration(format!("failed to build HTTP client: {e}")))
    }
}

// Keys stay out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("connector_api_key", &"[REDACTED]")
            .field("connector_base_url", &self.connector_base_url)
            .field("voice_api_key", &"[REDACTED]")
            .field("voice_base_url", &self.voice_base_url)
            .field("directory_url", &self.directory_url)
            .field("directory_service_key", &"[REDACTED]")
            .field("site_url", &self.site_url)
            .field("page_size", &self.page_size)
            .field("max_tools", &self.max_tools)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}
