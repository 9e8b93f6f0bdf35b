use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Public SonarCloud instance.
pub const DEFAULT_SONARCLOUD_URL: &str = "https://sonarcloud.io";

/// Largest page size accepted by the SonarCloud search endpoints.
pub const MAX_PAGE_SIZE: u32 = 500;

/// SonarCloud Web API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SonarCloudConfig {
    /// Base URL of the SonarCloud instance.
    #[serde(default = "default_url")]
    pub url: String,

    /// User token used as a bearer credential.
    #[serde(default)]
    pub token: String,

    /// Organization whose projects are exported.
    #[serde(default)]
    pub organization: String,

    /// Timeout applied to every API request (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Number of components requested per search page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_url() -> String {
    DEFAULT_SONARCLOUD_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

impl Default for SonarCloudConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: String::new(),
            organization: String::new(),
            request_timeout_secs: default_request_timeout(),
            page_size: default_page_size(),
        }
    }
}

impl SonarCloudConfig {
    /// Validate the connection settings.
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::Config("SonarCloud API token is required".to_string()));
        }

        if self.organization.is_empty() {
            return Err(Error::Config(
                "SonarCloud organization is required".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::Config(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        if reqwest::Url::parse(&self.url).is_err() {
            return Err(Error::InvalidUrl {
                url: self.url.clone(),
                message: "not an absolute URL".to_string(),
            });
        }

        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
