//! Configuration for the SonarCloud exporter.

use serde::{Deserialize, Serialize};
use sonarcloud_common::{LoggingConfig, SonarCloudConfig};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::filter::{ALL_METRICS, EnabledMetrics};

/// Routes served alongside the metrics endpoint.
const RESERVED_PATHS: &[&str] = &["/", "/health"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    SonarCloud(#[from] sonarcloud_common::Error),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// SonarCloud API settings.
    #[serde(default)]
    pub sonarcloud: SonarCloudConfig,

    /// HTTP exposition settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Comma-separated metric names to export, or "all".
    #[serde(default = "default_metrics")]
    pub metrics: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to listen on, or a bare port (default: "0.0.0.0:8080").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

fn default_metrics() -> String {
    ALL_METRICS.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
        }
    }
}

impl HttpConfig {
    /// Resolve the listen address.
    ///
    /// A bare port such as `8080` binds on all interfaces.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let listen = self.listen.trim();
        if let Ok(port) = listen.parse::<u16>() {
            return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
        }

        listen.parse::<SocketAddr>().map_err(|_| {
            ConfigError::Validation(format!("Invalid listen address: {}", self.listen))
        })
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            sonarcloud: SonarCloudConfig::default(),
            http: HttpConfig::default(),
            metrics: default_metrics(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    ///
    /// The result is not validated, so that CLI and environment overrides can
    /// fill in required settings first.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        Ok(config)
    }

    /// Resolved metric selection.
    pub fn enabled_metrics(&self) -> EnabledMetrics {
        EnabledMetrics::parse(&self.metrics)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sonarcloud.validate()?;

        self.http.socket_addr()?;

        let path = &self.http.path;
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }
        if RESERVED_PATHS.contains(&path.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Metrics path must not be {}",
                path
            )));
        }
        // The router would treat these as captures or wildcards
        if path.contains(':') || path.contains('*') {
            return Err(ConfigError::Validation(format!(
                "Metrics path must not contain ':' or '*': {}",
                path
            )));
        }

        Ok(())
    }
}
