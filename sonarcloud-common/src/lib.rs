//! SonarCloud Common Library
//!
//! This crate provides the shared types used by the SonarCloud exporter:
//!
//! - [`stats`] - Statistics snapshot model (`Stats`, `Project`, `Measurement`, `QualityGateEntry`)
//!   and the [`StatsProvider`] trait
//! - [`client`] - SonarCloud Web API client implementing [`StatsProvider`]
//! - [`config`] - Connection and logging configuration
//! - [`error`] - Error types

pub mod client;
pub mod config;
pub mod error;
pub mod stats;

// Re-export commonly used types at the crate root
pub use client::SonarCloudClient;
pub use config::{LogFormat, LoggingConfig, SonarCloudConfig};
pub use error::{Error, Result};
pub use stats::{Measurement, Project, QualityGateEntry, Stats, StatsProvider};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG`, when set, takes precedence over `config.level`.
///
/// # Example
///
/// ```ignore
/// use sonarcloud_common::{LoggingConfig, LogFormat, init_tracing};
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Json,
/// };
/// init_tracing(&config)?;
/// ```
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
