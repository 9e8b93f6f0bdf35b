//! Prometheus exporter for SonarCloud project statistics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use sonarcloud_common::{SonarCloudClient, init_tracing};
use sonarcloud_exporter::{ExporterConfig, HttpServer, MetricCollector};

/// Prometheus exporter for SonarCloud.
#[derive(Parser, Debug)]
#[command(name = "sonarcloud-exporter")]
#[command(about = "Export SonarCloud project statistics as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Token to access SonarCloud API.
    #[arg(long, env = "SC_TOKEN", hide_env_values = true)]
    sc_token: Option<String>,

    /// Organization to query within SonarCloud.
    #[arg(long, env = "SC_ORGANIZATION")]
    organization: Option<String>,

    /// Base URL of the SonarCloud instance.
    #[arg(long, env = "SC_URL")]
    sonarcloud_url: Option<String>,

    /// Address (or bare port) the exporter listens on.
    #[arg(long, env = "LISTEN_ADDRESS")]
    listen_address: Option<String>,

    /// Path where metrics will be exposed.
    #[arg(long, env = "LISTEN_PATH")]
    listen_path: Option<String>,

    /// Comma-separated list of metrics to enable, or "all".
    #[arg(long, env = "METRICS_NAME")]
    metrics_name: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Apply CLI and environment overrides on top of the file configuration.
    fn apply(self, config: &mut ExporterConfig) {
        if let Some(token) = self.sc_token {
            config.sonarcloud.token = token;
        }
        if let Some(organization) = self.organization {
            config.sonarcloud.organization = organization;
        }
        if let Some(url) = self.sonarcloud_url {
            config.sonarcloud.url = url;
        }
        if let Some(listen) = self.listen_address {
            config.http.listen = listen;
        }
        if let Some(path) = self.listen_path {
            config.http.path = path;
        }
        if let Some(metrics) = self.metrics_name {
            config.metrics = metrics;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

/// Resolve once SIGTERM is received (never on non-unix targets).
async fn sigterm() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                return;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    }

    std::future::pending::<()>().await;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();

    // Load configuration
    let mut config = match args.config.take() {
        Some(path) => ExporterConfig::load_from_file(&path)?,
        None => ExporterConfig::default(),
    };
    args.apply(&mut config);

    // Initialize logging
    init_tracing(&config.logging)?;

    if let Err(e) = config.validate() {
        error!("{}", e);
        return Err(e.into());
    }

    info!("Starting SonarCloud Exporter");

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Create the collector
    let client = SonarCloudClient::new(&config.sonarcloud)?;
    let collector = Arc::new(MetricCollector::new(client, config.enabled_metrics()));

    let listen_addr = config.http.socket_addr()?;
    let http_server = HttpServer::new(collector, listen_addr, config.http.path.clone());

    info!("Start serving metrics");

    // Start HTTP server
    let mut http_task = tokio::spawn(async move { http_server.run(shutdown_rx).await });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = sigterm() => {
            info!("Received SIGTERM, shutting down...");
        }
        result = &mut http_task => {
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    error!("HTTP server error: {}", e);
                    Err(e)
                }
                Err(e) => Err(e.into()),
            };
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    // Wait for the server to drain
    if tokio::time::timeout(Duration::from_secs(5), http_task)
        .await
        .is_err()
    {
        error!("HTTP server did not stop within 5 seconds");
    }

    info!("Exporter stopped");
    Ok(())
}
