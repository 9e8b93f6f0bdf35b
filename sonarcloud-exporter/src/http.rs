//! HTTP server for the Prometheus metrics endpoint.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use sonarcloud_common::StatsProvider;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::collector::SharedCollector;
use crate::encoding::CONTENT_TYPE;

/// Application state shared across handlers.
struct AppState<P> {
    collector: SharedCollector<P>,
    metrics_path: String,
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            collector: self.collector.clone(),
            metrics_path: self.metrics_path.clone(),
        }
    }
}

/// Create the HTTP router.
fn create_router<P: StatsProvider>(collector: SharedCollector<P>, metrics_path: &str) -> Router {
    let state = AppState {
        collector,
        metrics_path: metrics_path.to_string(),
    };

    Router::new()
        .route(metrics_path, get(metrics_handler::<P>))
        .route("/", get(index_handler::<P>))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for the metrics endpoint: one scrape per request.
async fn metrics_handler<P: StatsProvider>(State(state): State<AppState<P>>) -> Response {
    let scrape = state.collector.collect().await;

    match scrape.render() {
        Ok(body) => (StatusCode::OK, [("content-type", CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to encode metrics\n",
            )
                .into_response()
        }
    }
}

/// Handler for the landing page.
async fn index_handler<P: StatsProvider>(State(state): State<AppState<P>>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>SonarCloud Exporter</title></head>\n\
         <body>\n\
         <h1>SonarCloud Exporter</h1>\n\
         <p><a href=\"{path}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        path = state.metrics_path
    ))
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// HTTP server configuration.
pub struct HttpServer<P> {
    collector: SharedCollector<P>,
    listen_addr: SocketAddr,
    metrics_path: String,
}

impl<P: StatsProvider> HttpServer<P> {
    /// Create a new HTTP server.
    pub fn new(collector: SharedCollector<P>, listen_addr: SocketAddr, metrics_path: String) -> Self {
        Self {
            collector,
            listen_addr,
            metrics_path,
        }
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let router = create_router(self.collector, &self.metrics_path);

        info!(
            addr = %self.listen_addr,
            path = %self.metrics_path,
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        info!(
            addr = %self.listen_addr,
            path = %self.metrics_path,
            "HTTP server listening"
        );

        // Run server with graceful shutdown
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                // Wait for shutdown signal
                loop {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
