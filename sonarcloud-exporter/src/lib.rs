//! Prometheus metrics exporter for SonarCloud project statistics.
//!
//! This crate provides a Prometheus exporter that pulls project statistics from
//! the SonarCloud Web API on every scrape and exposes them via an HTTP
//! `/metrics` endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ SonarCloud API  │────>│    Collector    │────>│   HTTP Server   │
//! │ (StatsProvider) │     │    (mapping)    │     │   (/metrics)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! Each scrape is independent: the collector fetches a fresh snapshot, maps it
//! onto the enabled metric families and hands the samples to the encoder.
//!
//! # Usage
//!
//! ```bash
//! SC_TOKEN=... sonarcloud-exporter --organization acme --metrics-name linesOfCode,qualityGate
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod collector;
pub mod config;
pub mod encoding;
pub mod filter;
pub mod http;
pub mod mapping;
pub mod registry;

pub use collector::{MetricCollector, Sample, Scrape, SharedCollector};
pub use config::ExporterConfig;
pub use filter::EnabledMetrics;
pub use http::HttpServer;
pub use registry::{MetricDescriptor, MetricKind, MetricRegistry};
