//! Scrape orchestration: fetch a snapshot and map it onto metric samples.

use std::collections::HashSet;
use std::sync::Arc;

use sonarcloud_common::{Stats, StatsProvider};
use tracing::{debug, error, info, trace};

use crate::filter::EnabledMetrics;
use crate::mapping::{MeasureDispatch, dispatch_measure, parse_value, trim_quality_gate_key};
use crate::registry::{MetricKind, MetricRegistry};

/// One observation of a metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub kind: MetricKind,
    pub value: f64,
    /// Label values, in the order of the descriptor's label names.
    pub labels: Vec<String>,
}

impl Sample {
    pub fn new(kind: MetricKind, value: f64, labels: Vec<String>) -> Self {
        Self {
            kind,
            value,
            labels,
        }
    }
}

/// Samples produced by a single collect call.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub(crate) registry: Arc<MetricRegistry>,
    samples: Vec<Sample>,
}

impl Scrape {
    fn new(registry: Arc<MetricRegistry>, samples: Vec<Sample>) -> Self {
        Self { registry, samples }
    }

    /// All samples, in emission order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Samples of one metric kind.
    pub fn samples_of(&self, kind: MetricKind) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(move |s| s.kind == kind)
    }

    /// Whether the upstream fetch succeeded.
    pub fn is_up(&self) -> bool {
        self.samples_of(MetricKind::Up).any(|s| s.value == 1.0)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Collector turning SonarCloud snapshots into metric samples.
///
/// Holds no state between scrapes besides its immutable configuration, so a
/// single instance can serve concurrent scrapes.
#[derive(Debug)]
pub struct MetricCollector<P> {
    provider: P,
    registry: Arc<MetricRegistry>,
    enabled: EnabledMetrics,
}

impl<P> MetricCollector<P> {
    /// Create a collector with its own descriptor table.
    pub fn new(provider: P, enabled: EnabledMetrics) -> Self {
        Self::with_registry(provider, Arc::new(MetricRegistry::new()), enabled)
    }

    /// Create a collector sharing an existing descriptor table.
    pub fn with_registry(provider: P, registry: Arc<MetricRegistry>, enabled: EnabledMetrics) -> Self {
        let tokens: Vec<&str> = enabled.iter().map(|k| k.token()).collect();
        info!(enabled = ?tokens, "Creating collector");

        Self {
            provider,
            registry,
            enabled,
        }
    }

    /// Map a successfully fetched snapshot onto samples.
    ///
    /// The liveness sample comes first, followed by the project info,
    /// measurement and quality gate passes.
    pub fn map_stats(&self, stats: &Stats) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(1 + stats.len());
        samples.push(Sample::new(MetricKind::Up, 1.0, Vec::new()));

        if self.enabled.is_enabled(MetricKind::ProjectInfo) {
            self.collect_project_info(stats, &mut samples);
        }

        self.collect_measurements(stats, &mut samples);

        if self.enabled.is_enabled(MetricKind::QualityGate) {
            self.collect_quality_gate(stats, &mut samples);
        }

        samples
    }

    fn collect_project_info(&self, stats: &Stats, samples: &mut Vec<Sample>) {
        for project in &stats.projects {
            samples.push(Sample::new(
                MetricKind::ProjectInfo,
                1.0,
                vec![
                    project.name.clone(),
                    project.qualifier.clone(),
                    project.key.clone(),
                    project.organization.clone(),
                ],
            ));
        }
    }

    fn collect_measurements(&self, stats: &Stats, samples: &mut Vec<Sample>) {
        for measurement in &stats.measurements {
            let value = match parse_value(&measurement.value) {
                Ok(v) => v,
                Err(e) => {
                    error!(
                        project_key = %measurement.key,
                        metric = %measurement.metric,
                        value = %measurement.value,
                        error = %e,
                        "Failed to parse measurement value"
                    );
                    continue;
                }
            };

            match dispatch_measure(&measurement.metric) {
                MeasureDispatch::Emit(kind) if self.enabled.is_enabled(kind) => {
                    samples.push(Sample::new(kind, value, vec![measurement.key.clone()]));
                }
                MeasureDispatch::Emit(kind) => {
                    trace!(metric = %kind, project_key = %measurement.key, "Metric disabled");
                }
                MeasureDispatch::Ignored => {
                    trace!(
                        metric = %measurement.metric,
                        project_key = %measurement.key,
                        "Ignoring unsupported measure"
                    );
                }
            }
        }
    }

    fn collect_quality_gate(&self, stats: &Stats, samples: &mut Vec<Sample>) {
        let mut emitted: HashSet<&str> = HashSet::new();

        for entry in &stats.quality_gate {
            let service = trim_quality_gate_key(&entry.key, &entry.organization);
            if emitted.contains(service) {
                debug!(service, "Skipping duplicate quality gate entry");
                continue;
            }

            let value = match parse_value(&entry.value) {
                Ok(v) => v,
                Err(e) => {
                    error!(
                        service,
                        value = %entry.value,
                        error = %e,
                        "Failed to parse quality gate value"
                    );
                    continue;
                }
            };

            samples.push(Sample::new(
                MetricKind::QualityGate,
                value,
                vec![service.to_string()],
            ));
            emitted.insert(service);
        }
    }
}

impl<P: StatsProvider> MetricCollector<P> {
    /// Run one scrape: fetch a snapshot and map it.
    ///
    /// A failed fetch yields a scrape holding only `sonarcloud_up 0`.
    pub async fn collect(&self) -> Scrape {
        info!("Running scrape");

        match self.provider.get_stats().await {
            Ok(stats) => {
                let samples = self.map_stats(&stats);
                info!(samples = samples.len(), "Scrape complete");
                Scrape::new(self.registry.clone(), samples)
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch SonarCloud statistics");
                Scrape::new(
                    self.registry.clone(),
                    vec![Sample::new(MetricKind::Up, 0.0, Vec::new())],
                )
            }
        }
    }
}

/// Create a shareable collector handle.
pub type SharedCollector<P> = Arc<MetricCollector<P>>;
