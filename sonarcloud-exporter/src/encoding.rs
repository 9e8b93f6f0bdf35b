//! Prometheus text exposition of a scrape.

use std::fmt::{self, Write};

use prometheus_client::collector::Collector as PrometheusCollector;
use prometheus_client::encoding::{
    DescriptorEncoder, EncodeLabelValue, EncodeMetric, LabelValueEncoder,
};
use prometheus_client::metrics::MetricType;
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::registry::Registry;

use crate::collector::{Sample, Scrape};

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Label value escaped for the text exposition.
///
/// prometheus-client writes `&str` label values verbatim, so quotes,
/// backslashes and newlines from SonarCloud names are escaped here.
#[derive(Debug, Clone, Copy)]
struct EscapedLabel<'a>(&'a str);

impl EncodeLabelValue for EscapedLabel<'_> {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), fmt::Error> {
        for c in self.0.chars() {
            match c {
                '\\' => encoder.write_str("\\\\")?,
                '"' => encoder.write_str("\\\"")?,
                '\n' => encoder.write_str("\\n")?,
                c => encoder.write_char(c)?,
            }
        }
        Ok(())
    }
}

impl PrometheusCollector for Scrape {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), fmt::Error> {
        for descriptor in self.registry.iter() {
            let samples: Vec<&Sample> = self.samples_of(descriptor.kind).collect();
            if samples.is_empty() {
                continue;
            }

            let mut metric_encoder = encoder.encode_descriptor(
                descriptor.name,
                descriptor.help,
                None,
                MetricType::Gauge,
            )?;

            if descriptor.label_names.is_empty() {
                // Label-less families carry a single series.
                ConstGauge::new(samples[0].value).encode(metric_encoder)?;
                continue;
            }

            for sample in samples {
                let labels: Vec<(&str, EscapedLabel<'_>)> = descriptor
                    .label_names
                    .iter()
                    .copied()
                    .zip(sample.labels.iter().map(|value| EscapedLabel(value.as_str())))
                    .collect();
                ConstGauge::new(sample.value).encode(metric_encoder.encode_family(&labels)?)?;
            }
        }

        Ok(())
    }
}

impl Scrape {
    /// Render the scrape in the text exposition format.
    pub fn render(self) -> Result<String, fmt::Error> {
        let mut registry = Registry::default();
        registry.register_collector(Box::new(self));

        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &registry)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MetricCollector;
    use crate::filter::EnabledMetrics;
    use sonarcloud_common::{Measurement, Project, QualityGateEntry, Stats, StatsProvider};

    struct FixedProvider(Option<Stats>);

    impl StatsProvider for FixedProvider {
        async fn get_stats(&self) -> sonarcloud_common::Result<Stats> {
            self.0
                .clone()
                .ok_or_else(|| sonarcloud_common::Error::Config("offline".to_string()))
        }
    }

    fn stats() -> Stats {
        Stats {
            projects: vec![Project {
                name: "Web".to_string(),
                qualifier: "TRK".to_string(),
                key: "acme_web".to_string(),
                organization: "acme".to_string(),
            }],
            measurements: vec![
                Measurement {
                    key: "acme_web".to_string(),
                    metric: "ncloc".to_string(),
                    value: "1234".to_string(),
                },
                Measurement {
                    key: "acme_api".to_string(),
                    metric: "bugs".to_string(),
                    value: "not-a-number".to_string(),
                },
            ],
            quality_gate: vec![QualityGateEntry {
                key: "acme_web".to_string(),
                organization: "acme".to_string(),
                value: "1".to_string(),
            }],
        }
    }

    async fn render_with(provider: FixedProvider, enabled: &str) -> String {
        let collector = MetricCollector::new(provider, EnabledMetrics::parse(enabled));
        collector.collect().await.render().unwrap()
    }

    #[tokio::test]
    async fn test_render_success() {
        let output = render_with(FixedProvider(Some(stats())), "all").await;

        assert!(output.contains("# HELP sonarcloud_up Whether Sonarcloud scrape was successful"));
        assert!(output.contains("# TYPE sonarcloud_up gauge"));
        assert!(output.contains("sonarcloud_up 1"));
        assert!(output.contains("# TYPE sonarcloud_project_info gauge"));
        assert!(output.contains(
            "sonarcloud_project_info{project_name=\"Web\",project_qualifier=\"TRK\",project_key=\"acme_web\",project_organization=\"acme\"} 1"
        ));
        assert!(output.contains("sonarcloud_lines_of_code{project_key=\"acme_web\"} 1234"));
        assert!(output.contains("sonarcloud_quality_gate{service=\"web\"} 1"));
        assert!(output.ends_with("# EOF\n"));
    }

    #[tokio::test]
    async fn test_render_unparsable_value_omitted() {
        let output = render_with(FixedProvider(Some(stats())), "bugs").await;

        assert!(output.contains("sonarcloud_up 1"));
        assert!(!output.contains("sonarcloud_bugs"));
    }

    #[tokio::test]
    async fn test_render_skips_empty_families() {
        let output = render_with(FixedProvider(Some(stats())), "linesOfCode").await;

        assert!(output.contains("sonarcloud_lines_of_code"));
        assert!(!output.contains("sonarcloud_project_info"));
        assert!(!output.contains("sonarcloud_code_coverage"));
        assert!(!output.contains("sonarcloud_quality_gate"));
    }

    #[tokio::test]
    async fn test_render_escapes_label_values() {
        let mut stats = stats();
        stats.projects[0].name = "My \"quoted\" \\ app\nx".to_string();

        let output = render_with(FixedProvider(Some(stats)), "projectInfo").await;

        assert!(output.contains(r#"project_name="My \"quoted\" \\ app\nx",project_qualifier="TRK""#));
        assert!(!output.lines().any(|line| line.starts_with("x\"")));
    }

    #[tokio::test]
    async fn test_render_fetch_failure() {
        let output = render_with(FixedProvider(None), "all").await;

        assert!(output.contains("sonarcloud_up 0"));
        assert!(!output.contains("sonarcloud_project_info"));
        assert!(!output.contains("sonarcloud_lines_of_code"));
    }
}
