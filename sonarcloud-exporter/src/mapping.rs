//! Mapping from raw SonarCloud rows to metric kinds and values.

use std::num::ParseFloatError;

use crate::registry::MetricKind;

/// SonarCloud measures the exporter knows how to republish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    Ncloc,
    Coverage,
    Vulnerabilities,
    Bugs,
    Violations,
}

impl MeasureKind {
    /// Identify a measure by its SonarCloud metric key.
    pub fn from_metric(metric: &str) -> Option<Self> {
        match metric {
            "ncloc" => Some(MeasureKind::Ncloc),
            "coverage" => Some(MeasureKind::Coverage),
            "vulnerabilities" => Some(MeasureKind::Vulnerabilities),
            "bugs" => Some(MeasureKind::Bugs),
            "violations" => Some(MeasureKind::Violations),
            _ => None,
        }
    }

    /// Metric kind this measure is exported as.
    pub fn metric_kind(self) -> MetricKind {
        match self {
            MeasureKind::Ncloc => MetricKind::LinesOfCode,
            MeasureKind::Coverage => MetricKind::CodeCoverage,
            MeasureKind::Vulnerabilities => MetricKind::Vulnerabilities,
            MeasureKind::Bugs => MetricKind::Bugs,
            MeasureKind::Violations => MetricKind::CodeSmells,
        }
    }
}

/// Outcome of routing one measurement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureDispatch {
    /// Export under this metric kind.
    Emit(MetricKind),
    /// Not a measure this exporter publishes.
    Ignored,
}

/// Route a SonarCloud metric key to the metric kind it feeds.
pub fn dispatch_measure(metric: &str) -> MeasureDispatch {
    match MeasureKind::from_metric(metric) {
        Some(measure) => MeasureDispatch::Emit(measure.metric_kind()),
        None => MeasureDispatch::Ignored,
    }
}

/// Strip the `<organization>_` prefix from a quality gate key.
///
/// Keys without the prefix are returned unchanged.
pub fn trim_quality_gate_key<'a>(key: &'a str, organization: &str) -> &'a str {
    key.strip_prefix(organization)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(key)
}

/// Parse a decimal-formatted value from the API.
pub fn parse_value(raw: &str) -> Result<f64, ParseFloatError> {
    raw.parse::<f64>()
}
