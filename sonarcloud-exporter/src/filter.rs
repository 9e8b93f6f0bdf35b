//! Selection of the metric kinds a collector emits.

use std::collections::BTreeSet;

use tracing::debug;

use crate::registry::MetricKind;

/// Sentinel token enabling every metric kind.
pub const ALL_METRICS: &str = "all";

/// Set of enabled metric kinds, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledMetrics {
    kinds: BTreeSet<MetricKind>,
}

impl EnabledMetrics {
    /// Every metric kind enabled.
    pub fn all() -> Self {
        Self {
            kinds: MetricKind::ALL.into_iter().collect(),
        }
    }

    /// Resolve a list of metric tokens.
    ///
    /// A list consisting of exactly `"all"` enables everything. Otherwise only
    /// the listed kinds are enabled; unknown tokens are ignored.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        if let [only] = names
            && only.as_ref() == ALL_METRICS
        {
            return Self::all();
        }

        let mut kinds = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            match MetricKind::from_token(name) {
                Some(kind) => {
                    kinds.insert(kind);
                }
                None => debug!(token = %name, "Ignoring unknown metric name"),
            }
        }

        Self { kinds }
    }

    /// Resolve a comma-separated list of metric tokens.
    ///
    /// Tokens are trimmed and empty tokens dropped before resolution.
    pub fn parse(list: &str) -> Self {
        let names: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        Self::from_names(&names)
    }

    pub fn is_enabled(&self, kind: MetricKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Enabled kinds, in exposition order.
    pub fn iter(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.kinds.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for EnabledMetrics {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_enables_every_kind() {
        let enabled = EnabledMetrics::from_names(&["all"]);

        for kind in MetricKind::ALL {
            assert!(enabled.is_enabled(kind), "{kind} should be enabled");
        }
        assert_eq!(enabled.len(), MetricKind::ALL.len());
    }

    #[test]
    fn test_explicit_list() {
        let enabled = EnabledMetrics::from_names(&["linesOfCode", "bugs"]);

        assert!(enabled.is_enabled(MetricKind::LinesOfCode));
        assert!(enabled.is_enabled(MetricKind::Bugs));
        assert!(!enabled.is_enabled(MetricKind::CodeCoverage));
        assert!(!enabled.is_enabled(MetricKind::QualityGate));
        assert_eq!(enabled.len(), 2);
    }

    #[test]
    fn test_order_and_duplicates_irrelevant() {
        let a = EnabledMetrics::from_names(&["bugs", "qualityGate", "bugs"]);
        let b = EnabledMetrics::from_names(&["qualityGate", "bugs"]);

        assert_eq!(a, b);
    }

    #[test]
    fn test_all_only_special_when_alone() {
        let enabled = EnabledMetrics::from_names(&["all", "bugs"]);

        assert!(enabled.is_enabled(MetricKind::Bugs));
        assert!(!enabled.is_enabled(MetricKind::LinesOfCode));
        assert_eq!(enabled.len(), 1);
    }

    #[test]
    fn test_unknown_tokens_are_inert() {
        let enabled = EnabledMetrics::from_names(&["nope", "codeSmells", "LINESOFCODE"]);

        assert!(enabled.is_enabled(MetricKind::CodeSmells));
        assert_eq!(enabled.len(), 1);
    }

    #[test]
    fn test_empty_list_enables_nothing() {
        let names: [&str; 0] = [];
        assert!(EnabledMetrics::from_names(&names).is_empty());
        assert!(EnabledMetrics::parse("").is_empty());
    }

    #[test]
    fn test_parse_comma_separated() {
        let enabled = EnabledMetrics::parse("projectInfo, codeCoverage,,vulnerabilities ");

        let kinds: Vec<MetricKind> = enabled.iter().collect();
        assert_eq!(
            kinds,
            vec![
                MetricKind::ProjectInfo,
                MetricKind::CodeCoverage,
                MetricKind::Vulnerabilities
            ]
        );
    }

    #[test]
    fn test_parse_all() {
        assert_eq!(EnabledMetrics::parse("all"), EnabledMetrics::all());
        assert_eq!(EnabledMetrics::parse(" all "), EnabledMetrics::all());
    }
}
