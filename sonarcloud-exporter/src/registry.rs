//! Metric kinds and their Prometheus descriptors.

use std::fmt;

const PROJECT_KEY_LABELS: &[&str] = &["project_key"];

/// Every metric family the exporter can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Up,
    ProjectInfo,
    LinesOfCode,
    CodeCoverage,
    Vulnerabilities,
    Bugs,
    CodeSmells,
    QualityGate,
}

impl MetricKind {
    /// All kinds, in exposition order.
    pub const ALL: [MetricKind; 8] = [
        MetricKind::Up,
        MetricKind::ProjectInfo,
        MetricKind::LinesOfCode,
        MetricKind::CodeCoverage,
        MetricKind::Vulnerabilities,
        MetricKind::Bugs,
        MetricKind::CodeSmells,
        MetricKind::QualityGate,
    ];

    /// Configuration token selecting this kind.
    pub fn token(&self) -> &'static str {
        match self {
            MetricKind::Up => "up",
            MetricKind::ProjectInfo => "projectInfo",
            MetricKind::LinesOfCode => "linesOfCode",
            MetricKind::CodeCoverage => "codeCoverage",
            MetricKind::Vulnerabilities => "vulnerabilities",
            MetricKind::Bugs => "bugs",
            MetricKind::CodeSmells => "codeSmells",
            MetricKind::QualityGate => "qualityGate",
        }
    }

    /// Look up a kind by its configuration token (case-sensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.token() == token)
    }

    fn descriptor(self) -> MetricDescriptor {
        match self {
            MetricKind::Up => MetricDescriptor::new(
                self,
                "sonarcloud_up",
                "Whether Sonarcloud scrape was successful",
                &[],
            ),
            MetricKind::ProjectInfo => MetricDescriptor::new(
                self,
                "sonarcloud_project_info",
                "General information about projects",
                &[
                    "project_name",
                    "project_qualifier",
                    "project_key",
                    "project_organization",
                ],
            ),
            MetricKind::LinesOfCode => MetricDescriptor::new(
                self,
                "sonarcloud_lines_of_code",
                "Lines of code within a project in SonarCloud",
                PROJECT_KEY_LABELS,
            ),
            MetricKind::CodeCoverage => MetricDescriptor::new(
                self,
                "sonarcloud_code_coverage",
                "Code coverage within a project in SonarCloud",
                PROJECT_KEY_LABELS,
            ),
            MetricKind::Vulnerabilities => MetricDescriptor::new(
                self,
                "sonarcloud_vulnerabilities",
                "Amount of vulnerabilities within a project in SonarCloud",
                PROJECT_KEY_LABELS,
            ),
            MetricKind::Bugs => MetricDescriptor::new(
                self,
                "sonarcloud_bugs",
                "Amount of bugs within a project in SonarCloud",
                PROJECT_KEY_LABELS,
            ),
            MetricKind::CodeSmells => MetricDescriptor::new(
                self,
                "sonarcloud_code_smells",
                "Amount of code smells within a project in SonarCloud",
                PROJECT_KEY_LABELS,
            ),
            MetricKind::QualityGate => MetricDescriptor::new(
                self,
                "sonarcloud_quality_gate",
                "Quality gate status of a project in SonarCloud",
                &["service"],
            ),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Static shape of one metric family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub kind: MetricKind,
    /// Full Prometheus metric name.
    pub name: &'static str,
    pub help: &'static str,
    /// Label names, in the order sample label values are given.
    pub label_names: &'static [&'static str],
}

impl MetricDescriptor {
    const fn new(
        kind: MetricKind,
        name: &'static str,
        help: &'static str,
        label_names: &'static [&'static str],
    ) -> Self {
        Self {
            kind,
            name,
            help,
            label_names,
        }
    }
}

/// Immutable table of all metric descriptors, indexed by [`MetricKind`].
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    descriptors: Vec<MetricDescriptor>,
}

impl MetricRegistry {
    /// Build the descriptor table.
    pub fn new() -> Self {
        Self {
            descriptors: MetricKind::ALL.into_iter().map(MetricKind::descriptor).collect(),
        }
    }

    /// Descriptor of a metric kind.
    pub fn descriptor(&self, kind: MetricKind) -> &MetricDescriptor {
        // The table is built from MetricKind::ALL, whose order matches the
        // enum discriminants.
        &self.descriptors[kind as usize]
    }

    /// Iterate descriptors in exposition order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.descriptors.iter()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}
