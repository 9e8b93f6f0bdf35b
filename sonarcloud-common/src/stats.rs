use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single SonarCloud project (component with qualifier `TRK`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub qualifier: String,
    pub key: String,
    pub organization: String,
}

/// One scalar measure of a project, e.g. `ncloc` or `coverage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Project key the measure belongs to.
    pub key: String,
    /// SonarCloud metric identifier.
    pub metric: String,
    /// Decimal-formatted value, as returned by the API.
    pub value: String,
}

/// Quality gate status row.
///
/// `key` carries the `<organization>_` prefix SonarCloud puts on project keys
/// imported from a code host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityGateEntry {
    pub key: String,
    pub organization: String,
    pub value: String,
}

/// Snapshot of everything fetched from SonarCloud for one scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
    #[serde(default)]
    pub quality_gate: Vec<QualityGateEntry>,
}

impl Stats {
    /// Total number of raw rows in the snapshot.
    pub fn len(&self) -> usize {
        self.projects.len() + self.measurements.len() + self.quality_gate.len()
    }

    /// Whether the snapshot holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of [`Stats`] snapshots.
///
/// Implementations own transport, authentication and retry policy. Any error
/// is treated by callers as a failed scrape.
pub trait StatsProvider: Send + Sync + 'static {
    /// Fetch a fresh snapshot.
    fn get_stats(&self) -> impl Future<Output = Result<Stats>> + Send;
}
