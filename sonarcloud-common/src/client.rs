//! SonarCloud Web API client.
//!
//! Builds a [`Stats`] snapshot from three endpoints:
//!
//! - `api/components/search` for the organization's projects (paged)
//! - `api/measures/component` for the scalar measures of each project
//! - `api/qualitygates/project_status` for each project's gate status

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::SonarCloudConfig;
use crate::error::{Error, Result};
use crate::stats::{Measurement, Project, QualityGateEntry, Stats, StatsProvider};

const COMPONENTS_SEARCH: &str = "api/components/search";
const MEASURES_COMPONENT: &str = "api/measures/component";
const QUALITY_GATE_STATUS: &str = "api/qualitygates/project_status";

/// Qualifier SonarCloud uses for top-level projects.
const PROJECT_QUALIFIER: &str = "TRK";

/// Measures requested for every project.
pub const MEASURE_KEYS: &str = "ncloc,coverage,vulnerabilities,bugs,violations";

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(rename = "pageIndex")]
    page_index: u32,
    total: u64,
}

#[derive(Debug, Deserialize)]
struct Component {
    key: String,
    name: String,
    qualifier: String,
    #[serde(default)]
    organization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComponentSearchResponse {
    paging: Paging,
    #[serde(default)]
    components: Vec<Component>,
}

#[derive(Debug, Deserialize)]
struct Measure {
    metric: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeasuredComponent {
    #[serde(default)]
    measures: Vec<Measure>,
}

#[derive(Debug, Deserialize)]
struct MeasuresResponse {
    component: MeasuredComponent,
}

#[derive(Debug, Deserialize)]
struct ProjectStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ProjectStatusResponse {
    #[serde(rename = "projectStatus")]
    project_status: ProjectStatus,
}

/// Map a quality gate status to the exported value.
///
/// `NONE` means no gate was computed for the project, so no row is produced.
fn gate_value(status: &str) -> Option<&'static str> {
    match status {
        "OK" => Some("1"),
        "ERROR" | "WARN" => Some("0"),
        _ => None,
    }
}

/// Parse the base URL, making sure joins keep any path prefix.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| Error::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl {
            url: raw.to_string(),
            message: "URL cannot be used as a base".to_string(),
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// [`StatsProvider`] backed by the SonarCloud Web API.
#[derive(Debug, Clone)]
pub struct SonarCloudClient {
    http: Client,
    base_url: Url,
    organization: String,
    page_size: u32,
}

impl SonarCloudClient {
    /// Create a client from connection settings.
    pub fn new(config: &SonarCloudConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.url)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| Error::Config(format!("Invalid SonarCloud token: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .user_agent(concat!("sonarcloud-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            organization: config.organization.clone(),
            page_size: config.page_size,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.base_url.join(endpoint).map_err(|e| Error::InvalidUrl {
            url: format!("{}{}", self.base_url, endpoint),
            message: e.to_string(),
        })?;

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch every project of the organization, following pagination.
    pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
        let mut projects = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response: ComponentSearchResponse = self
                .get_json(
                    COMPONENTS_SEARCH,
                    &[
                        ("organization", self.organization.clone()),
                        ("qualifiers", PROJECT_QUALIFIER.to_string()),
                        ("ps", self.page_size.to_string()),
                        ("p", page.to_string()),
                    ],
                )
                .await?;

            let received = response.components.len();
            projects.extend(response.components.into_iter().map(|c| Project {
                name: c.name,
                qualifier: c.qualifier,
                key: c.key,
                organization: c.organization.unwrap_or_else(|| self.organization.clone()),
            }));

            debug!(
                page = response.paging.page_index,
                received,
                total = response.paging.total,
                "Fetched project page"
            );

            let seen = u64::from(page) * u64::from(self.page_size);
            if received == 0 || seen >= response.paging.total {
                break;
            }
            page += 1;
        }

        Ok(projects)
    }

    /// Fetch the scalar measures of one project.
    pub async fn fetch_measurements(&self, project_key: &str) -> Result<Vec<Measurement>> {
        let response: MeasuresResponse = self
            .get_json(
                MEASURES_COMPONENT,
                &[
                    ("component", project_key.to_string()),
                    ("metricKeys", MEASURE_KEYS.to_string()),
                ],
            )
            .await?;

        Ok(response
            .component
            .measures
            .into_iter()
            .filter_map(|m| {
                m.value.map(|value| Measurement {
                    key: project_key.to_string(),
                    metric: m.metric,
                    value,
                })
            })
            .collect())
    }

    /// Fetch the quality gate row of one project, if a gate was computed.
    pub async fn fetch_quality_gate(&self, project: &Project) -> Result<Option<QualityGateEntry>> {
        let response: ProjectStatusResponse = self
            .get_json(QUALITY_GATE_STATUS, &[("projectKey", project.key.clone())])
            .await?;

        Ok(gate_value(&response.project_status.status).map(|value| QualityGateEntry {
            key: project.key.clone(),
            organization: project.organization.clone(),
            value: value.to_string(),
        }))
    }
}

impl StatsProvider for SonarCloudClient {
    async fn get_stats(&self) -> Result<Stats> {
        let projects = self.fetch_projects().await?;

        let mut measurements = Vec::new();
        let mut quality_gate = Vec::new();
        for project in &projects {
            measurements.extend(self.fetch_measurements(&project.key).await?);
            if let Some(entry) = self.fetch_quality_gate(project).await? {
                quality_gate.push(entry);
            }
        }

        info!(
            organization = %self.organization,
            projects = projects.len(),
            measurements = measurements.len(),
            quality_gates = quality_gate.len(),
            "Fetched SonarCloud statistics"
        );

        Ok(Stats {
            projects,
            measurements,
            quality_gate,
        })
    }
}
