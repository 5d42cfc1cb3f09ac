//! PerfDataSource resource: one data feed that should exist and be active in PERF.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::command::DataSourceKind;
use super::meta::ObjectMeta;

/// Desired, type-specific configuration of a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DataSourceSpecConfig {
    #[serde(rename = "sonar", alias = "SONAR", alias = "Sonar", rename_all = "camelCase")]
    Sonar { project_keys: Vec<String>, url: String },

    #[serde(rename = "jenkins", alias = "JENKINS", alias = "Jenkins", rename_all = "camelCase")]
    Jenkins { job_names: Vec<String>, url: String },

    #[serde(
        rename = "gitlab",
        alias = "GITLAB",
        alias = "GitLab",
        alias = "Gitlab",
        rename_all = "camelCase"
    )]
    GitLab {
        repositories: Vec<String>,
        #[serde(default)]
        branches: Vec<String>,
        url: String,
    },
}

impl DataSourceSpecConfig {
    /// Data-source kind of this config.
    pub const fn kind(&self) -> DataSourceKind {
        match self {
            Self::Sonar { .. } => DataSourceKind::Sonar,
            Self::Jenkins { .. } => DataSourceKind::Jenkins,
            Self::GitLab { .. } => DataSourceKind::GitLab,
        }
    }

    /// Configured identifiers (project keys, job names or repositories).
    pub fn identifiers(&self) -> &[String] {
        match self {
            Self::Sonar { project_keys, .. } => project_keys,
            Self::Jenkins { job_names, .. } => job_names,
            Self::GitLab { repositories, .. } => repositories,
        }
    }

    /// Source system URL.
    pub fn url(&self) -> &str {
        match self {
            Self::Sonar { url, .. } | Self::Jenkins { url, .. } | Self::GitLab { url, .. } => url,
        }
    }
}

/// Desired state of a PerfDataSource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfDataSourceSpec {
    /// PerfServer this data source belongs to (same namespace).
    pub perf_server_name: String,
    /// Display name used when the data source is created in PERF.
    pub name: String,
    pub config: DataSourceSpecConfig,
}

impl PerfDataSourceSpec {
    /// Data-source kind.
    pub const fn kind(&self) -> DataSourceKind {
        self.config.kind()
    }
}

/// Outcome of the last convergence attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceState {
    Created,
    Error,
}

impl fmt::Display for DataSourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Observed state of a PerfDataSource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfDataSourceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DataSourceState>,
    #[serde(default)]
    pub detailed_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_time_updated: Option<DateTime<Utc>>,
}

/// A data feed that should exist and be active in PERF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfDataSource {
    pub metadata: ObjectMeta,
    pub spec: PerfDataSourceSpec,
    #[serde(default)]
    pub status: PerfDataSourceStatus,
}

impl PerfDataSource {
    /// Resource name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Resource namespace.
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Record success.
    pub fn mark_created(&mut self) {
        self.set_status(DataSourceState::Created, String::new());
    }

    /// Record a failure with its message.
    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.set_status(DataSourceState::Error, message.into());
    }

    fn set_status(&mut self, state: DataSourceState, message: String) {
        self.status.status = Some(state);
        self.status.detailed_message = message;
        self.status.last_time_updated = Some(Utc::now());
    }
}
