//! Write-intent payloads sent to the PERF data-source API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a PERF data source.
///
/// Serialized with the upper-case type name the PERF API uses; the
/// lower-case and capitalized spellings are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSourceKind {
    #[serde(rename = "SONAR", alias = "sonar", alias = "Sonar")]
    Sonar,
    #[serde(rename = "JENKINS", alias = "jenkins", alias = "Jenkins")]
    Jenkins,
    #[serde(rename = "GITLAB", alias = "gitlab", alias = "GitLab", alias = "Gitlab")]
    GitLab,
}

impl DataSourceKind {
    /// Every supported kind.
    pub const ALL: [Self; 3] = [Self::Sonar, Self::Jenkins, Self::GitLab];

    /// Type name as reported by the PERF API.
    pub const fn remote_type(self) -> &'static str {
        match self {
            Self::Sonar => "SONAR",
            Self::Jenkins => "JENKINS",
            Self::GitLab => "GITLAB",
        }
    }

    /// Name of the config field that holds this kind's identifier list.
    pub const fn identifier_field(self) -> &'static str {
        match self {
            Self::Sonar => "projectKeys",
            Self::Jenkins => "jobNames",
            Self::GitLab => "repositories",
        }
    }

    /// Parse a remote type name, ignoring case.
    pub fn from_remote_type(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.remote_type().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.remote_type())
    }
}

/// Type-specific configuration carried by a [`DataSourceCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DataSourceConfig {
    #[serde(rename_all = "camelCase")]
    Sonar {
        project_keys: Vec<String>,
        url: String,
        username: String,
        password: String,
    },
    #[serde(rename_all = "camelCase")]
    Jenkins {
        job_names: Vec<String>,
        url: String,
        username: String,
        password: String,
    },
    #[serde(rename_all = "camelCase")]
    GitLab {
        repositories: Vec<String>,
        branches: Vec<String>,
        url: String,
        username: String,
        password: String,
    },
}

impl DataSourceConfig {
    /// Kind of this payload.
    pub const fn kind(&self) -> DataSourceKind {
        match self {
            Self::Sonar { .. } => DataSourceKind::Sonar,
            Self::Jenkins { .. } => DataSourceKind::Jenkins,
            Self::GitLab { .. } => DataSourceKind::GitLab,
        }
    }

    /// The identifier list (project keys, job names or repositories).
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

/// Create/update request for a PERF data source.
///
/// `id` is zero when the command creates a new data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceCommand {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataSourceKind,
    pub config: DataSourceConfig,
}

impl DataSourceCommand {
    /// A command without a remote id creates.
    pub const fn is_create(&self) -> bool {
        self.id == 0
    }
}
