use serde::{Deserialize, Serialize};

use super::command::DataSourceKind;

/// Main configuration structure for the PERF operator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// PERF API client configuration
    #[serde(default)]
    pub perf: PerfApiConfig,

    /// Reconciliation driver configuration
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Secret names holding data-source credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// PERF API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PerfApiConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for PerfApiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Reconciliation driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconcileConfig {
    /// Delay before re-checking a data source whose server is unavailable
    #[serde(default = "default_unavailable_requeue_secs")]
    pub unavailable_requeue_secs: u64,

    /// Maximum number of resources reconciled concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,
}

const fn default_unavailable_requeue_secs() -> u64 {
    60
}

const fn default_workers() -> usize {
    4
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            unavailable_requeue_secs: default_unavailable_requeue_secs(),
            workers: default_workers(),
        }
    }
}

/// Names of the secrets (in the data source's namespace) holding the
/// credentials PERF uses to read each kind of data source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CredentialsConfig {
    #[serde(default = "default_sonar_secret")]
    pub sonar_secret: String,

    #[serde(default = "default_jenkins_secret")]
    pub jenkins_secret: String,

    #[serde(default = "default_gitlab_secret")]
    pub gitlab_secret: String,
}

fn default_sonar_secret() -> String {
    "sonar-admin-password".to_string()
}

fn default_jenkins_secret() -> String {
    "jenkins-admin-token".to_string()
}

fn default_gitlab_secret() -> String {
    "gitlab-admin-token".to_string()
}

impl CredentialsConfig {
    /// Secret name holding credentials for `kind`.
    pub fn secret_for(&self, kind: DataSourceKind) -> &str {
        match kind {
            DataSourceKind::Sonar => &self.sonar_secret,
            DataSourceKind::Jenkins => &self.jenkins_secret,
            DataSourceKind::GitLab => &self.gitlab_secret,
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            sonar_secret: default_sonar_secret(),
            jenkins_secret: default_jenkins_secret(),
            gitlab_secret: default_gitlab_secret(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation of log files: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
