//! PerfServer resource: a PERF endpoint and its credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;

/// Message recorded when the connectivity probe succeeds.
pub const CONNECTED_MESSAGE: &str = "connected";

/// Connection settings of a PERF instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfServerSpec {
    pub root_url: String,
    pub api_url: String,
    /// Secret holding `username` and `password` for the PERF API.
    pub credential_name: String,
    /// PERF project (node) that owns the data sources of this server.
    pub project_name: String,
}

/// Observed state of a PerfServer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfServerStatus {
    #[serde(default)]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_time_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub detailed_message: String,
}

/// A PERF instance and the credentials to reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfServer {
    pub metadata: ObjectMeta,
    pub spec: PerfServerSpec,
    #[serde(default)]
    pub status: PerfServerStatus,
}

impl PerfServer {
    /// Resource name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Resource namespace.
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Record the outcome of a connectivity probe.
    pub fn set_availability(&mut self, available: bool, message: impl Into<String>) {
        self.status.available = available;
        self.status.detailed_message = message.into();
        self.status.last_time_updated = Some(Utc::now());
    }
}
