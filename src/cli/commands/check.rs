//! Check CLI command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::memory::InMemoryResourceStore;
use crate::adapters::perf::RestPerfClientProvider;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, PerfServer, ResourceKey};
use crate::domain::ports::ResourceStore;
use crate::services::Reconciler;

/// Arguments for `check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Multi-document YAML with PerfServer and Secret objects
    #[arg(short, long)]
    pub manifests: PathBuf,

    /// PerfServer name
    #[arg(short, long)]
    pub server: String,

    /// PerfServer namespace
    #[arg(short, long, default_value = "default")]
    pub namespace: String,
}

/// Status of one PerfServer after probing.
#[derive(Debug, Serialize)]
pub struct ServerStatusOutput {
    pub namespace: String,
    pub name: String,
    pub root_url: String,
    pub available: bool,
    pub detailed_message: String,
    pub last_time_updated: Option<String>,
}

impl From<&PerfServer> for ServerStatusOutput {
    fn from(server: &PerfServer) -> Self {
        Self {
            namespace: server.namespace().to_string(),
            name: server.name().to_string(),
            root_url: server.spec.root_url.clone(),
            available: server.status.available,
            detailed_message: server.status.detailed_message.clone(),
            last_time_updated: server.status.last_time_updated.map(|t| t.to_rfc3339()),
        }
    }
}

impl CommandOutput for ServerStatusOutput {
    fn to_human(&self) -> String {
        let state = if self.available { "available" } else { "unavailable" };
        let mut lines = vec![
            format!("PerfServer {}/{} is {state}", self.namespace, self.name),
            format!("  URL:     {}", self.root_url),
            format!("  Message: {}", self.detailed_message),
        ];
        if let Some(updated) = &self.last_time_updated {
            lines.push(format!("  Updated: {updated}"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Probe one server and print its status.
pub async fn execute(args: CheckArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = Arc::new(
        InMemoryResourceStore::from_yaml_file(&args.manifests)
            .await
            .with_context(|| format!("Failed to load manifests from {}", args.manifests.display()))?,
    );
    let key = ResourceKey::new(&args.namespace, &args.server);
    store.require_perf_server(&key).await?;

    let provider = Arc::new(RestPerfClientProvider::new(store.clone(), &config.perf));
    let reconciler = Reconciler::new(store.clone(), provider, config);

    // A failed probe is already recorded in the status.
    let probe = reconciler.reconcile_server(&key).await;

    let server = store.require_perf_server(&key).await?;
    output(&ServerStatusOutput::from(&server), json_mode);

    probe.map(|_| ()).context("PERF connectivity check failed")
}
