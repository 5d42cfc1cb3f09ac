//! Reconcile CLI command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::memory::InMemoryResourceStore;
use crate::adapters::perf::RestPerfClientProvider;
use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::errors::DomainResult;
use crate::domain::models::{Config, ResourceKey, PERF_DATA_SOURCE_KIND, PERF_SERVER_KIND};
use crate::services::{ReconcileAction, Reconciler};

/// Arguments for `reconcile`.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Multi-document YAML with PerfServer, PerfDataSource and Secret objects
    #[arg(short, long)]
    pub manifests: PathBuf,

    /// Write the reconciled resources to this file
    #[arg(short, long)]
    pub write: Option<PathBuf>,
}

/// Result of one reconciliation call
#[derive(Debug, Clone, Serialize)]
pub struct ResourceOutcome {
    pub kind: &'static str,
    pub namespace: String,
    pub name: String,
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requeue_after_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResourceOutcome {
    fn new(kind: &'static str, key: ResourceKey, result: DomainResult<ReconcileAction>) -> Self {
        let (result, requeue_after_secs, error) = match result {
            Ok(ReconcileAction::Done) => ("done", None, None),
            Ok(ReconcileAction::RequeueAfter(after)) => ("requeue", Some(after.as_secs()), None),
            Err(err) => ("error", None, Some(err.to_string())),
        };
        Self {
            kind,
            namespace: key.namespace,
            name: key.name,
            result,
            requeue_after_secs,
            error,
        }
    }

    /// Whether the resource ended in error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Summary of a reconcile run.
#[derive(Debug, Serialize)]
pub struct ReconcileOutput {
    pub outcomes: Vec<ResourceOutcome>,
    pub failed: usize,
}

impl ReconcileOutput {
    /// Summarize `outcomes`, counting failures.
    pub fn new(outcomes: Vec<ResourceOutcome>) -> Self {
        let failed = outcomes.iter().filter(|o| o.is_error()).count();
        Self { outcomes, failed }
    }
}

impl CommandOutput for ReconcileOutput {
    fn to_human(&self) -> String {
        if self.outcomes.is_empty() {
            return "No resources found.".to_string();
        }

        let mut table = list_table(&["kind", "namespace", "name", "result", "details"]);
        for outcome in &self.outcomes {
            let details = match (&outcome.error, outcome.requeue_after_secs) {
                (Some(err), _) => truncate(err, 80),
                (None, Some(secs)) => format!("retry in {secs}s"),
                (None, None) => String::new(),
            };
            table.add_row(vec![
                outcome.kind.to_string(),
                outcome.namespace.clone(),
                outcome.name.clone(),
                outcome.result.to_string(),
                details,
            ]);
        }

        format!(
            "Reconciled {} resource(s), {} failed:\n{table}",
            self.outcomes.len(),
            self.failed
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Reconcile servers first, then data sources, so that data sources see
/// fresh server availability. Up to `workers` distinct resources are in
/// flight at once; each resource is reconciled exactly once.
pub async fn reconcile_all(
    reconciler: &Reconciler,
    servers: Vec<ResourceKey>,
    data_sources: Vec<ResourceKey>,
    workers: usize,
) -> Vec<ResourceOutcome> {
    let workers = workers.max(1);

    let mut outcomes: Vec<ResourceOutcome> = stream::iter(servers)
        .map(|key| async move {
            let result = reconciler.reconcile_server(&key).await;
            ResourceOutcome::new(PERF_SERVER_KIND, key, result)
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    let data_source_outcomes: Vec<ResourceOutcome> = stream::iter(data_sources)
        .map(|key| async move {
            let result = reconciler.reconcile_data_source(&key).await;
            ResourceOutcome::new(PERF_DATA_SOURCE_KIND, key, result)
        })
        .buffer_unordered(workers)
        .collect()
        .await;
    outcomes.extend(data_source_outcomes);

    outcomes.sort_by(|a, b| {
        (a.kind, &a.namespace, &a.name).cmp(&(b.kind, &b.namespace, &b.name))
    });
    outcomes
}

/// Reconcile every resource in the manifests.
pub async fn execute(args: ReconcileArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = Arc::new(
        InMemoryResourceStore::from_yaml_file(&args.manifests)
            .await
            .with_context(|| format!("Failed to load manifests from {}", args.manifests.display()))?,
    );
    let provider = Arc::new(RestPerfClientProvider::new(store.clone(), &config.perf));
    let reconciler = Reconciler::new(store.clone(), provider, config);

    let servers = store.perf_server_keys().await;
    let data_sources = store.perf_data_source_keys().await;
    info!(
        servers = servers.len(),
        data_sources = data_sources.len(),
        "starting reconciliation"
    );

    let outcomes = reconcile_all(&reconciler, servers, data_sources, config.reconcile.workers).await;
    let result = ReconcileOutput::new(outcomes);

    if let Some(path) = &args.write {
        let snapshot = store.to_yaml_string().await?;
        tokio::fs::write(path, snapshot)
            .await
            .with_context(|| format!("Failed to write resources to {}", path.display()))?;
        info!(path = %path.display(), "reconciled resources written");
    }

    output(&result, json_mode);

    if result.failed > 0 {
        warn!(failed = result.failed, "some resources failed to reconcile");
        anyhow::bail!("{} resource(s) failed to reconcile", result.failed);
    }
    Ok(())
}
