//! Entry point invoked by the reconciliation driver for a changed resource.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::{Config, CredentialsConfig, ResourceKey};
use crate::domain::ports::{PerfClientProvider, ResourceStore};

use super::chain::{data_source_chain, server_chain};

/// What the driver should do after a successful reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "after_secs")]
pub enum ReconcileAction {
    /// Converged; wait for the next change notification.
    Done,
    /// Check again after the given delay.
    #[serde(serialize_with = "serialize_secs")]
    RequeueAfter(Duration),
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}

/// Runs the step chains for PerfServer and PerfDataSource resources.
///
/// Assumes at most one concurrent call per resource identity; calls for
/// distinct resources may run concurrently.
pub struct Reconciler {
    store: Arc<dyn ResourceStore>,
    provider: Arc<dyn PerfClientProvider>,
    credentials: CredentialsConfig,
    unavailable_requeue: Duration,
}

impl Reconciler {
    /// Wire the reconciler from the store, the PERF client provider and config.
    pub fn new(
        store: Arc<dyn ResourceStore>,
        provider: Arc<dyn PerfClientProvider>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            provider,
            credentials: config.credentials.clone(),
            unavailable_requeue: Duration::from_secs(config.reconcile.unavailable_requeue_secs),
        }
    }

    /// Link and converge one PerfDataSource, or requeue while its server is unavailable.
    #[instrument(skip(self), fields(namespace = %key.namespace, name = %key.name))]
    pub async fn reconcile_data_source(&self, key: &ResourceKey) -> DomainResult<ReconcileAction> {
        debug!("Reconciling PerfDataSource");

        let Some(mut data_source) = self.store.get_perf_data_source(key).await? else {
            debug!("PerfDataSource no longer exists");
            return Ok(ReconcileAction::Done);
        };

        let server = self
            .store
            .require_perf_server(&ResourceKey::new(
                &key.namespace,
                &data_source.spec.perf_server_name,
            ))
            .await?;

        if !server.status.available {
            info!(server = %server.name(), "PERF instance is unavailable, skip creating/updating data source");
            return Ok(ReconcileAction::RequeueAfter(self.unavailable_requeue));
        }

        data_source_chain(
            self.store.clone(),
            self.provider.clone(),
            self.credentials.clone(),
        )
            .run(&mut data_source)
            .await?;

        info!("Reconciling PerfDataSource has been finished");
        Ok(ReconcileAction::Done)
    }

    /// Probe one PerfServer and record its availability.
    #[instrument(skip(self), fields(namespace = %key.namespace, name = %key.name))]
    pub async fn reconcile_server(&self, key: &ResourceKey) -> DomainResult<ReconcileAction> {
        debug!("Reconciling PerfServer");

        let Some(mut server) = self.store.get_perf_server(key).await? else {
            debug!("PerfServer no longer exists");
            return Ok(ReconcileAction::Done);
        };

        server_chain(self.store.clone(), self.provider.clone())
            .run(&mut server)
            .await?;

        info!("Reconciling PerfServer has been finished");
        Ok(ReconcileAction::Done)
    }
}
