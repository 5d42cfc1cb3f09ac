//! Converges a PerfDataSource against PERF.
//!
//! Every call recomputes the plan from the current remote state and the
//! desired spec: lookup, diff, create or update, activate when the remote
//! data source was inactive, then record the outcome on the resource.
//! Any failure, including building the PERF client for the owning server,
//! is written to the resource status as `error` and returned.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    CredentialsConfig, PerfDataSource, ResourceKey, PERF_SERVER_KIND,
};
use crate::domain::ports::{PerfClientProvider, ResourceStore};

use super::chain::Step;
use super::command_builder::{plan, DataSourcePlan};

/// Creates, extends or activates the remote data source of a PerfDataSource.
pub struct PutDataSource {
    store: Arc<dyn ResourceStore>,
    provider: Arc<dyn PerfClientProvider>,
    credentials: CredentialsConfig,
}

impl PutDataSource {
    /// Create the step; `credentials` names the secret used per data-source kind.
    pub fn new(
        store: Arc<dyn ResourceStore>,
        provider: Arc<dyn PerfClientProvider>,
        credentials: CredentialsConfig,
    ) -> Self {
        Self {
            store,
            provider,
            credentials,
        }
    }

    async fn try_to_put_data_source(&self, data_source: &PerfDataSource) -> DomainResult<()> {
        let owner = data_source
            .metadata
            .owner_reference(PERF_SERVER_KIND)
            .ok_or_else(|| DomainError::OwnerReferenceMissing(data_source.name().to_string()))?;
        let server = self
            .store
            .require_perf_server(&ResourceKey::new(data_source.namespace(), &owner.name))
            .await?;
        let client = self.provider.client_for(&server).await?;

        let project = server.spec.project_name.as_str();
        if client.get_project(project).await?.is_none() {
            return Err(DomainError::ProjectNotFound(project.to_string()));
        }

        let kind = data_source.spec.kind();
        let credentials = self
            .store
            .credentials(&ResourceKey::new(
                data_source.namespace(),
                self.credentials.secret_for(kind),
            ))
            .await?;

        let remote = client.get_project_data_source(project, kind).await?;

        match plan(&data_source.spec, remote.as_ref(), &credentials) {
            DataSourcePlan::Create(command) => {
                info!(project, %kind, "data source doesn't exist in PERF, creating");
                client.create_data_source(project, &command).await?;
            }
            DataSourcePlan::Update(command) => {
                info!(project, %kind, id = command.id, "updating data source with new identifiers");
                client.update_data_source(&command).await?;
            }
            DataSourcePlan::Unchanged => {
                info!(project, %kind, "data source already contains all identifiers, skipping update");
            }
        }

        if let Some(remote) = remote.filter(|r| !r.active) {
            info!(project, id = remote.id, "activating data source");
            client.activate_data_source(project, remote.id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Step<PerfDataSource> for PutDataSource {
    fn name(&self) -> &'static str {
        "put_data_source"
    }

    #[instrument(skip(self, data_source), fields(name = %data_source.name(), namespace = %data_source.namespace()))]
    async fn serve(&self, data_source: &mut PerfDataSource) -> DomainResult<()> {
        info!("start creating/updating data source in PERF");

        if let Err(err) = self.try_to_put_data_source(data_source).await {
            data_source.mark_error(err.to_string());
            if let Err(status_err) = self.store.update_perf_data_source_status(data_source).await {
                warn!(error = %status_err, "couldn't record error status on PerfDataSource");
            }
            return Err(err);
        }

        data_source.mark_created();
        self.store.update_perf_data_source_status(data_source).await?;
        info!("data source has been put into PERF");
        Ok(())
    }
}
