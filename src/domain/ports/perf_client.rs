use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    DataSourceCommand, DataSourceKind, PerfProject, PerfServer, RemoteDataSource,
};

/// Gateway port over the PERF data-source API.
///
/// Absence is reported as `Ok(None)`, never as an error. Non-2xx responses
/// and transport failures are errors carrying the acting entity's name.
/// Implementations never retry; retry belongs to the reconciliation driver.
#[async_trait]
pub trait PerfClient: Send + Sync {
    /// Lightweight reachability probe
    async fn connected(&self) -> DomainResult<bool>;

    /// Look up a project by name (PERF upper-cases project names)
    async fn get_project(&self, name: &str) -> DomainResult<Option<PerfProject>>;

    /// Check whether a project name is taken
    async fn project_exists(&self, name: &str) -> DomainResult<bool>;

    /// Find the data source of the given kind under a project
    async fn get_project_data_source(
        &self,
        project_name: &str,
        kind: DataSourceKind,
    ) -> DomainResult<Option<RemoteDataSource>>;

    /// Create a data source under a project
    async fn create_data_source(
        &self,
        project_name: &str,
        command: &DataSourceCommand,
    ) -> DomainResult<()>;

    /// Update a data source addressed by `command.id`
    async fn update_data_source(&self, command: &DataSourceCommand) -> DomainResult<()>;

    /// Activate a data source
    async fn activate_data_source(&self, project_name: &str, data_source_id: i64)
        -> DomainResult<()>;
}

/// Builds an authenticated [`PerfClient`] for a server resource.
#[async_trait]
pub trait PerfClientProvider: Send + Sync {
    async fn client_for(&self, server: &PerfServer) -> DomainResult<Arc<dyn PerfClient>>;
}
