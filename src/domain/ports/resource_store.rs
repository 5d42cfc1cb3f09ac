use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Credentials, PerfDataSource, PerfServer, ResourceKey, Secret,
};

/// Object store port for PERF resources and secrets.
///
/// Lookups return `Ok(None)` when the object does not exist. Status updates
/// write only the status part of the object; plain updates write the whole
/// object (metadata, spec and status).
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get_perf_server(&self, key: &ResourceKey) -> DomainResult<Option<PerfServer>>;

    async fn update_perf_server(&self, server: &PerfServer) -> DomainResult<()>;

    async fn update_perf_server_status(&self, server: &PerfServer) -> DomainResult<()>;

    async fn get_perf_data_source(&self, key: &ResourceKey)
        -> DomainResult<Option<PerfDataSource>>;

    async fn update_perf_data_source(&self, data_source: &PerfDataSource) -> DomainResult<()>;

    async fn update_perf_data_source_status(
        &self,
        data_source: &PerfDataSource,
    ) -> DomainResult<()>;

    async fn get_secret(&self, key: &ResourceKey) -> DomainResult<Option<Secret>>;

    /// Fetch a server that must exist.
    async fn require_perf_server(&self, key: &ResourceKey) -> DomainResult<PerfServer> {
        self.get_perf_server(key)
            .await?
            .ok_or_else(|| DomainError::PerfServerNotFound {
                namespace: key.namespace.clone(),
                name: key.name.clone(),
            })
    }

    /// Resolve `username`/`password` from a secret that must exist.
    async fn credentials(&self, key: &ResourceKey) -> DomainResult<Credentials> {
        let secret = self
            .get_secret(key)
            .await?
            .ok_or_else(|| DomainError::SecretNotFound {
                namespace: key.namespace.clone(),
                name: key.name.clone(),
            })?;
        Credentials::from_secret(&secret)
    }
}
