//! Links a PerfDataSource to its owning PerfServer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    OwnerReference, PerfDataSource, PerfServer, ResourceKey, PERF_API_VERSION, PERF_SERVER_KIND,
};
use crate::domain::ports::ResourceStore;

use super::chain::Step;

/// Attaches a `PerfServer` owner reference exactly once.
///
/// An existing owner reference of the server kind is never overwritten.
pub struct PutOwnerReference {
    store: Arc<dyn ResourceStore>,
}

impl PutOwnerReference {
    /// Create the step.
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    fn controller_reference(server: &PerfServer) -> OwnerReference {
        OwnerReference {
            api_version: PERF_API_VERSION.to_string(),
            kind: PERF_SERVER_KIND.to_string(),
            name: server.name().to_string(),
            uid: server.metadata.uid.clone(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }
    }
}

#[async_trait]
impl Step<PerfDataSource> for PutOwnerReference {
    fn name(&self) -> &'static str {
        "put_owner_reference"
    }

    #[instrument(skip(self, data_source), fields(name = %data_source.name(), namespace = %data_source.namespace()))]
    async fn serve(&self, data_source: &mut PerfDataSource) -> DomainResult<()> {
        if let Some(owner) = data_source.metadata.owner_reference(PERF_SERVER_KIND) {
            info!(owner = %owner.name, "PerfDataSource already has owner ref");
            return Ok(());
        }

        let key = ResourceKey::new(data_source.namespace(), &data_source.spec.perf_server_name);
        let server = self.store.require_perf_server(&key).await?;

        let mut updated = data_source.clone();
        updated
            .metadata
            .owner_references
            .push(Self::controller_reference(&server));
        self.store.update_perf_data_source(&updated).await?;

        *data_source = updated;
        info!(owner = %server.name(), "owner ref for perf data source has been added");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryResourceStore;
    use crate::domain::errors::DomainError;
    use crate::domain::models::{
        DataSourceSpecConfig, ObjectMeta, PerfDataSourceSpec, PerfServerSpec,
    };

    fn data_source(owners: Vec<OwnerReference>) -> PerfDataSource {
        let mut metadata = ObjectMeta::new("fake-namespace", "fake-ds");
        metadata.owner_references = owners;
        PerfDataSource {
            metadata,
            spec: PerfDataSourceSpec {
                perf_server_name: "fake-name".to_string(),
                name: "ds".to_string(),
                config: DataSourceSpecConfig::Sonar {
                    project_keys: vec!["key".to_string()],
                    url: "http://sonar".to_string(),
                },
            },
            status: Default::default(),
        }
    }

    fn server() -> PerfServer {
        PerfServer {
            metadata: ObjectMeta::new("fake-namespace", "fake-name"),
            spec: PerfServerSpec::default(),
            status: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_sets_owner_reference() {
        let store = Arc::new(InMemoryResourceStore::new());
        store.insert_perf_server(server()).await;
        let mut ds = data_source(vec![]);
        store.insert_perf_data_source(ds.clone()).await;

        let step = PutOwnerReference::new(store.clone());
        step.serve(&mut ds).await.unwrap();

        let owner = ds.metadata.owner_reference(PERF_SERVER_KIND).unwrap();
        assert_eq!(owner.name, "fake-name");
        assert_eq!(owner.controller, Some(true));

        let stored = store
            .get_perf_data_source(&ds.metadata.key())
            .await
            .unwrap()
            .unwrap();
        assert!(stored.metadata.owner_reference(PERF_SERVER_KIND).is_some());
    }

    #[tokio::test]
    async fn test_second_run_performs_no_writes() {
        let store = Arc::new(InMemoryResourceStore::new());
        store.insert_perf_server(server()).await;
        let mut ds = data_source(vec![]);
        store.insert_perf_data_source(ds.clone()).await;

        let step = PutOwnerReference::new(store.clone());
        step.serve(&mut ds).await.unwrap();
        let writes = store.write_count();

        step.serve(&mut ds).await.unwrap();
        assert_eq!(store.write_count(), writes);
        assert_eq!(ds.metadata.owner_references.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_server_owner_is_kept() {
        let store = Arc::new(InMemoryResourceStore::new());
        let existing = OwnerReference {
            api_version: PERF_API_VERSION.to_string(),
            kind: PERF_SERVER_KIND.to_string(),
            name: "other-perf".to_string(),
            uid: None,
            controller: Some(true),
            block_owner_deletion: None,
        };
        let mut ds = data_source(vec![existing.clone()]);

        PutOwnerReference::new(store.clone()).serve(&mut ds).await.unwrap();

        assert_eq!(ds.metadata.owner_references, vec![existing]);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_server_fails_without_mutation() {
        let store = Arc::new(InMemoryResourceStore::new());
        let mut ds = data_source(vec![]);
        store.insert_perf_data_source(ds.clone()).await;
        let before = ds.clone();

        let err = PutOwnerReference::new(store.clone())
            .serve(&mut ds)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::PerfServerNotFound { ref name, .. } if name == "fake-name"));
        assert_eq!(ds, before);
        assert_eq!(store.write_count(), 0);
    }
}
