//! In-memory implementation of [`ResourceStore`].
//!
//! Holds PerfServer, PerfDataSource and Secret objects keyed by namespace
//! and name. Every successful update bumps the object's resource version and
//! the store-wide write counter.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ObjectMeta, PerfDataSource, PerfServer, ResourceKey, Secret};
use crate::domain::ports::ResourceStore;

/// One document of a manifest file, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Manifest {
    PerfServer(PerfServer),
    PerfDataSource(PerfDataSource),
    Secret(Secret),
}

#[derive(Default)]
struct Objects {
    servers: BTreeMap<ResourceKey, PerfServer>,
    data_sources: BTreeMap<ResourceKey, PerfDataSource>,
    secrets: BTreeMap<ResourceKey, Secret>,
}

/// Resource store backed by in-process maps, loaded from YAML manifests.
#[derive(Default)]
pub struct InMemoryResourceStore {
    objects: RwLock<Objects>,
    writes: AtomicUsize,
    reject_status_updates: AtomicBool,
}

impl InMemoryResourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all documents of a multi-document YAML manifest.
    pub async fn from_yaml_str(yaml: &str) -> DomainResult<Self> {
        let store = Self::new();
        for document in serde_yaml::Deserializer::from_str(yaml) {
            let value = serde_yaml::Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }
            let manifest: Manifest = serde_yaml::from_value(value)?;
            store.insert(manifest).await;
        }
        Ok(store)
    }

    /// Load a manifest file from disk.
    pub async fn from_yaml_file(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Store(format!("couldn't read {}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml).await
    }

    /// Serialize every object back to a multi-document YAML manifest.
    pub async fn to_yaml_string(&self) -> DomainResult<String> {
        let objects = self.objects.read().await;
        let manifests = objects
            .servers
            .values()
            .cloned()
            .map(Manifest::PerfServer)
            .chain(objects.data_sources.values().cloned().map(Manifest::PerfDataSource));

        let mut out = String::new();
        for manifest in manifests {
            out.push_str("---\n");
            out.push_str(&serde_yaml::to_string(&manifest)?);
        }
        Ok(out)
    }

    /// Add one manifest document.
    pub async fn insert(&self, manifest: Manifest) {
        match manifest {
            Manifest::PerfServer(server) => self.insert_perf_server(server).await,
            Manifest::PerfDataSource(ds) => self.insert_perf_data_source(ds).await,
            Manifest::Secret(secret) => self.insert_secret(secret).await,
        }
    }

    /// Add or replace a PerfServer without counting a write.
    pub async fn insert_perf_server(&self, mut server: PerfServer) {
        admit(&mut server.metadata);
        self.objects
            .write()
            .await
            .servers
            .insert(server.metadata.key(), server);
    }

    /// Add or replace a PerfDataSource without counting a write.
    pub async fn insert_perf_data_source(&self, mut data_source: PerfDataSource) {
        admit(&mut data_source.metadata);
        self.objects
            .write()
            .await
            .data_sources
            .insert(data_source.metadata.key(), data_source);
    }

    /// Add or replace a Secret.
    pub async fn insert_secret(&self, mut secret: Secret) {
        admit(&mut secret.metadata);
        self.objects
            .write()
            .await
            .secrets
            .insert(secret.metadata.key(), secret);
    }

    /// Keys of all stored PerfServers.
    pub async fn perf_server_keys(&self) -> Vec<ResourceKey> {
        self.objects.read().await.servers.keys().cloned().collect()
    }

    /// Keys of all stored PerfDataSources.
    pub async fn perf_data_source_keys(&self) -> Vec<ResourceKey> {
        self.objects.read().await.data_sources.keys().cloned().collect()
    }

    /// Number of successful update calls since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make status updates fail, as an API server without a status
    /// subresource would.
    pub fn reject_status_updates(&self, reject: bool) {
        self.reject_status_updates.store(reject, Ordering::SeqCst);
    }

    fn check_status_updates(&self, kind: &str, key: &ResourceKey) -> DomainResult<()> {
        if self.reject_status_updates.load(Ordering::SeqCst) {
            return Err(DomainError::Store(format!(
                "status subresource isn't available for {kind} {key}"
            )));
        }
        Ok(())
    }

    fn record_write(&self, meta: &mut ObjectMeta) {
        let version = meta
            .resource_version
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        meta.resource_version = Some((version + 1).to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn admit(meta: &mut ObjectMeta) {
    if meta.uid.is_none() {
        meta.uid = Some(Uuid::new_v4().to_string());
    }
    if meta.resource_version.is_none() {
        meta.resource_version = Some("1".to_string());
    }
}

fn not_found(kind: &str, key: &ResourceKey) -> DomainError {
    DomainError::Store(format!("{kind} {key} not found"))
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn get_perf_server(&self, key: &ResourceKey) -> DomainResult<Option<PerfServer>> {
        Ok(self.objects.read().await.servers.get(key).cloned())
    }

    async fn update_perf_server(&self, server: &PerfServer) -> DomainResult<()> {
        let key = server.metadata.key();
        let mut objects = self.objects.write().await;
        let stored = objects
            .servers
            .get_mut(&key)
            .ok_or_else(|| not_found("PerfServer", &key))?;
        *stored = server.clone();
        self.record_write(&mut stored.metadata);
        debug!(%key, "PerfServer updated");
        Ok(())
    }

    async fn update_perf_server_status(&self, server: &PerfServer) -> DomainResult<()> {
        let key = server.metadata.key();
        self.check_status_updates("PerfServer", &key)?;
        let mut objects = self.objects.write().await;
        let stored = objects
            .servers
            .get_mut(&key)
            .ok_or_else(|| not_found("PerfServer", &key))?;
        stored.status = server.status.clone();
        self.record_write(&mut stored.metadata);
        debug!(%key, "PerfServer status updated");
        Ok(())
    }

    async fn get_perf_data_source(
        &self,
        key: &ResourceKey,
    ) -> DomainResult<Option<PerfDataSource>> {
        Ok(self.objects.read().await.data_sources.get(key).cloned())
    }

    async fn update_perf_data_source(&self, data_source: &PerfDataSource) -> DomainResult<()> {
        let key = data_source.metadata.key();
        let mut objects = self.objects.write().await;
        let stored = objects
            .data_sources
            .get_mut(&key)
            .ok_or_else(|| not_found("PerfDataSource", &key))?;
        *stored = data_source.clone();
        self.record_write(&mut stored.metadata);
        debug!(%key, "PerfDataSource updated");
        Ok(())
    }

    async fn update_perf_data_source_status(
        &self,
        data_source: &PerfDataSource,
    ) -> DomainResult<()> {
        let key = data_source.metadata.key();
        self.check_status_updates("PerfDataSource", &key)?;
        let mut objects = self.objects.write().await;
        let stored = objects
            .data_sources
            .get_mut(&key)
            .ok_or_else(|| not_found("PerfDataSource", &key))?;
        stored.status = data_source.status.clone();
        self.record_write(&mut stored.metadata);
        debug!(%key, "PerfDataSource status updated");
        Ok(())
    }

    async fn get_secret(&self, key: &ResourceKey) -> DomainResult<Option<Secret>> {
        Ok(self.objects.read().await.secrets.get(key).cloned())
    }
}
