//! Mock PERF client for testing
//!
//! Keeps projects and data sources in memory, applies create/update/activate
//! to that state the way PERF would, and records every call.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    DataSourceCommand, DataSourceKind, PerfProject, PerfServer, RemoteDataSource,
};
use crate::domain::ports::{PerfClient, PerfClientProvider};

/// Gateway operation, used to select calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerfOperation {
    Connected,
    GetProject,
    ProjectExists,
    GetProjectDataSource,
    CreateDataSource,
    UpdateDataSource,
    ActivateDataSource,
}

/// A recorded gateway call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerfCall {
    Connected,
    GetProject(String),
    ProjectExists(String),
    GetProjectDataSource(String, DataSourceKind),
    CreateDataSource(String, DataSourceCommand),
    UpdateDataSource(DataSourceCommand),
    ActivateDataSource(String, i64),
}

impl PerfCall {
    /// Operation this call belongs to.
    pub const fn operation(&self) -> PerfOperation {
        match self {
            Self::Connected => PerfOperation::Connected,
            Self::GetProject(_) => PerfOperation::GetProject,
            Self::ProjectExists(_) => PerfOperation::ProjectExists,
            Self::GetProjectDataSource(..) => PerfOperation::GetProjectDataSource,
            Self::CreateDataSource(..) => PerfOperation::CreateDataSource,
            Self::UpdateDataSource(_) => PerfOperation::UpdateDataSource,
            Self::ActivateDataSource(..) => PerfOperation::ActivateDataSource,
        }
    }
}

struct MockState {
    connected: bool,
    projects: Vec<PerfProject>,
    data_sources: HashMap<String, Vec<RemoteDataSource>>,
    failures: HashMap<PerfOperation, String>,
    calls: Vec<PerfCall>,
    next_id: i64,
}

/// Mock PERF client implementation for testing
pub struct MockPerfClient {
    state: Mutex<MockState>,
}

impl Default for MockPerfClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPerfClient {
    /// Reachable PERF with no projects.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                connected: true,
                projects: Vec::new(),
                data_sources: HashMap::new(),
                failures: HashMap::new(),
                calls: Vec::new(),
                next_id: 100,
            }),
        }
    }

    /// Add a project.
    pub fn with_project(self, name: &str, id: i64) -> Self {
        self.lock().projects.push(PerfProject {
            id,
            name: name.to_uppercase(),
        });
        self
    }

    /// Add a data source to an existing project.
    pub fn with_data_source(self, project_name: &str, data_source: RemoteDataSource) -> Self {
        self.lock()
            .data_sources
            .entry(project_name.to_uppercase())
            .or_default()
            .push(data_source);
        self
    }

    /// Set the result of the connectivity probe.
    pub fn with_connected(self, connected: bool) -> Self {
        self.lock().connected = connected;
        self
    }

    /// Make every call of `operation` fail with `message`.
    pub fn failing(self, operation: PerfOperation, message: &str) -> Self {
        self.lock().failures.insert(operation, message.to_string());
        self
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<PerfCall> {
        self.lock().calls.clone()
    }

    /// Recorded calls of one operation.
    pub fn calls_of(&self, operation: PerfOperation) -> Vec<PerfCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .cloned()
            .collect()
    }

    /// Number of recorded calls of one operation.
    pub fn count(&self, operation: PerfOperation) -> usize {
        self.calls_of(operation).len()
    }

    /// Current remote state of the data source of `kind` under a project.
    pub fn data_source(&self, project_name: &str, kind: DataSourceKind) -> Option<RemoteDataSource> {
        self.lock()
            .data_sources
            .get(&project_name.to_uppercase())
            .and_then(|list| list.iter().find(|ds| ds.kind() == Some(kind)).cloned())
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Record the call and return the injected failure, if any.
    fn enter(&self, call: PerfCall) -> DomainResult<MutexGuard<'_, MockState>> {
        let operation = call.operation();
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(message) = state.failures.get(&operation) {
            return Err(DomainError::Transport {
                action: "call".to_string(),
                entity: format!("{operation:?}"),
                message: message.clone(),
            });
        }
        Ok(state)
    }
}

fn project_known(state: &MockState, name: &str) -> bool {
    state.projects.iter().any(|p| p.name == name.to_uppercase())
}

fn command_config(command: &DataSourceCommand) -> serde_json::Map<String, serde_json::Value> {
    match serde_json::to_value(&command.config) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

#[async_trait]
impl PerfClient for MockPerfClient {
    async fn connected(&self) -> DomainResult<bool> {
        let state = self.enter(PerfCall::Connected)?;
        Ok(state.connected)
    }

    async fn get_project(&self, name: &str) -> DomainResult<Option<PerfProject>> {
        let state = self.enter(PerfCall::GetProject(name.to_string()))?;
        Ok(state
            .projects
            .iter()
            .find(|p| p.name == name.to_uppercase())
            .cloned())
    }

    async fn project_exists(&self, name: &str) -> DomainResult<bool> {
        let state = self.enter(PerfCall::ProjectExists(name.to_string()))?;
        Ok(project_known(&state, name))
    }

    async fn get_project_data_source(
        &self,
        project_name: &str,
        kind: DataSourceKind,
    ) -> DomainResult<Option<RemoteDataSource>> {
        let state = self.enter(PerfCall::GetProjectDataSource(project_name.to_string(), kind))?;
        if !project_known(&state, project_name) {
            return Err(DomainError::ProjectNotFound(project_name.to_string()));
        }
        Ok(state
            .data_sources
            .get(&project_name.to_uppercase())
            .and_then(|list| list.iter().find(|ds| ds.kind() == Some(kind)).cloned()))
    }

    async fn create_data_source(
        &self,
        project_name: &str,
        command: &DataSourceCommand,
    ) -> DomainResult<()> {
        let mut state = self.enter(PerfCall::CreateDataSource(
            project_name.to_string(),
            command.clone(),
        ))?;
        if !project_known(&state, project_name) {
            return Err(DomainError::ProjectNotFound(project_name.to_string()));
        }
        let id = state.next_id;
        state.next_id += 1;
        state
            .data_sources
            .entry(project_name.to_uppercase())
            .or_default()
            .push(RemoteDataSource {
                id,
                name: command.name.to_uppercase(),
                data_source_type: command.kind.remote_type().to_string(),
                active: true,
                config: command_config(command),
            });
        Ok(())
    }

    async fn update_data_source(&self, command: &DataSourceCommand) -> DomainResult<()> {
        let mut state = self.enter(PerfCall::UpdateDataSource(command.clone()))?;
        let target = state
            .data_sources
            .values_mut()
            .flatten()
            .find(|ds| ds.id == command.id)
            .ok_or_else(|| DomainError::RemoteStatus {
                action: "update".to_string(),
                entity: format!("{} datasource", command.name),
                status: 404,
            })?;
        target.config = command_config(command);
        Ok(())
    }

    async fn activate_data_source(&self, project_name: &str, data_source_id: i64) -> DomainResult<()> {
        let mut state = self.enter(PerfCall::ActivateDataSource(
            project_name.to_string(),
            data_source_id,
        ))?;
        let target = state
            .data_sources
            .values_mut()
            .flatten()
            .find(|ds| ds.id == data_source_id)
            .ok_or_else(|| DomainError::RemoteStatus {
                action: "activate".to_string(),
                entity: format!("{data_source_id} datasource under {project_name} project"),
                status: 404,
            })?;
        target.active = true;
        Ok(())
    }
}

/// Hands out the same client for every server, or fails like a rejected login.
pub struct StaticPerfClientProvider {
    client: Option<Arc<dyn PerfClient>>,
    failure: Option<String>,
    requested: Mutex<HashSet<String>>,
}

impl StaticPerfClientProvider {
    /// Always hand out `client`.
    pub fn new(client: Arc<dyn PerfClient>) -> Self {
        Self {
            client: Some(client),
            failure: None,
            requested: Mutex::new(HashSet::new()),
        }
    }

    /// Fail every request with a 401 naming `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            client: None,
            failure: Some(message.to_string()),
            requested: Mutex::new(HashSet::new()),
        }
    }

    /// Names of the servers a client was requested for.
    pub fn requested_servers(&self) -> HashSet<String> {
        self.requested
            .lock()
            .map(|set| set.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PerfClientProvider for StaticPerfClientProvider {
    async fn client_for(&self, server: &PerfServer) -> DomainResult<Arc<dyn PerfClient>> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.insert(server.name().to_string());
        }
        match (&self.client, &self.failure) {
            (Some(client), None) => Ok(client.clone()),
            (_, failure) => Err(DomainError::RemoteStatus {
                action: "get".to_string(),
                entity: failure
                    .clone()
                    .unwrap_or_else(|| "PERF token".to_string()),
                status: 401,
            }),
        }
    }
}
