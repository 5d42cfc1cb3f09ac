//! PERF REST client.
//!
//! Acquires a bearer token with a form-encoded login on construction, then
//! talks JSON to the `/api/v2` endpoints. Every non-2xx response becomes a
//! [`DomainError::RemoteStatus`] naming the entity involved; network errors
//! become [`DomainError::Transport`]. Nothing is retried here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Credentials, DataSourceCommand, DataSourceKind, PerfApiConfig, PerfProject, PerfServer,
    RemoteDataSource, ResourceKey,
};
use crate::domain::ports::{PerfClient, PerfClientProvider, ResourceStore};

/// HTTP client for one PERF instance.
#[derive(Debug, Clone)]
pub struct PerfRestClient {
    http: Client,
    base_url: String,
    token: String,
}

impl PerfRestClient {
    /// Log in to PERF and return an authenticated client.
    #[instrument(skip(credentials, timeout), fields(user = %credentials.username))]
    pub async fn connect(
        base_url: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> DomainResult<Self> {
        info!("initializing new PERF REST client");
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::transport("build HTTP client for", base_url, e))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let token = Self::get_authorization_token(&http, &base_url, credentials).await?;

        info!("PERF REST client has been created");
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    async fn get_authorization_token(
        http: &Client,
        base_url: &str,
        credentials: &Credentials,
    ) -> DomainResult<String> {
        let entity = format!("PERF token for {} user", credentials.username);
        let response = http
            .post(format!("{base_url}/api/v2/sso/token"))
            .header(ACCEPT, "text/plain")
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
                ("useExternalSSO", "false"),
            ])
            .send()
            .await
            .map_err(|e| DomainError::transport("get", &entity, e))?;
        let response = check_status(response, "get", &entity)?;
        let token = response
            .text()
            .await
            .map_err(|e| DomainError::transport("read", &entity, e))?;
        Ok(token.trim().to_string())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send(request: RequestBuilder, action: &str, entity: &str) -> DomainResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::transport(action, entity, e))?;
        check_status(response, action, entity)
    }

    async fn json<T: DeserializeOwned>(response: Response, entity: &str) -> DomainResult<T> {
        response
            .json()
            .await
            .map_err(|e| DomainError::Serialization(format!("couldn't decode {entity}: {e}")))
    }

    async fn get_projects(&self) -> DomainResult<Vec<PerfProject>> {
        let entity = "projects from PERF";
        let response = Self::send(self.request(Method::GET, "/api/v2/nodes"), "get", entity).await?;
        Self::json(response, entity).await
    }

    async fn get_project_data_sources(&self, project_id: i64) -> DomainResult<Vec<RemoteDataSource>> {
        let entity = format!("datasources of {project_id} project");
        let response = Self::send(
            self.request(
                Method::GET,
                &format!("/api/v2/nodes/{project_id}/datasets/datasources"),
            ),
            "get",
            &entity,
        )
        .await?;
        Self::json(response, &entity).await
    }

    async fn require_project(&self, name: &str) -> DomainResult<PerfProject> {
        self.get_project(name)
            .await?
            .ok_or_else(|| DomainError::ProjectNotFound(name.to_string()))
    }
}

fn check_status(response: Response, action: &str, entity: &str) -> DomainResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(DomainError::RemoteStatus {
            action: action.to_string(),
            entity: entity.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl PerfClient for PerfRestClient {
    async fn connected(&self) -> DomainResult<bool> {
        debug!(url = %self.base_url, "start checking connection to PERF");
        self.get_projects().await?;
        debug!(url = %self.base_url, "connection to PERF was established");
        Ok(true)
    }

    async fn get_project(&self, name: &str) -> DomainResult<Option<PerfProject>> {
        let wanted = name.to_uppercase();
        Ok(self
            .get_projects()
            .await?
            .into_iter()
            .find(|p| p.name.to_uppercase() == wanted))
    }

    async fn project_exists(&self, name: &str) -> DomainResult<bool> {
        let entity = format!("{name} project for existence");
        let response = self
            .request(Method::GET, "/api/v2/nodes/check/name")
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| DomainError::transport("check", &entity, e))?;
        // PERF answers 400 when the name is already taken.
        if response.status() == StatusCode::BAD_REQUEST {
            return Ok(true);
        }
        check_status(response, "check", &entity)?;
        Ok(false)
    }

    #[instrument(skip(self))]
    async fn get_project_data_source(
        &self,
        project_name: &str,
        kind: DataSourceKind,
    ) -> DomainResult<Option<RemoteDataSource>> {
        let project = self.require_project(project_name).await?;
        let found = self
            .get_project_data_sources(project.id)
            .await?
            .into_iter()
            .find(|ds| ds.kind() == Some(kind));
        debug!(found = found.is_some(), "PERF datasource lookup finished");
        Ok(found)
    }

    #[instrument(skip(self, command), fields(name = %command.name))]
    async fn create_data_source(
        &self,
        project_name: &str,
        command: &DataSourceCommand,
    ) -> DomainResult<()> {
        let project = self.require_project(project_name).await?;
        let entity = format!("{} datasource under {project_name} project", command.name);
        Self::send(
            self.request(Method::POST, &format!("/api/v2/datasources/node/{}", project.id))
                .json(command),
            "create",
            &entity,
        )
        .await?;
        info!("datasource has been created");
        Ok(())
    }

    #[instrument(skip(self, command), fields(id = command.id, name = %command.name))]
    async fn update_data_source(&self, command: &DataSourceCommand) -> DomainResult<()> {
        let entity = format!("{} datasource", command.name);
        Self::send(
            self.request(Method::PUT, &format!("/api/v2/datasources/{}", command.id))
                .json(command),
            "update",
            &entity,
        )
        .await?;
        info!("PERF datasource has been updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn activate_data_source(&self, project_name: &str, data_source_id: i64) -> DomainResult<()> {
        let entity = format!("{data_source_id} datasource under {project_name} project");
        Self::send(
            self.request(
                Method::PUT,
                &format!("/api/v2/datasources/{data_source_id}/activation"),
            ),
            "activate",
            &entity,
        )
        .await?;
        info!("data source has been activated");
        Ok(())
    }
}

/// Builds [`PerfRestClient`]s from the server's `credentialName` secret.
pub struct RestPerfClientProvider {
    store: Arc<dyn ResourceStore>,
    timeout: Duration,
}

impl RestPerfClientProvider {
    /// Provider reading server credentials from `store`.
    pub fn new(store: Arc<dyn ResourceStore>, config: &PerfApiConfig) -> Self {
        Self {
            store,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl PerfClientProvider for RestPerfClientProvider {
    async fn client_for(&self, server: &PerfServer) -> DomainResult<Arc<dyn PerfClient>> {
        let credentials = self
            .store
            .credentials(&ResourceKey::new(
                server.namespace(),
                &server.spec.credential_name,
            ))
            .await?;
        let client = PerfRestClient::connect(&server.spec.api_url, &credentials, self.timeout).await?;
        Ok(Arc::new(client))
    }
}
