//! Common test utilities for integration tests
//!
//! Resource fixtures shared by the reconciler, CLI and PERF client tests.

#![allow(dead_code)]

use perf_operator::domain::models::{
    DataSourceSpecConfig, ObjectMeta, OwnerReference, PerfDataSource, PerfDataSourceSpec,
    PerfServer, PerfServerSpec, RemoteDataSource, Secret, PERF_API_VERSION, PERF_SERVER_KIND,
};
use serde_json::json;

pub const NAMESPACE: &str = "edp";
pub const SERVER: &str = "epam-perf";
pub const PROJECT: &str = "EDP";

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

pub fn perf_server(available: bool) -> PerfServer {
    let mut server = PerfServer {
        metadata: ObjectMeta::new(NAMESPACE, SERVER),
        spec: PerfServerSpec {
            root_url: "https://perf.example.com".to_string(),
            api_url: "https://perf.example.com".to_string(),
            credential_name: "perf-user".to_string(),
            project_name: PROJECT.to_string(),
        },
        status: Default::default(),
    };
    server.status.available = available;
    server
}

pub fn sonar_data_source(name: &str, project_keys: &[&str]) -> PerfDataSource {
    PerfDataSource {
        metadata: ObjectMeta::new(NAMESPACE, name),
        spec: PerfDataSourceSpec {
            perf_server_name: SERVER.to_string(),
            name: name.to_string(),
            config: DataSourceSpecConfig::Sonar {
                project_keys: strings(project_keys),
                url: "https://sonar.example.com".to_string(),
            },
        },
        status: Default::default(),
    }
}

pub fn gitlab_data_source(name: &str, repositories: &[&str], branches: &[&str]) -> PerfDataSource {
    PerfDataSource {
        metadata: ObjectMeta::new(NAMESPACE, name),
        spec: PerfDataSourceSpec {
            perf_server_name: SERVER.to_string(),
            name: name.to_string(),
            config: DataSourceSpecConfig::GitLab {
                repositories: strings(repositories),
                branches: strings(branches),
                url: "https://gitlab.example.com".to_string(),
            },
        },
        status: Default::default(),
    }
}

pub fn owned_by_server(mut data_source: PerfDataSource) -> PerfDataSource {
    data_source.metadata.owner_references.push(OwnerReference {
        api_version: PERF_API_VERSION.to_string(),
        kind: PERF_SERVER_KIND.to_string(),
        name: SERVER.to_string(),
        uid: None,
        controller: Some(true),
        block_owner_deletion: Some(true),
    });
    data_source
}

pub fn secret(name: &str, username: &str, password: &str) -> Secret {
    Secret {
        metadata: ObjectMeta::new(NAMESPACE, name),
        string_data: [
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ]
        .into_iter()
        .collect(),
        ..Secret::default()
    }
}

pub fn remote(id: i64, kind: &str, field: &str, identifiers: &[&str], active: bool) -> RemoteDataSource {
    let mut config = serde_json::Map::new();
    config.insert(field.to_string(), json!(identifiers));
    RemoteDataSource {
        id,
        name: kind.to_string(),
        data_source_type: kind.to_string(),
        active,
        config,
    }
}

/// Setup test logging
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
