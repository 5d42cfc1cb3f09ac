//! End-to-end reconciliation of a manifest file against a mock PERF server.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use mockito::{Matcher, Server, ServerGuard};
use perf_operator::adapters::memory::InMemoryResourceStore;
use perf_operator::adapters::perf::RestPerfClientProvider;
use perf_operator::cli::commands::reconcile::{self, reconcile_all, ReconcileArgs, ReconcileOutput};
use perf_operator::cli::output::CommandOutput;
use perf_operator::cli::{Cli, Commands};
use perf_operator::domain::models::{Config, DataSourceState, ResourceKey};
use perf_operator::domain::ports::ResourceStore;
use perf_operator::services::Reconciler;
use serde_json::json;
use tempfile::NamedTempFile;

fn manifest(api_url: &str) -> String {
    format!(
        r"
kind: PerfServer
metadata:
  name: epam-perf
  namespace: edp
spec:
  rootUrl: {api_url}
  apiUrl: {api_url}
  credentialName: perf-user
  projectName: edp
---
kind: Secret
metadata:
  name: perf-user
  namespace: edp
stringData:
  username: admin
  password: secret
---
kind: Secret
metadata:
  name: sonar-admin-password
  namespace: edp
stringData:
  username: sonar
  password: sonar-pass
---
kind: PerfDataSource
metadata:
  name: app-sonar
  namespace: edp
spec:
  perfServerName: epam-perf
  name: app-sonar
  config:
    type: sonar
    projectKeys: [app, lib]
    url: https://sonar.example.com
"
    )
}

/// Mocks of a PERF instance with one empty project; only `create` is asserted.
struct PerfMocks {
    _read: Vec<mockito::Mock>,
    create: mockito::Mock,
}

async fn mock_perf(server: &mut ServerGuard) -> PerfMocks {
    let token = server
        .mock("POST", "/api/v2/sso/token")
        .with_status(200)
        .with_body("token")
        .create_async()
        .await;
    let projects = server
        .mock("GET", "/api/v2/nodes")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "id": 3, "name": "EDP" }]).to_string())
        .create_async()
        .await;
    let data_sources = server
        .mock("GET", "/api/v2/nodes/3/datasets/datasources")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/v2/datasources/node/3")
        .match_body(Matcher::PartialJson(json!({
            "name": "app-sonar",
            "type": "SONAR",
            "config": { "projectKeys": ["app", "lib"] }
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    PerfMocks {
        _read: vec![token, projects, data_sources],
        create,
    }
}

fn manifest_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_reconcile_all_creates_data_source() {
    let mut server = Server::new_async().await;
    let mocks = mock_perf(&mut server).await;
    let config = Config::default();

    let store = Arc::new(InMemoryResourceStore::from_yaml_str(&manifest(&server.url())).await.unwrap());
    let provider = Arc::new(RestPerfClientProvider::new(store.clone(), &config.perf));
    let reconciler = Reconciler::new(store.clone(), provider, &config);

    let outcomes = reconcile_all(
        &reconciler,
        store.perf_server_keys().await,
        store.perf_data_source_keys().await,
        config.reconcile.workers,
    )
    .await;

    let output = ReconcileOutput::new(outcomes);
    assert_eq!(output.failed, 0, "{:?}", output.outcomes);
    assert_eq!(output.outcomes.len(), 2);
    assert!(output.to_human().contains("app-sonar"));
    mocks.create.assert_async().await;

    let ds = store
        .get_perf_data_source(&ResourceKey::new("edp", "app-sonar"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ds.status.status, Some(DataSourceState::Created));
    let perf = store
        .get_perf_server(&ResourceKey::new("edp", "epam-perf"))
        .await
        .unwrap()
        .unwrap();
    assert!(perf.status.available);
}

#[tokio::test]
async fn test_unreachable_server_defers_data_sources() {
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/api/v2/sso/token")
        .with_status(503)
        .create_async()
        .await;
    let config = Config::default();

    let store = Arc::new(InMemoryResourceStore::from_yaml_str(&manifest(&server.url())).await.unwrap());
    let provider = Arc::new(RestPerfClientProvider::new(store.clone(), &config.perf));
    let reconciler = Reconciler::new(store.clone(), provider, &config);

    let output = ReconcileOutput::new(
        reconcile_all(
            &reconciler,
            store.perf_server_keys().await,
            store.perf_data_source_keys().await,
            2,
        )
        .await,
    );

    assert_eq!(output.failed, 1);
    let json = output.to_json();
    let outcomes = json["outcomes"].as_array().unwrap();
    let ds = outcomes
        .iter()
        .find(|o| o["kind"] == "PerfDataSource")
        .unwrap();
    assert_eq!(ds["result"], "requeue");
    assert_eq!(ds["requeue_after_secs"], 60);
    let perf = outcomes.iter().find(|o| o["kind"] == "PerfServer").unwrap();
    assert_eq!(perf["result"], "error");
    assert!(perf["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_execute_writes_reconciled_resources() {
    let mut server = Server::new_async().await;
    let _mocks = mock_perf(&mut server).await;
    let manifests = manifest_file(&manifest(&server.url()));
    let out_dir = tempfile::tempdir().unwrap();
    let out = out_dir.path().join("reconciled.yaml");

    let args = ReconcileArgs {
        manifests: manifests.path().to_path_buf(),
        write: Some(out.clone()),
    };
    reconcile::execute(args, &Config::default(), true).await.unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("status: created"));
    assert!(written.contains("available: true"));
    assert!(!written.contains("sonar-pass"));

    let reloaded = InMemoryResourceStore::from_yaml_str(&written).await.unwrap();
    let ds = reloaded
        .get_perf_data_source(&ResourceKey::new("edp", "app-sonar"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ds.metadata.owner_references.len(), 1);
}

#[tokio::test]
async fn test_execute_with_missing_manifest_fails() {
    let args = ReconcileArgs {
        manifests: "/nonexistent/resources.yaml".into(),
        write: None,
    };

    let err = reconcile::execute(args, &Config::default(), false).await.unwrap_err();
    assert!(err.to_string().contains("Failed to load manifests"));
}

#[test]
fn test_cli_parses_reconcile() {
    let cli = Cli::try_parse_from([
        "perf-operator",
        "reconcile",
        "--manifests",
        "resources.yaml",
        "--write",
        "out.yaml",
        "--json",
    ])
    .unwrap();

    assert!(cli.json);
    let Commands::Reconcile(args) = cli.command else {
        panic!("expected reconcile command");
    };
    assert_eq!(args.manifests.to_str(), Some("resources.yaml"));
    assert_eq!(args.write.as_deref().and_then(|p| p.to_str()), Some("out.yaml"));
}

#[test]
fn test_cli_parses_check_with_default_namespace() {
    let cli = Cli::try_parse_from([
        "perf-operator",
        "--config",
        "perf.yaml",
        "check",
        "-m",
        "resources.yaml",
        "--server",
        "epam-perf",
    ])
    .unwrap();

    assert_eq!(cli.config.as_deref().and_then(|p| p.to_str()), Some("perf.yaml"));
    let Commands::Check(args) = cli.command else {
        panic!("expected check command");
    };
    assert_eq!(args.server, "epam-perf");
    assert_eq!(args.namespace, "default");
}

#[test]
fn test_cli_requires_manifests() {
    assert!(Cli::try_parse_from(["perf-operator", "reconcile"]).is_err());
}
