//! Diff between desired data-source config and PERF's current config.
//!
//! Pure functions: given a data-source spec, the remote data source (if
//! any) and resolved credentials, decide whether to create, update or do
//! nothing, and build the matching [`DataSourceCommand`].
//!
//! The identifier rule is the same for every kind: the update list is the
//! remote list followed by the desired identifiers PERF doesn't know yet.
//! Remote identifiers are never dropped. URL and credentials always come
//! from the desired side.

use std::collections::HashSet;

use crate::domain::models::{
    Credentials, DataSourceCommand, DataSourceConfig, DataSourceSpecConfig, PerfDataSourceSpec,
    RemoteDataSource,
};

/// What the convergence step has to send to PERF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourcePlan {
    /// No data source of this kind exists; create one.
    Create(DataSourceCommand),
    /// The remote data source is missing some desired identifiers.
    Update(DataSourceCommand),
    /// Every desired identifier is already configured remotely.
    Unchanged,
}

/// Decide how to converge `spec` against `remote`.
pub fn plan(
    spec: &PerfDataSourceSpec,
    remote: Option<&RemoteDataSource>,
    credentials: &Credentials,
) -> DataSourcePlan {
    match remote {
        None => DataSourcePlan::Create(create_command(spec, credentials)),
        Some(remote) => {
            let remote_ids = remote.identifiers(spec.kind().identifier_field());
            if is_converged(spec.config.identifiers(), &remote_ids) {
                DataSourcePlan::Unchanged
            } else {
                DataSourcePlan::Update(update_command(spec, remote, credentials))
            }
        }
    }
}

/// Command creating a data source with exactly the desired configuration.
pub fn create_command(spec: &PerfDataSourceSpec, credentials: &Credentials) -> DataSourceCommand {
    DataSourceCommand {
        id: 0,
        name: spec.name.clone(),
        kind: spec.kind(),
        config: config_for(&spec.config, spec.config.identifiers().to_vec(), credentials),
    }
}

/// Command updating `remote` with the union of remote and desired identifiers.
pub fn update_command(
    spec: &PerfDataSourceSpec,
    remote: &RemoteDataSource,
    credentials: &Credentials,
) -> DataSourceCommand {
    let kind = spec.kind();
    let merged = merge_identifiers(
        &remote.identifiers(kind.identifier_field()),
        spec.config.identifiers(),
    );
    DataSourceCommand {
        id: remote.id,
        name: if remote.name.is_empty() {
            spec.name.clone()
        } else {
            remote.name.clone()
        },
        kind,
        config: config_for(&spec.config, merged, credentials),
    }
}

/// Remote identifiers in remote order, then new desired identifiers in
/// desired order. Duplicates are collapsed.
pub fn merge_identifiers(remote: &[String], desired: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(remote.len() + desired.len());
    remote
        .iter()
        .chain(desired)
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Desired ⊆ remote, ignoring order.
pub fn is_converged(desired: &[String], remote: &[String]) -> bool {
    let remote: HashSet<&str> = remote.iter().map(String::as_str).collect();
    desired.iter().all(|id| remote.contains(id.as_str()))
}

fn config_for(
    desired: &DataSourceSpecConfig,
    identifiers: Vec<String>,
    credentials: &Credentials,
) -> DataSourceConfig {
    let url = desired.url().to_string();
    let username = credentials.username.clone();
    let password = credentials.password.clone();
    match desired {
        DataSourceSpecConfig::Sonar { .. } => DataSourceConfig::Sonar {
            project_keys: identifiers,
            url,
            username,
            password,
        },
        DataSourceSpecConfig::Jenkins { .. } => DataSourceConfig::Jenkins {
            job_names: identifiers,
            url,
            username,
            password,
        },
        DataSourceSpecConfig::GitLab { branches, .. } => DataSourceConfig::GitLab {
            repositories: identifiers,
            branches: branches.clone(),
            url,
            username,
            password,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::DataSourceKind;
    use serde_json::json;

    fn creds() -> Credentials {
        Credentials {
            username: "fake".to_string(),
            password: "fake".to_string(),
        }
    }

    fn sonar_spec(keys: &[&str]) -> PerfDataSourceSpec {
        PerfDataSourceSpec {
            perf_server_name: "perf".to_string(),
            name: "sonar".to_string(),
            config: DataSourceSpecConfig::Sonar {
                project_keys: keys.iter().map(|k| (*k).to_string()).collect(),
                url: "http://sonar".to_string(),
            },
        }
    }

    fn remote(kind: &str, field: &str, ids: &[&str]) -> RemoteDataSource {
        let mut config = serde_json::Map::new();
        config.insert(field.to_string(), json!(ids));
        config.insert("url".to_string(), json!("http://old"));
        RemoteDataSource {
            id: 42,
            name: kind.to_string(),
            data_source_type: kind.to_string(),
            active: true,
            config,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_create_uses_desired_identifiers_exactly() {
        let spec = sonar_spec(&["X", "Y"]);
        let DataSourcePlan::Create(cmd) = plan(&spec, None, &creds()) else {
            panic!("expected create plan");
        };
        assert_eq!(cmd.id, 0);
        assert_eq!(cmd.name, "sonar");
        assert_eq!(cmd.kind, DataSourceKind::Sonar);
        assert_eq!(cmd.config.identifiers(), ["X", "Y"]);
        assert_eq!(cmd.config.url(), "http://sonar");
    }

    #[test]
    fn test_update_keeps_remote_order_then_new_ids() {
        let spec = sonar_spec(&["Y", "X", "Z"]);
        let remote = remote("SONAR", "projectKeys", &["X", "W"]);

        let DataSourcePlan::Update(cmd) = plan(&spec, Some(&remote), &creds()) else {
            panic!("expected update plan");
        };
        assert_eq!(cmd.id, 42);
        assert_eq!(cmd.name, "SONAR");
        assert_eq!(cmd.config.identifiers(), ["X", "W", "Y", "Z"]);
        // url always comes from the desired spec
        assert_eq!(cmd.config.url(), "http://sonar");
    }

    #[test]
    fn test_subset_is_unchanged_regardless_of_order() {
        let spec = sonar_spec(&["B", "A"]);
        let remote = remote("SONAR", "projectKeys", &["A", "B", "C"]);
        assert_eq!(plan(&spec, Some(&remote), &creds()), DataSourcePlan::Unchanged);
    }

    #[test]
    fn test_identifier_field_follows_kind() {
        let spec = PerfDataSourceSpec {
            perf_server_name: "perf".to_string(),
            name: "jenkins".to_string(),
            config: DataSourceSpecConfig::Jenkins {
                job_names: strings(&["job-b"]),
                url: "http://jenkins".to_string(),
            },
        };
        // projectKeys must not be read for a Jenkins data source
        let mut remote = remote("JENKINS", "jobNames", &["job-a"]);
        remote.config.insert("projectKeys".to_string(), json!(["job-b"]));

        let DataSourcePlan::Update(cmd) = plan(&spec, Some(&remote), &creds()) else {
            panic!("expected update plan");
        };
        assert!(matches!(cmd.config, DataSourceConfig::Jenkins { .. }));
        assert_eq!(cmd.config.identifiers(), ["job-a", "job-b"]);
    }

    #[test]
    fn test_gitlab_branches_come_from_desired() {
        let spec = PerfDataSourceSpec {
            perf_server_name: "perf".to_string(),
            name: "gitlab".to_string(),
            config: DataSourceSpecConfig::GitLab {
                repositories: strings(&["group/new"]),
                branches: strings(&["master"]),
                url: "http://gitlab".to_string(),
            },
        };
        let remote = remote("GITLAB", "repositories", &["group/old"]);

        let DataSourcePlan::Update(cmd) = plan(&spec, Some(&remote), &creds()) else {
            panic!("expected update plan");
        };
        assert_eq!(
            cmd.config,
            DataSourceConfig::GitLab {
                repositories: strings(&["group/old", "group/new"]),
                branches: strings(&["master"]),
                url: "http://gitlab".to_string(),
                username: "fake".to_string(),
                password: "fake".to_string(),
            }
        );
        assert_eq!(cmd.kind, DataSourceKind::GitLab);
    }

    #[test]
    fn test_merge_collapses_duplicates() {
        assert_eq!(
            merge_identifiers(&strings(&["a", "a", "b"]), &strings(&["b", "c", "c"])),
            strings(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_empty_desired_is_converged() {
        assert!(is_converged(&[], &strings(&["a"])));
        assert!(!is_converged(&strings(&["a"]), &[]));
    }
}
