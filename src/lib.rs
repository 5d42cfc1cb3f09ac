//! PERF operator
//!
//! Keeps PerfServer and PerfDataSource resources converged with a remote
//! PERF service: server connectivity is probed and recorded, and each data
//! source is created, extended with new identifiers or re-activated under
//! the server's PERF project.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): resource models, errors and port traits
//! - **Service Layer** (`services`): reconciliation steps and driver
//! - **Adapters** (`adapters`): PERF REST client and in-memory object store
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use perf_operator::adapters::memory::InMemoryResourceStore;
//! use perf_operator::adapters::perf::RestPerfClientProvider;
//! use perf_operator::services::Reconciler;
//!
//! let store = Arc::new(InMemoryResourceStore::from_yaml_file("resources.yaml").await?);
//! let provider = Arc::new(RestPerfClientProvider::new(store.clone(), &config.perf));
//! let reconciler = Reconciler::new(store, provider, &config);
//! reconciler.reconcile_data_source(&key).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, DataSourceKind, PerfDataSource, PerfServer, ResourceKey,
};
pub use domain::ports::{PerfClient, PerfClientProvider, ResourceStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ReconcileAction, Reconciler};
