//! Domain models for PERF resources, remote entities and commands.

pub mod command;
pub mod config;
pub mod data_source;
pub mod meta;
pub mod remote;
pub mod secret;
pub mod server;

pub use command::{DataSourceCommand, DataSourceConfig, DataSourceKind};
pub use config::{Config, CredentialsConfig, LoggingConfig, PerfApiConfig, ReconcileConfig};
pub use data_source::{
    DataSourceSpecConfig, DataSourceState, PerfDataSource, PerfDataSourceSpec,
    PerfDataSourceStatus,
};
pub use meta::{
    ObjectMeta, OwnerReference, ResourceKey, PERF_API_VERSION, PERF_DATA_SOURCE_KIND,
    PERF_SERVER_KIND,
};
pub use remote::{PerfProject, RemoteDataSource};
pub use secret::{Credentials, Secret};
pub use server::{PerfServer, PerfServerSpec, PerfServerStatus, CONNECTED_MESSAGE};
