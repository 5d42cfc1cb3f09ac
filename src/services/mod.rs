//! Reconciliation services.
//!
//! - `command_builder`: desired vs remote diff, create/update commands
//! - `chain`: ordered step driver and chain factories
//! - `owner_reference`, `put_data_source`, `check_connection`: the steps
//! - `reconciler`: per-resource entry point and requeue decisions

pub mod chain;
pub mod check_connection;
pub mod command_builder;
pub mod owner_reference;
pub mod put_data_source;
pub mod reconciler;

pub use chain::{data_source_chain, server_chain, Chain, Step};
pub use check_connection::CheckConnection;
pub use command_builder::{plan, DataSourcePlan};
pub use owner_reference::PutOwnerReference;
pub use put_data_source::PutDataSource;
pub use reconciler::{ReconcileAction, Reconciler};
