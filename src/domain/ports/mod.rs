//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - PerfClient: PERF data-source API operations
//! - PerfClientProvider: authenticated PerfClient construction per server
//! - ResourceStore: server/data-source resource and secret persistence
//!
//! These traits define the contracts that allow the reconciliation services to be
//! independent of the PERF wire format and of the object store in use.

pub mod perf_client;
pub mod resource_store;

pub use perf_client::{PerfClient, PerfClientProvider};
pub use resource_store::ResourceStore;
