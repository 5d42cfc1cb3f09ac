//! In-memory object store adapter.
//!
//! Backs the CLI (resources loaded from YAML manifests) and the tests.

pub mod store;

pub use store::{InMemoryResourceStore, Manifest};
