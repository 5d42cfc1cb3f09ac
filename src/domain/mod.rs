//! Domain layer for the PERF operator
//!
//! This module contains resource models, errors and port definitions.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
