//! PERF gateway adapters
//!
//! - `client`: REST client against a live PERF instance
//! - `mock`: in-memory PERF used by tests and dry runs

pub mod client;
pub mod mock;

pub use client::{PerfRestClient, RestPerfClientProvider};
pub use mock::{MockPerfClient, PerfCall, PerfOperation, StaticPerfClientProvider};
