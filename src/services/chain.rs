//! Ordered reconciliation steps.
//!
//! A [`Chain`] holds its steps in execution order and runs them one after
//! another against the same resource, stopping at the first error. New
//! steps are added in the factory functions below; callers only see the
//! chain.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CredentialsConfig, PerfDataSource, PerfServer};
use crate::domain::ports::{PerfClientProvider, ResourceStore};

use super::check_connection::CheckConnection;
use super::owner_reference::PutOwnerReference;
use super::put_data_source::PutDataSource;

/// One idempotent reconciliation step over a resource of type `R`.
#[async_trait]
pub trait Step<R: Send>: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Apply the step; an error halts the chain
    async fn serve(&self, resource: &mut R) -> DomainResult<()>;
}

/// Steps executed strictly in order.
pub struct Chain<R: Send> {
    steps: Vec<Box<dyn Step<R>>>,
}

impl<R: Send> Chain<R> {
    /// Build a chain that runs `steps` in the given order.
    pub fn new(steps: Vec<Box<dyn Step<R>>>) -> Self {
        Self { steps }
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step against `resource`, stopping at the first error.
    pub async fn run(&self, resource: &mut R) -> DomainResult<()> {
        for step in &self.steps {
            debug!(step = step.name(), "running step");
            step.serve(resource).await?;
        }
        Ok(())
    }
}

/// Owner linkage, then convergence against PERF.
pub fn data_source_chain(
    store: Arc<dyn ResourceStore>,
    provider: Arc<dyn PerfClientProvider>,
    credentials: CredentialsConfig,
) -> Chain<PerfDataSource> {
    Chain::new(vec![
        Box::new(PutOwnerReference::new(store.clone())),
        Box::new(PutDataSource::new(store, provider, credentials)),
    ])
}

/// Connectivity probe only.
pub fn server_chain(
    store: Arc<dyn ResourceStore>,
    provider: Arc<dyn PerfClientProvider>,
) -> Chain<PerfServer> {
    Chain::new(vec![Box::new(CheckConnection::new(store, provider))])
}
