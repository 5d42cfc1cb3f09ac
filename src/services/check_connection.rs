//! Probes PERF reachability for a PerfServer and records it in the status.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{PerfServer, CONNECTED_MESSAGE};
use crate::domain::ports::{PerfClientProvider, ResourceStore};

use super::chain::Step;

/// Sets `status.available` from a connectivity probe.
///
/// A failed probe is terminal for the reconciliation pass: the status is
/// written and the error returned. Data sources of an unavailable server
/// are deferred by the reconciler.
pub struct CheckConnection {
    store: Arc<dyn ResourceStore>,
    provider: Arc<dyn PerfClientProvider>,
}

impl CheckConnection {
    /// Create the step.
    pub fn new(store: Arc<dyn ResourceStore>, provider: Arc<dyn PerfClientProvider>) -> Self {
        Self { store, provider }
    }

    async fn connect_to_perf(&self, server: &PerfServer) -> DomainResult<()> {
        let client = self.provider.client_for(server).await?;
        if client.connected().await? {
            Ok(())
        } else {
            Err(DomainError::PerfUnavailable(server.spec.root_url.clone()))
        }
    }

    /// Status subresource first, whole object as fallback.
    async fn update_status(&self, server: &PerfServer) -> DomainResult<()> {
        if let Err(err) = self.store.update_perf_server_status(server).await {
            warn!(error = %err, "couldn't update PerfServer status, updating whole object");
            self.store.update_perf_server(server).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Step<PerfServer> for CheckConnection {
    fn name(&self) -> &'static str {
        "check_connection"
    }

    #[instrument(skip(self, server), fields(name = %server.name(), url = %server.spec.root_url))]
    async fn serve(&self, server: &mut PerfServer) -> DomainResult<()> {
        info!("start checking connection to PERF");

        if let Err(err) = self.connect_to_perf(server).await {
            let message = format!(
                "couldn't connect to PERF instance {}: {err}",
                server.spec.root_url
            );
            server.set_availability(false, message);
            // The connectivity error is what the caller needs to see.
            if let Err(status_err) = self.update_status(server).await {
                error!(error = %status_err, "couldn't persist PerfServer status");
            }
            return Err(err);
        }

        server.set_availability(true, CONNECTED_MESSAGE);
        self.update_status(server).await?;
        info!("connection to PERF has been established");
        Ok(())
    }
}
