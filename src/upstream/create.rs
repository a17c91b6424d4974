//! Bundle creation requests to the request server.

use std::sync::Arc;

use tokio::time::Instant;

use super::{call, Endpoints, OutboundRequest, Service, Transport, UpstreamError};

#[derive(Clone)]
pub struct BundleRequester {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
}

impl BundleRequester {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Ask the request server to start producing a bundle for `requested`.
    ///
    /// The URL travels as the `text/plain` body. The response body is
    /// ignored; only the transport and the status are checked.
    pub async fn request_creation(
        &self,
        requested: &str,
        deadline: Instant,
    ) -> Result<(), UpstreamError> {
        let request = OutboundRequest::post(
            self.endpoints.create(requested),
            "text/plain",
            requested.to_owned(),
        );

        match call(&*self.transport, Service::Request, request, deadline).await {
            Ok(_) => {
                tracing::info!(url = %requested, "bundle creation requested");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(url = %requested, error = %e, "bundle creation request failed");
                Err(e)
            }
        }
    }
}
