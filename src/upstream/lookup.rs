//! Bundle lookups against the local cache server.
//!
//! [`LookupClient::lookup`] asks the cache server whether a bundle exists
//! for a URL. When the server answers 2xx but the body does not decode,
//! the client reports the failure back to the server exactly once and
//! surfaces the result of that report as a [`DecodeError`]:
//!
//! - report delivered: [`DecodeError::ReportedToUpstream`], the server knows
//!   and only the current request fails;
//! - report not delivered: [`DecodeError::UpstreamUnreachable`], the server
//!   could not even be told.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::{call, Endpoints, OutboundRequest, Service, Transport, UpstreamError};

/// Bundle status as reported by the cache server.
///
/// The server is expected to set `found` only together with `complete`,
/// and to send a non-empty `bundle` exactly when both are set. That is
/// not enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LookupResult {
    #[serde(default, alias = "Complete")]
    pub complete: bool,

    #[serde(default, alias = "Found")]
    pub found: bool,

    #[serde(default, alias = "Bundle", skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("could not decode cache server response: {cause}")]
    ReportedToUpstream { cause: String },

    #[error("could not decode cache server response ({cause}) and the failure report was not delivered: {report}")]
    UpstreamUnreachable {
        cause: String,
        #[source]
        report: UpstreamError,
    },
}

impl DecodeError {
    #[must_use]
    pub fn cause(&self) -> &str {
        match self {
            Self::ReportedToUpstream { cause } | Self::UpstreamUnreachable { cause, .. } => cause,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Unavailable(#[from] UpstreamError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Clone)]
pub struct LookupClient {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
}

impl LookupClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub async fn lookup(
        &self,
        requested: &str,
        deadline: Instant,
    ) -> Result<LookupResult, LookupError> {
        let request = OutboundRequest::get(self.endpoints.lookup(requested));
        let response = call(&*self.transport, Service::Cache, request, deadline).await?;

        match serde_json::from_slice::<LookupResult>(&response.body) {
            Ok(result) => {
                tracing::debug!(
                    url = %requested,
                    complete = result.complete,
                    found = result.found,
                    bundle_bytes = result.bundle.as_ref().map_or(0, String::len),
                    "lookup result"
                );
                Ok(result)
            }
            Err(e) => Err(self.report_decode_failure(e.to_string(), deadline).await.into()),
        }
    }

    async fn report_decode_failure(&self, cause: String, deadline: Instant) -> DecodeError {
        tracing::warn!(error = %cause, "cache server response did not decode, reporting it");

        let body = serde_json::json!({ "error": cause }).to_string();
        let request = OutboundRequest::post(self.endpoints.error_report(), "application/json", body);

        match call(&*self.transport, Service::Cache, request, deadline).await {
            Ok(_) => DecodeError::ReportedToUpstream { cause },
            Err(report) => {
                tracing::error!(error = %report, "decode failure report not delivered");
                DecodeError::UpstreamUnreachable { cause, report }
            }
        }
    }
}
