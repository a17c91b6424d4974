//! Availability checks for the upstream services.
//!
//! A service is available when `GET {base}/ping` answers 2xx before the
//! deadline. There are no retries. [`ensure_available`] runs the checks
//! the server needs before it binds its listener: the cache server
//! first, then the request server, stopping at the first failure.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use super::{call, Endpoints, OutboundRequest, Service, Transport, UpstreamError};
use crate::error::ProxyError;

#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub service: Service,
    pub url: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
}

pub async fn check(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    service: Service,
    deadline: Instant,
) -> Result<(), UpstreamError> {
    let request = OutboundRequest::get(endpoints.ping(service));
    call(transport, service, request, deadline).await.map(|_| ())
}

pub async fn probe(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    service: Service,
    deadline: Instant,
) -> bool {
    check(transport, endpoints, service, deadline).await.is_ok()
}

#[allow(clippy::cast_possible_truncation)]
pub async fn report(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    service: Service,
    timeout: Duration,
) -> ProbeReport {
    let start = Instant::now();
    let result = check(transport, endpoints, service, start + timeout).await;
    ProbeReport {
        service,
        url: endpoints.ping(service).to_string(),
        available: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
        latency_ms: start.elapsed().as_millis() as u64,
    }
}

/// Fail fast unless both services answer their ping.
pub async fn ensure_available(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    timeout: Duration,
) -> Result<(), ProxyError> {
    for service in Service::ALL {
        let report = report(transport, endpoints, service, timeout).await;
        if !report.available {
            tracing::error!(
                service = %service,
                url = %report.url,
                error = report.error.as_deref().unwrap_or(""),
                "upstream service unavailable"
            );
            return Err(ProxyError::StartupUnavailable(service));
        }
        tracing::info!(
            service = %service,
            latency_ms = report.latency_ms,
            "upstream service available"
        );
    }
    Ok(())
}
