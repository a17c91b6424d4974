//! The HTTP front door.
//!
//! [`retrieve_handler`] is the Axum fallback that receives every inbound
//! request, whatever its path or method. It extracts the requested URL
//! ([`target`]), hands it to the [`Dispatcher`](crate::retrieval::Dispatcher)
//! and writes the rendered payload back.
//!
//! Every outcome is answered with `200 OK`. The outcome kind is exposed
//! only through the `x-retrieval-outcome` header and the content type.

pub mod target;

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::server::AppState;

pub const OUTCOME_HEADER: &str = "x-retrieval-outcome";
pub const CORRELATION_HEADER: &str = "x-correlation-id";

pub async fn retrieve_handler(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let correlation_id = req_headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let requested = target::requested_url(&uri);

    tracing::info!(
        correlation_id = %correlation_id,
        method = %method,
        url = %requested,
        "request received"
    );

    let retrieval = state.dispatcher.dispatch(&requested).await;
    let outcome = retrieval.outcome();
    let content_type = retrieval.content_type();
    let body = retrieval.render(&state.pages);

    #[allow(clippy::cast_possible_truncation)]
    let latency_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        correlation_id = %correlation_id,
        url = %requested,
        outcome,
        bytes = body.len(),
        latency_ms,
        "request served"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(OUTCOME_HEADER, outcome)
        .header(CORRELATION_HEADER, &correlation_id)
        .body(Body::from(body))
        .unwrap_or_else(|e| {
            tracing::error!(
                correlation_id = %correlation_id,
                error = %e,
                "failed to build response"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}
