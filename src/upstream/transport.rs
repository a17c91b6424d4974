//! The [`Transport`] seam through which every upstream call is made.
//!
//! [`HyperTransport`] sends requests over the shared connection-pooled
//! hyper client. The whole exchange (response head and body) must finish
//! before the caller's deadline. Dropping the returned future aborts the
//! call, so an inbound connection that goes away takes its outbound calls
//! with it.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use tokio::time::Instant;
use url::Url;

use crate::server::HttpClient;

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub content_type: Option<&'static str>,
    pub body: Bytes,
}

impl OutboundRequest {
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            content_type: None,
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn post(url: Url, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            url,
            content_type: Some(content_type),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    Request(#[source] http::Error),

    #[error("{0}")]
    Connect(#[source] hyper_util::client::legacy::Error),

    #[error("body read error: {0}")]
    Body(#[source] hyper::Error),

    #[error("deadline exceeded")]
    TimedOut,
}

// async_trait: the dispatcher holds an Arc<dyn Transport> so tests can swap it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: OutboundRequest,
        deadline: Instant,
    ) -> Result<UpstreamResponse, TransportError>;
}

pub struct HyperTransport {
    client: HttpClient,
}

impl HyperTransport {
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(
        &self,
        request: OutboundRequest,
        deadline: Instant,
    ) -> Result<UpstreamResponse, TransportError> {
        let mut builder = hyper::Request::builder()
            .method(request.method)
            .uri(request.url.as_str());
        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let req = builder
            .body(Full::new(request.body))
            .map_err(TransportError::Request)?;

        let exchange = async {
            let response = self
                .client
                .request(req)
                .await
                .map_err(TransportError::Connect)?;
            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(TransportError::Body)?
                .to_bytes();
            Ok::<_, TransportError>(UpstreamResponse { status, body })
        };

        tokio::time::timeout_at(deadline, exchange)
            .await
            .map_err(|_| TransportError::TimedOut)?
    }
}
