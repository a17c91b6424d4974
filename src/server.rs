//! Axum server setup, shared application state, and shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared, read-only state holding the
//! wait-page template and the dispatcher), [`build_router`] for
//! constructing the Axum router with its tracing layer,
//! [`build_http_client`] for the connection-pooled hyper client used for
//! upstream calls, and [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::proxy;
use crate::retrieval::pages::Pages;
use crate::retrieval::Dispatcher;

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

/// Shared by every request. Nothing in it is mutated after startup.
pub struct AppState {
    pub pages: Pages,
    pub dispatcher: Dispatcher,
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // rustls cannot pick a crypto provider on its own when several are
    // compiled in; install `ring` explicitly.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

/// Every path and method lands on the retrieval handler. Request bodies
/// are never read.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(proxy::retrieve_handler)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
