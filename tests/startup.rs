//! Startup availability checks against live listeners.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use ceno_proxy::config::model::Config;
use ceno_proxy::error::ProxyError;
use ceno_proxy::server;
use ceno_proxy::upstream::{
    probe, Endpoints, HyperTransport, Service, TransportError, UpstreamFailure,
};

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn healthy() -> SocketAddr {
    spawn(Router::new().route("/ping", get(|| async { "pong" }))).await
}

async fn broken() -> SocketAddr {
    spawn(Router::new().route("/ping", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))).await
}

async fn slow() -> SocketAddr {
    spawn(Router::new().route(
        "/ping",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "pong"
        }),
    ))
    .await
}

fn endpoints(cache: SocketAddr, request: SocketAddr) -> Endpoints {
    Endpoints::from_config(&Config::new(
        format!("http://{cache}"),
        format!("http://{request}"),
    ))
    .unwrap()
}

#[tokio::test]
async fn both_services_answering_is_ok() {
    let transport = HyperTransport::new(server::build_http_client());
    let endpoints = endpoints(healthy().await, healthy().await);

    probe::ensure_available(&transport, &endpoints, Duration::from_secs(2))
        .await
        .unwrap();
}

#[tokio::test]
async fn failing_cache_server_stops_startup() {
    let transport = HyperTransport::new(server::build_http_client());
    let endpoints = endpoints(broken().await, healthy().await);

    let err = probe::ensure_available(&transport, &endpoints, Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(err, ProxyError::StartupUnavailable(Service::Cache)));
    assert!(err.to_string().contains("local cache server"));
}

#[tokio::test]
async fn failing_request_server_stops_startup() {
    let transport = HyperTransport::new(server::build_http_client());
    let endpoints = endpoints(healthy().await, broken().await);

    let err = probe::ensure_available(&transport, &endpoints, Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(err, ProxyError::StartupUnavailable(Service::Request)));
}

#[tokio::test]
async fn report_records_the_failure() {
    let transport = HyperTransport::new(server::build_http_client());
    let endpoints = endpoints(healthy().await, broken().await);

    let report = probe::report(
        &transport,
        &endpoints,
        Service::Request,
        Duration::from_secs(2),
    )
    .await;
    assert!(!report.available);
    assert!(report.url.ends_with("/ping"));
    assert!(report.error.unwrap().contains("500"));
}

#[tokio::test]
async fn expired_deadline_is_a_timeout() {
    let transport = HyperTransport::new(server::build_http_client());
    let endpoints = endpoints(slow().await, healthy().await);

    let start = tokio::time::Instant::now();
    let err = probe::check(
        &transport,
        &endpoints,
        Service::Cache,
        start + Duration::from_millis(100),
    )
    .await
    .unwrap_err();

    assert!(start.elapsed() < Duration::from_secs(1), "{:?}", start.elapsed());
    assert_eq!(err.service, Service::Cache);
    assert!(matches!(
        err.failure,
        UpstreamFailure::Transport(TransportError::TimedOut)
    ));
}

#[tokio::test]
async fn slow_service_fails_startup_within_the_timeout() {
    let transport = HyperTransport::new(server::build_http_client());
    let endpoints = endpoints(healthy().await, slow().await);

    let start = std::time::Instant::now();
    let err = probe::ensure_available(&transport, &endpoints, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(start.elapsed() < Duration::from_secs(1), "{:?}", start.elapsed());
    assert!(matches!(err, ProxyError::StartupUnavailable(Service::Request)));
}
