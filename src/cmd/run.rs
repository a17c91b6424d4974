//! `ceno-proxy run`: start the proxy server.
//!
//! Loads the configuration (collecting it interactively when none exists
//! and a terminal is attached), checks that the cache and request servers
//! answer their ping, then serves every inbound request through the
//! retrieval dispatcher until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::RunArgs;
use crate::cmd::init;
use crate::config::model::Config;
use crate::config::{self, validation};
use crate::error::ProxyError;
use crate::logging;
use crate::retrieval::pages::Pages;
use crate::retrieval::Dispatcher;
use crate::server::{self, AppState};
use crate::upstream::{probe, Endpoints, HyperTransport, Transport};

pub async fn execute(args: RunArgs) -> Result<(), ProxyError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let mut config = load_or_collect(&args).await?;

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    if let Err(errors) = validation::validate(&config) {
        return Err(ProxyError::ConfigValidation { errors });
    }

    let endpoints = Endpoints::from_config(&config)?;
    let pages = Pages::load(&config.wait_page).await?;
    let transport: Arc<dyn Transport> =
        Arc::new(HyperTransport::new(server::build_http_client()));

    probe::ensure_available(
        &*transport,
        &endpoints,
        Duration::from_millis(config.timeout),
    )
    .await?;

    let state = Arc::new(AppState {
        pages,
        dispatcher: Dispatcher::new(&config, endpoints, transport),
    });

    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, config.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        cache_service = %config.cache_service,
        request_service = %config.request_service,
        timeout_ms = config.timeout,
        git = env!("CENO_GIT_SHORT"),
        "ceno-proxy listening at http://{addr}"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("ceno-proxy stopped");
    Ok(())
}

async fn load_or_collect(args: &RunArgs) -> Result<Config, ProxyError> {
    let loaded = match config::resolve_path(args.config.as_deref()).await {
        Some(path) => config::load(&path).await,
        None => Err(ProxyError::NoConfigSource {
            hint: format!(
                "Provide --config <file> or create one of {} in the working directory.\n  \
                 Run 'ceno-proxy init -i' to create a config file.",
                config::CANDIDATES.join(", ")
            ),
        }),
    };

    match loaded {
        Err(e) if config::is_missing(&e) && !args.no_interactive && init::can_prompt() => {
            tracing::warn!(error = %e, "no usable config, asking for one");
            let save_to = args
                .config
                .clone()
                .unwrap_or_else(|| PathBuf::from(config::CANDIDATES[0]));
            init::collect_for_run(&save_to)
        }
        other => other,
    }
}
