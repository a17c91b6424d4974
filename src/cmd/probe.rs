//! `ceno-proxy probe`: check that the upstream services answer.
//!
//! Pings the local cache server and the request server named in the
//! configuration and prints one line per service (or a JSON array with
//! `--json`). Exits non-zero when any service is unavailable.

use std::time::Duration;

use crate::cli::ProbeArgs;
use crate::config;
use crate::error::ProxyError;
use crate::server;
use crate::upstream::{probe, Endpoints, HyperTransport, Service};

pub async fn execute(args: ProbeArgs) -> Result<(), ProxyError> {
    let Some(path) = config::resolve_path(args.config.as_deref()).await else {
        return Err(ProxyError::NoConfigSource {
            hint: format!(
                "Provide --config <file> or create one of {} in the working directory.",
                config::CANDIDATES.join(", ")
            ),
        });
    };
    let config = config::load(&path).await?;

    let endpoints = Endpoints::from_config(&config)?;
    let transport = HyperTransport::new(server::build_http_client());
    let timeout = Duration::from_millis(args.timeout.unwrap_or(config.timeout));

    let mut reports = Vec::with_capacity(Service::ALL.len());
    for service in Service::ALL {
        reports.push(probe::report(&transport, &endpoints, service, timeout).await);
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports)
                .map_err(|e| ProxyError::Io(std::io::Error::other(e.to_string())))?
        );
    } else {
        for report in &reports {
            if report.available {
                println!(
                    "\u{2713} {} is available ({}, {}ms)",
                    report.service, report.url, report.latency_ms
                );
            } else {
                println!(
                    "\u{2717} {} is unavailable ({})",
                    report.service, report.url
                );
                if let Some(ref error) = report.error {
                    println!("  {error}");
                }
            }
        }
    }

    let down = reports.iter().filter(|r| !r.available).count();
    if down > 0 {
        return Err(ProxyError::ProbeFailed(down));
    }
    Ok(())
}
