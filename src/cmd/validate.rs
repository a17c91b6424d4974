//! `ceno-proxy validate`: check a configuration file without starting.
//!
//! Problems are grouped by what they break: reaching the upstream
//! services, the endpoint paths called on them, or the local listener.
//! A valid file is echoed as the exact upstream calls the proxy will
//! make, plus whether the wait page template can be found.

use std::path::Path;

use serde::Serialize;

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::Config;
use crate::config::sources::parse_config_str;
use crate::config::validation;
use crate::error::{ProxyError, ValidationError};
use crate::retrieval::pages::PLACEHOLDER;
use crate::upstream::{Endpoints, Service};

const AREAS: [&str; 3] = ["upstream services", "upstream endpoints", "proxy"];

fn area(field: &str) -> &'static str {
    match field {
        "cache_service" | "request_service" => AREAS[0],
        "error_report_path" | "create_path" => AREAS[1],
        _ => AREAS[2],
    }
}

/// The calls a running proxy would make, resolved from the config.
#[derive(Debug, Serialize)]
struct UpstreamPlan {
    cache_ping: String,
    lookup: String,
    error_report: String,
    request_ping: String,
    create: String,
}

impl UpstreamPlan {
    fn resolve(config: &Config) -> Result<Self, ProxyError> {
        let endpoints = Endpoints::from_config(config)?;
        let strip_query = |mut url: url::Url| {
            url.set_query(None);
            url.to_string()
        };
        Ok(Self {
            cache_ping: endpoints.ping(Service::Cache).to_string(),
            lookup: format!("{}?url=...", strip_query(endpoints.lookup(""))),
            error_report: endpoints.error_report().to_string(),
            request_ping: endpoints.ping(Service::Request).to_string(),
            create: format!("{}?url=...", strip_query(endpoints.create(""))),
        })
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum WaitPageStatus {
    Ready,
    NoPlaceholder,
    Missing,
}

fn wait_page_status(path: &Path) -> WaitPageStatus {
    match std::fs::read_to_string(path) {
        Ok(template) if template.contains(PLACEHOLDER) => WaitPageStatus::Ready,
        Ok(_) => WaitPageStatus::NoPlaceholder,
        Err(_) => WaitPageStatus::Missing,
    }
}

pub fn execute(args: &ValidateArgs) -> Result<(), ProxyError> {
    let path = &args.config;

    if !path.exists() {
        return Err(ProxyError::ConfigFileNotFound { path: path.clone() });
    }

    let content = std::fs::read_to_string(path)?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&config) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!(
                    "\u{2717} {} cannot be used to start the proxy ({} problems)",
                    path.display(),
                    errors.len()
                );
                eprint!("{}", grouped_report(&errors));
            }
            ValidateFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "area": area(&e.field),
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(ProxyError::ConfigValidation { errors });
    }

    let plan = UpstreamPlan::resolve(&config)?;
    let wait_page = wait_page_status(&config.wait_page);

    match args.format {
        ValidateFormat::Text => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&path.display().to_string(), &config)
            );
            println!("\n  upstream calls:");
            println!("    GET  {}", plan.cache_ping);
            println!("    GET  {}", plan.lookup);
            println!("    POST {}", plan.error_report);
            println!("    GET  {}", plan.request_ping);
            println!("    POST {}", plan.create);
            match wait_page {
                WaitPageStatus::Ready => {}
                WaitPageStatus::NoPlaceholder => println!(
                    "\n  ! {} has no {PLACEHOLDER}, wait pages will not name the URL",
                    config.wait_page.display()
                ),
                WaitPageStatus::Missing => println!(
                    "\n  ! {} not found from here, 'ceno-proxy run' needs it at startup",
                    config.wait_page.display()
                ),
            }
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "config": config,
                    "upstream": plan,
                    "wait_page": wait_page,
                })
            );
        }
    }

    Ok(())
}

fn grouped_report(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for name in AREAS {
        let mut in_area = errors.iter().filter(|e| area(&e.field) == name).peekable();
        if in_area.peek().is_none() {
            continue;
        }
        let _ = writeln!(buf, "\n {name}:");
        for e in in_area {
            let _ = writeln!(buf, "{e}");
        }
    }
    buf
}
