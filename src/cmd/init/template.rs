//! Template mode for `ceno-proxy init`: writes a static starter config.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::error::ProxyError;

pub fn run(args: &InitArgs) -> Result<(), ProxyError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("ceno.{}", args.format.extension())));

    if output.exists() {
        return Err(ProxyError::FileExists { path: output });
    }

    std::fs::write(&output, template(&args.format, args.full))?;
    println!("Created {}", output.display());
    Ok(())
}

const fn template(format: &ConfigFormat, full: bool) -> &'static str {
    match (format, full) {
        (ConfigFormat::Json, false) => JSON_MINIMAL,
        (ConfigFormat::Json, true) => JSON_FULL,
        (ConfigFormat::Yaml, false) => YAML_MINIMAL,
        (ConfigFormat::Yaml, true) => YAML_FULL,
        (ConfigFormat::Toml, false) => TOML_MINIMAL,
        (ConfigFormat::Toml, true) => TOML_FULL,
    }
}

const JSON_MINIMAL: &str = r#"{
  "cache_service": "http://localhost:3091",
  "request_service": "http://localhost:3092",
  "wait_page": "please_wait.html"
}
"#;

const JSON_FULL: &str = r#"{
  "cache_service": "http://localhost:3091",
  "request_service": "http://localhost:3092",
  "error_report_path": "/error/decode",
  "create_path": "/create",
  "wait_page": "please_wait.html",
  "port": 3090,
  "timeout": 5000
}
"#;

const YAML_MINIMAL: &str = r#"# ceno-proxy config

cache_service: "http://localhost:3091"
request_service: "http://localhost:3092"
wait_page: "please_wait.html"
"#;

const YAML_FULL: &str = r#"# ceno-proxy config
#
# All optional values shown are defaults.

# Local cache server: answers GET /ping and GET /lookup?url=...
cache_service: "http://localhost:3091"
# Where undecodable lookup responses are reported (POST, JSON body)
error_report_path: "/error/decode"

# Request server: answers GET /ping and starts bundles on POST
request_service: "http://localhost:3092"
create_path: "/create"

# Served while a bundle is being produced; {{REDIRECT}} becomes the URL
wait_page: "please_wait.html"

port: 3090
# Deadline for the upstream calls made for one request, in ms
timeout: 5000
"#;

const TOML_MINIMAL: &str = r#"# ceno-proxy config

cache_service = "http://localhost:3091"
request_service = "http://localhost:3092"
wait_page = "please_wait.html"
"#;

const TOML_FULL: &str = r#"# ceno-proxy config
#
# All optional values shown are defaults.

# Local cache server: answers GET /ping and GET /lookup?url=...
cache_service = "http://localhost:3091"
# Where undecodable lookup responses are reported (POST, JSON body)
error_report_path = "/error/decode"

# Request server: answers GET /ping and starts bundles on POST
request_service = "http://localhost:3092"
create_path = "/create"

# Served while a bundle is being produced; {{REDIRECT}} becomes the URL
wait_page = "please_wait.html"

port = 3090
# Deadline for the upstream calls made for one request, in ms
timeout = 5000
"#;
