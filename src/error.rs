//! Unified error types for ceno-proxy.
//!
//! Defines [`ProxyError`] (the crate-level error enum used by the CLI
//! commands) and [`ValidationError`] for config validation failures.
//! Errors produced while talking to the cache and request services live
//! next to their callers in [`upstream`](crate::upstream). Messages
//! include contextual hints to guide the user toward a fix.

use std::path::PathBuf;

use crate::upstream::Service;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("No config source found.\n\n  {hint}")]
    NoConfigSource { hint: String },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid {service} location '{location}': {source}")]
    Location {
        service: Service,
        location: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Cannot read wait page template {}: {source}", path.display())]
    WaitPage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("The {0} is not responding to requests.\n\n  {hint}", hint = .0.run_hint())]
    StartupUnavailable(Service),

    #[error("{0} of 2 upstream services unavailable")]
    ProbeFailed(usize),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
