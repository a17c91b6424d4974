//! Serde data structure for the ceno-proxy configuration file.
//!
//! [`Config`] holds the two upstream base locations, the endpoint paths
//! that hang off them, the wait-page template location, the listen port
//! and the remote-call deadline budget. It derives `Serialize` and
//! `Deserialize` with `deny_unknown_fields` for strict parsing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3090;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_ERROR_REPORT_PATH: &str = "/error/decode";
pub const DEFAULT_CREATE_PATH: &str = "/create";
pub const DEFAULT_WAIT_PAGE: &str = "please_wait.html";

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_error_report_path() -> String {
    DEFAULT_ERROR_REPORT_PATH.to_string()
}

fn default_create_path() -> String {
    DEFAULT_CREATE_PATH.to_string()
}

fn default_wait_page() -> PathBuf {
    PathBuf::from(DEFAULT_WAIT_PAGE)
}

fn is_default_port(v: &u16) -> bool {
    *v == DEFAULT_PORT
}

fn is_default_timeout(v: &u64) -> bool {
    *v == DEFAULT_TIMEOUT_MS
}

fn is_default_error_report_path(v: &str) -> bool {
    v == DEFAULT_ERROR_REPORT_PATH
}

fn is_default_create_path(v: &str) -> bool {
    v == DEFAULT_CREATE_PATH
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base location of the local cache service (LCS).
    pub cache_service: String,

    /// Base location of the request service (RS).
    pub request_service: String,

    /// Cache service endpoint that receives lookup decode-failure reports.
    #[serde(
        default = "default_error_report_path",
        skip_serializing_if = "is_default_error_report_path"
    )]
    pub error_report_path: String,

    /// Request service endpoint that starts producing a bundle.
    #[serde(
        default = "default_create_path",
        skip_serializing_if = "is_default_create_path"
    )]
    pub create_path: String,

    #[serde(default = "default_wait_page")]
    pub wait_page: PathBuf,

    #[serde(default = "default_port", skip_serializing_if = "is_default_port")]
    pub port: u16,

    /// Deadline budget in milliseconds for the remote calls made on behalf
    /// of a single inbound request.
    #[serde(default = "default_timeout", skip_serializing_if = "is_default_timeout")]
    pub timeout: u64,
}

impl Config {
    /// A config with every optional field at its default.
    #[must_use]
    pub fn new(cache_service: impl Into<String>, request_service: impl Into<String>) -> Self {
        Self {
            cache_service: cache_service.into(),
            request_service: request_service.into(),
            error_report_path: default_error_report_path(),
            create_path: default_create_path(),
            wait_page: default_wait_page(),
            port: default_port(),
            timeout: default_timeout(),
        }
    }
}
