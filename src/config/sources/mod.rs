//! Concrete [`ConfigSource`](super::ConfigSource) implementations.
//!
//! Provides the file-based source (JSON always, YAML and TOML gated by
//! feature flags), [`for_path`] to pick one by file extension, and the
//! [`parse_config_str`] helper for format-specific deserialization.

pub mod file_source;

use std::path::Path;

use file_source::FileSource;

use crate::config::model::Config;
use crate::config::ConfigSource;
use crate::error::ProxyError;

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, ProxyError> {
    match ext {
        "json" => serde_json::from_str(content).map_err(|e| ProxyError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| ProxyError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| ProxyError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(ProxyError::UnsupportedFormat(other.to_string())),
    }
}

/// Pick the file source matching the extension of `path`.
pub fn for_path(path: &Path) -> Result<Box<dyn ConfigSource>, ProxyError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "json" => Ok(Box::new(FileSource::json(path.to_path_buf()))),

        #[cfg(feature = "yaml")]
        "yaml" | "yml" => Ok(Box::new(FileSource::yaml(path.to_path_buf()))),

        #[cfg(feature = "toml")]
        "toml" => Ok(Box::new(FileSource::toml(path.to_path_buf()))),

        other => Err(ProxyError::UnsupportedFormat(other.to_string())),
    }
}
