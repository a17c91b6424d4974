//! Configuration loading and validation.
//!
//! Defines the [`ConfigSource`] trait for pluggable config backends and
//! [`load`], which picks a file source for a path and loads it once.
//! The resulting [`Config`] is immutable for the lifetime of the process
//! and is handed to every component explicitly. Submodules provide the
//! data model, validation logic, and concrete source implementations.

pub mod model;
pub mod sources;
pub mod validation;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ProxyError;
use model::Config;

/// File names probed in the working directory when no path is given.
pub const CANDIDATES: &[&str] = &["ceno.json", "ceno.yaml", "ceno.yml", "ceno.toml"];

// async_trait is required here because ConfigSource is used as Box<dyn ConfigSource>
// and native async fn in traits does not support dyn dispatch.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Result<Config, ProxyError>;
}

/// Load and validate the config at `path`.
///
/// A missing file surfaces as [`ProxyError::ConfigFileNotFound`] so the
/// caller can fall back to interactive collection.
pub async fn load(path: &Path) -> Result<Config, ProxyError> {
    let source = sources::for_path(path)?;
    let config = source.load().await?;
    tracing::debug!(source = source.name(), path = %path.display(), "config loaded");
    Ok(config)
}

/// Resolve the config path: the explicit one if given, else the first
/// existing candidate in the working directory.
pub async fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    for name in CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return Some(path);
        }
    }

    None
}

/// True when the error means "there is no configuration", as opposed to
/// a configuration that exists but is broken.
#[must_use]
pub const fn is_missing(err: &ProxyError) -> bool {
    matches!(
        err,
        ProxyError::ConfigFileNotFound { .. } | ProxyError::NoConfigSource { .. }
    )
}
