//! Generic async file-based config source.
//!
//! [`FileSource`] implements [`ConfigSource`] for any file format by
//! accepting a deserialization function at construction time; the
//! [`json`](FileSource::json), `yaml` and `toml` constructors cover the
//! supported formats. It reads the file asynchronously via Tokio and
//! validates the result.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::model::Config;
use crate::config::validation::validate;
use crate::config::ConfigSource;
use crate::error::ProxyError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type Deserialize = fn(&str) -> Result<Config, BoxError>;

pub struct FileSource {
    path: PathBuf,
    name: &'static str,
    deserialize: Deserialize,
}

impl FileSource {
    #[must_use]
    pub fn new(path: PathBuf, name: &'static str, deserialize: Deserialize) -> Self {
        Self {
            path,
            name,
            deserialize,
        }
    }

    #[must_use]
    pub fn json(path: PathBuf) -> Self {
        Self::new(path, "json", |content| {
            serde_json::from_str::<Config>(content).map_err(|e| Box::new(e) as BoxError)
        })
    }

    #[cfg(feature = "yaml")]
    #[must_use]
    pub fn yaml(path: PathBuf) -> Self {
        Self::new(path, "yaml", |content| {
            serde_yml::from_str::<Config>(content).map_err(|e| Box::new(e) as BoxError)
        })
    }

    #[cfg(feature = "toml")]
    #[must_use]
    pub fn toml(path: PathBuf) -> Self {
        Self::new(path, "toml", |content| {
            toml::from_str::<Config>(content).map_err(|e| Box::new(e) as BoxError)
        })
    }

    async fn read_content(&self) -> Result<String, ProxyError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProxyError::ConfigFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                ProxyError::Io(e)
            }
        })
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn load(&self) -> Result<Config, ProxyError> {
        let content = self.read_content().await?;

        let config = (self.deserialize)(&content).map_err(|e| ProxyError::ConfigParse {
            path: self.path.display().to_string(),
            source: e,
        })?;

        if let Err(errors) = validate(&config) {
            return Err(ProxyError::ConfigValidation { errors });
        }

        Ok(config)
    }
}
