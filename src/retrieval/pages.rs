//! Response pages rendered by the front door.
//!
//! The wait-page template is read once at startup. It contains the
//! [`PLACEHOLDER`] token, replaced by the requested URL verbatim (no
//! HTML escaping) when the page is served.

use std::path::Path;

use crate::error::ProxyError;

pub const PLACEHOLDER: &str = "{{REDIRECT}}";

#[derive(Debug, Clone)]
pub struct Pages {
    wait_template: String,
}

impl Pages {
    #[must_use]
    pub fn new(wait_template: impl Into<String>) -> Self {
        Self {
            wait_template: wait_template.into(),
        }
    }

    pub async fn load(wait_page: &Path) -> Result<Self, ProxyError> {
        let template =
            tokio::fs::read_to_string(wait_page)
                .await
                .map_err(|source| ProxyError::WaitPage {
                    path: wait_page.to_path_buf(),
                    source,
                })?;

        if !template.contains(PLACEHOLDER) {
            tracing::warn!(
                path = %wait_page.display(),
                placeholder = PLACEHOLDER,
                "wait page template has no placeholder, clients will not be redirected"
            );
        }

        Ok(Self::new(template))
    }

    /// The wait page for `url`. Only the first placeholder is replaced.
    #[must_use]
    pub fn wait(&self, url: &str) -> String {
        self.wait_template.replacen(PLACEHOLDER, url, 1)
    }

    #[must_use]
    pub fn error(message: &str) -> String {
        format!("Error: {message}")
    }

    #[must_use]
    pub fn invalid_url(url: &str) -> String {
        Self::error(&format!("{url} is not a valid URL."))
    }
}
