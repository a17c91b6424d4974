//! Serialize a [`Config`] struct to the chosen output format.

use std::path::Path;

use crate::cli::ConfigFormat;
use crate::config::model::Config;
use crate::error::ProxyError;

/// The format implied by a file extension, if it is one we write.
#[must_use]
pub fn format_for_path(path: &Path) -> Option<ConfigFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(ConfigFormat::Json),
        Some("yaml" | "yml") => Some(ConfigFormat::Yaml),
        Some("toml") => Some(ConfigFormat::Toml),
        _ => None,
    }
}

/// Serialize a `Config` to a formatted string in the given format.
pub fn serialize_config(config: &Config, format: &ConfigFormat) -> Result<String, ProxyError> {
    match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ProxyError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(feature = "yaml")]
        ConfigFormat::Yaml => serde_yml::to_string(config)
            .map_err(|e| ProxyError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "yaml"))]
        ConfigFormat::Yaml => Err(ProxyError::UnsupportedFormat("yaml".into())),

        #[cfg(feature = "toml")]
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| ProxyError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "toml"))]
        ConfigFormat::Toml => Err(ProxyError::UnsupportedFormat("toml".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sources::parse_config_str;

    #[test]
    fn json_output_parses_back() {
        let mut config = Config::new("http://localhost:3091", "http://localhost:3092");
        config.port = 8080;
        let text = serialize_config(&config, &ConfigFormat::Json).unwrap();
        assert_eq!(parse_config_str("json", &text, "ceno.json").unwrap(), config);
    }

    #[test]
    fn format_follows_extension() {
        assert!(matches!(
            format_for_path(Path::new("conf/ceno.yml")),
            Some(ConfigFormat::Yaml)
        ));
        assert!(format_for_path(Path::new("ceno")).is_none());
    }
}
