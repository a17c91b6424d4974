//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for structural
//! errors: malformed or non-HTTP service locations, endpoint paths that
//! do not start with `/`, an out-of-range port, a zero timeout and an
//! empty wait-page path. Returns a list of [`ValidationError`] values
//! with per-field suggestions.

use url::Url;

use super::model::Config;
use crate::error::ValidationError;

/// Validate an upstream base location. Returns `Ok(())` or a human-readable error.
pub fn validate_service_url(location: &str) -> Result<(), String> {
    match Url::parse(location) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.cannot_be_a_base() || parsed.host().is_none() {
                Err(format!("'{location}' is not an absolute address"))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{location}' is not a valid URL")),
    }
}

/// Validate an endpoint path. Returns `Ok(())` or a human-readable error.
pub fn validate_endpoint_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("path cannot be empty".into());
    }
    if !path.starts_with('/') {
        return Err(format!("path must start with '/' (did you mean '/{path}'?)"));
    }
    if path.contains('?') || path.contains('#') {
        return Err("path cannot carry a query or fragment".into());
    }
    Ok(())
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, location) in [
        ("cache_service", &config.cache_service),
        ("request_service", &config.request_service),
    ] {
        if let Err(msg) = validate_service_url(location) {
            errors.push(ValidationError {
                field: field.into(),
                message: msg,
                suggestion: if location.contains("://") {
                    None
                } else {
                    Some(format!("did you mean 'http://{location}'?"))
                },
            });
        }
    }

    for (field, path) in [
        ("error_report_path", &config.error_report_path),
        ("create_path", &config.create_path),
    ] {
        if let Err(msg) = validate_endpoint_path(path) {
            errors.push(ValidationError {
                field: field.into(),
                message: msg,
                suggestion: if !path.is_empty() && !path.starts_with('/') {
                    Some(format!("did you mean '/{path}'?"))
                } else {
                    None
                },
            });
        }
    }

    if config.wait_page.as_os_str().is_empty() {
        errors.push(ValidationError {
            field: "wait_page".into(),
            message: "wait page template path cannot be empty".into(),
            suggestion: None,
        });
    }

    if config.port == 0 {
        errors.push(ValidationError {
            field: "port".into(),
            message: "port must be between 1 and 65535".into(),
            suggestion: None,
        });
    }

    if config.timeout == 0 {
        errors.push(ValidationError {
            field: "timeout".into(),
            message: "timeout must be greater than 0".into(),
            suggestion: Some("upstream calls need a deadline, e.g. 5000".into()),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let lines = [
        format!("  cache service:   {}", config.cache_service),
        format!("    error report:  {}", config.error_report_path),
        format!("  request service: {}", config.request_service),
        format!("    create:        {}", config.create_path),
        format!("  wait page:       {}", config.wait_page.display()),
        format!("  port:            {}", config.port),
        format!("  timeout:         {}ms", config.timeout),
    ];

    format!("{} is valid\n{}", path, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> Config {
        Config::new("http://localhost:3091", "http://localhost:3092")
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn service_with_path_prefix_passes() {
        let config = Config::new("https://lcs.internal/v1/", "http://127.0.0.1:3092");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn relative_service_location_fails_with_suggestion() {
        let config = Config::new("localhost:3091", "http://localhost:3092");
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "cache_service");
        assert_eq!(
            errors[0].suggestion.as_deref(),
            Some("did you mean 'http://localhost:3091'?")
        );
    }

    #[test]
    fn non_http_scheme_fails() {
        let config = Config::new("http://localhost:3091", "ftp://localhost:3092");
        let errors = validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.field == "request_service" && e.message.contains("unsupported scheme")));
    }

    #[test]
    fn garbage_location_fails() {
        let config = Config::new("not a url", "http://localhost:3092");
        let errors = validate(&config).unwrap_err();
        assert!(errors[0].message.contains("not a valid URL"));
    }

    #[test]
    fn endpoint_path_without_slash_fails() {
        let mut config = minimal_config();
        config.create_path = "create".into();
        let errors = validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.suggestion.as_deref() == Some("did you mean '/create'?")));
    }

    #[test]
    fn endpoint_path_with_query_fails() {
        let mut config = minimal_config();
        config.error_report_path = "/error?kind=decode".into();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_port_and_timeout_are_both_reported() {
        let mut config = minimal_config();
        config.port = 0;
        config.timeout = 0;
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.field == "port"));
        assert!(errors.iter().any(|e| e.field == "timeout"));
    }

    #[test]
    fn empty_wait_page_fails() {
        let mut config = minimal_config();
        config.wait_page = std::path::PathBuf::new();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors[0].field, "wait_page");
    }

    #[test]
    fn report_lists_every_location() {
        let report = format_validation_report("ceno.json", &minimal_config());
        assert!(report.starts_with("ceno.json is valid"));
        assert!(report.contains("http://localhost:3091"));
        assert!(report.contains("/create"));
        assert!(report.contains("3090"));
    }
}
