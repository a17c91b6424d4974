//! The retrieval decision core.
//!
//! [`Dispatcher::dispatch`] turns a requested URL into a [`Retrieval`]:
//!
//! | URL valid | lookup | complete | found | creation | result |
//! |---|---|---|---|---|---|
//! | no  | --    | --    | --    | --     | [`Retrieval::InvalidUrl`] |
//! | yes | fails | --    | --    | --     | [`Retrieval::Failed`] |
//! | yes | ok    | true  | true  | --     | [`Retrieval::Bundle`] |
//! | yes | ok    | true  | false | fails  | [`Retrieval::Failed`] |
//! | yes | ok    | true  | false | ok     | [`Retrieval::Wait`] |
//! | yes | ok    | false | any   | none   | [`Retrieval::Wait`] |
//!
//! An incomplete lookup means a bundle is already being produced, so no
//! creation request is sent for it. Only a complete lookup that found
//! nothing starts a new one.

pub mod pages;
pub mod validator;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::config::model::Config;
use crate::upstream::create::BundleRequester;
use crate::upstream::lookup::{DecodeError, LookupClient, LookupError, LookupResult};
use crate::upstream::{Endpoints, Transport};
use pages::Pages;
use validator::{PatternValidator, UrlValidator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    InvalidUrl(String),
    Failed(String),
    Bundle(Bytes),
    Wait(String),
}

impl Retrieval {
    /// Short label for logs and the `x-retrieval-outcome` header.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid-url",
            Self::Failed(_) => "error",
            Self::Bundle(_) => "bundle",
            Self::Wait(_) => "wait",
        }
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) | Self::Failed(_) => "text/plain; charset=utf-8",
            Self::Bundle(_) | Self::Wait(_) => "text/html; charset=utf-8",
        }
    }

    #[must_use]
    pub fn render(self, pages: &Pages) -> Bytes {
        match self {
            Self::InvalidUrl(url) => Pages::invalid_url(&url).into(),
            Self::Failed(message) => Pages::error(&message).into(),
            Self::Bundle(bundle) => bundle,
            Self::Wait(url) => pages.wait(&url).into(),
        }
    }
}

/// What a successful lookup asks the dispatcher to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Serve,
    Create,
    Wait,
}

impl NextStep {
    #[must_use]
    pub const fn after(result: &LookupResult) -> Self {
        match (result.complete, result.found) {
            (true, true) => Self::Serve,
            (true, false) => Self::Create,
            (false, _) => Self::Wait,
        }
    }
}

pub struct Dispatcher {
    validator: Arc<dyn UrlValidator>,
    lookup: LookupClient,
    requester: BundleRequester,
    budget: Duration,
}

impl Dispatcher {
    /// A dispatcher using the default [`PatternValidator`].
    #[must_use]
    pub fn new(config: &Config, endpoints: Endpoints, transport: Arc<dyn Transport>) -> Self {
        Self {
            validator: Arc::new(PatternValidator::default()),
            lookup: LookupClient::new(transport.clone(), endpoints.clone()),
            requester: BundleRequester::new(transport, endpoints),
            budget: Duration::from_millis(config.timeout),
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn UrlValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Dispatch with a deadline of now plus the configured budget.
    pub async fn dispatch(&self, requested: &str) -> Retrieval {
        self.dispatch_until(requested, Instant::now() + self.budget)
            .await
    }

    /// Dispatch with every remote call bounded by `deadline`.
    pub async fn dispatch_until(&self, requested: &str, deadline: Instant) -> Retrieval {
        if !self.validator.is_valid(requested) {
            tracing::info!(url = %requested, "invalid URL");
            return Retrieval::InvalidUrl(requested.to_string());
        }

        let result = match self.lookup.lookup(requested, deadline).await {
            Ok(result) => result,
            Err(e) => {
                log_lookup_error(requested, &e);
                return Retrieval::Failed(e.to_string());
            }
        };

        match NextStep::after(&result) {
            NextStep::Serve => {
                let bundle = result.bundle.unwrap_or_default();
                if bundle.is_empty() {
                    tracing::warn!(url = %requested, "cache server reported a found bundle with no content");
                }
                Retrieval::Bundle(Bytes::from(bundle))
            }
            NextStep::Create => match self.requester.request_creation(requested, deadline).await {
                Ok(()) => Retrieval::Wait(requested.to_string()),
                Err(e) => Retrieval::Failed(e.to_string()),
            },
            NextStep::Wait => {
                if result.found {
                    tracing::warn!(
                        url = %requested,
                        "cache server reported found on an incomplete lookup, treating it as in progress"
                    );
                }
                Retrieval::Wait(requested.to_string())
            }
        }
    }
}

fn log_lookup_error(requested: &str, err: &LookupError) {
    match err {
        LookupError::Unavailable(e) => {
            tracing::warn!(url = %requested, error = %e, "lookup failed");
        }
        LookupError::Decode(DecodeError::ReportedToUpstream { cause }) => {
            tracing::warn!(url = %requested, cause = %cause, "lookup response undecodable, reported");
        }
        LookupError::Decode(DecodeError::UpstreamUnreachable { cause, report }) => {
            tracing::error!(
                url = %requested,
                cause = %cause,
                report_error = %report,
                "lookup response undecodable, cache server unreachable"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use hyper::{Method, StatusCode};

    use super::*;
    use crate::upstream::testing::{Reply, ScriptedTransport};

    const WAIT_TEMPLATE: &str = "<p>Please wait, retrying {{REDIRECT}}</p>";

    fn dispatcher(transport: ScriptedTransport) -> (Dispatcher, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let config = Config::new("http://lcs:3091", "http://rs:3092");
        let endpoints = Endpoints::from_config(&config).unwrap();
        (
            Dispatcher::new(&config, endpoints, transport.clone()),
            transport,
        )
    }

    fn lookup_returns(body: &'static str) -> ScriptedTransport {
        ScriptedTransport::new().on(
            Method::GET,
            "/lookup",
            Reply::Respond(StatusCode::OK, body),
        )
    }

    #[test]
    fn next_step_table() {
        let step = |complete, found| {
            NextStep::after(&LookupResult {
                complete,
                found,
                bundle: None,
            })
        };
        assert_eq!(step(true, true), NextStep::Serve);
        assert_eq!(step(true, false), NextStep::Create);
        assert_eq!(step(false, false), NextStep::Wait);
        assert_eq!(step(false, true), NextStep::Wait);
    }

    #[tokio::test]
    async fn invalid_url_makes_no_calls() {
        let (dispatcher, transport) = dispatcher(ScriptedTransport::new());

        let retrieval = dispatcher.dispatch("not a url").await;
        assert_eq!(retrieval, Retrieval::InvalidUrl("not a url".into()));
        assert_eq!(
            retrieval.render(&Pages::new(WAIT_TEMPLATE)),
            "Error: not a url is not a valid URL."
        );
        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn found_bundle_is_served_verbatim() {
        let (dispatcher, transport) = dispatcher(lookup_returns(
            r#"{"complete": true, "found": true, "bundle": "<html>hi</html>"}"#,
        ));

        let retrieval = dispatcher.dispatch("http://example.com/a").await;
        assert_eq!(retrieval.outcome(), "bundle");
        assert_eq!(retrieval.render(&Pages::new(WAIT_TEMPLATE)), "<html>hi</html>");
        assert_eq!(transport.calls_to("/create"), 0);
    }

    #[tokio::test]
    async fn complete_not_found_requests_creation_once() {
        let (dispatcher, transport) = dispatcher(
            lookup_returns(r#"{"complete": true, "found": false}"#).on(
                Method::POST,
                "/create",
                Reply::Respond(StatusCode::OK, ""),
            ),
        );

        let retrieval = dispatcher.dispatch("http://example.com/c").await;
        assert_eq!(retrieval, Retrieval::Wait("http://example.com/c".into()));
        assert_eq!(transport.calls_to("/create"), 1);
    }

    #[tokio::test]
    async fn failed_creation_is_an_error_not_a_wait() {
        let (dispatcher, transport) = dispatcher(
            lookup_returns(r#"{"complete": true, "found": false}"#).on(
                Method::POST,
                "/create",
                Reply::Respond(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ),
        );

        let retrieval = dispatcher.dispatch("http://example.com/c").await;
        match &retrieval {
            Retrieval::Failed(message) => assert!(message.contains("request server")),
            other => panic!("expected an error page, got {other:?}"),
        }
        assert_eq!(transport.calls_to("/create"), 1);
    }

    #[tokio::test]
    async fn incomplete_lookup_waits_without_creation() {
        let (dispatcher, transport) =
            dispatcher(lookup_returns(r#"{"complete": false, "found": false}"#));

        let retrieval = dispatcher.dispatch("http://example.com/b").await;
        assert_eq!(
            retrieval.render(&Pages::new(WAIT_TEMPLATE)),
            "<p>Please wait, retrying http://example.com/b</p>"
        );
        assert_eq!(transport.calls_to("/create"), 0);
    }

    #[tokio::test]
    async fn found_but_incomplete_still_waits() {
        let (dispatcher, transport) = dispatcher(lookup_returns(
            r#"{"complete": false, "found": true, "bundle": "<html>early</html>"}"#,
        ));

        let retrieval = dispatcher.dispatch("http://example.com/b").await;
        assert_eq!(retrieval, Retrieval::Wait("http://example.com/b".into()));
        assert_eq!(transport.calls_to("/create"), 0);
    }

    #[tokio::test]
    async fn lookup_failure_is_an_error_page() {
        let (dispatcher, transport) = dispatcher(ScriptedTransport::new().on(
            Method::GET,
            "/lookup",
            Reply::Respond(StatusCode::NOT_FOUND, ""),
        ));

        let retrieval = dispatcher.dispatch("http://example.com/a").await;
        let body = retrieval.render(&Pages::new(WAIT_TEMPLATE));
        assert!(body.starts_with(b"Error: unsuccessful request to local cache server"));
        assert_eq!(transport.total_calls(), 1);
    }

    #[tokio::test]
    async fn undecodable_lookup_is_an_error_page_after_one_report() {
        let (dispatcher, transport) = dispatcher(
            lookup_returns("<html>not json</html>").on(
                Method::POST,
                "/error/decode",
                Reply::Respond(StatusCode::OK, "okay"),
            ),
        );

        let retrieval = dispatcher.dispatch("http://example.com/a").await;
        assert_eq!(retrieval.outcome(), "error");
        assert_eq!(transport.calls_to("/error/decode"), 1);
        assert_eq!(transport.calls_to("/create"), 0);
    }

    #[tokio::test]
    async fn custom_validator_is_consulted() {
        let (dispatcher, transport) = dispatcher(ScriptedTransport::new());
        let dispatcher =
            dispatcher.with_validator(Arc::new(|url: &str| url.starts_with("https://")));

        let retrieval = dispatcher.dispatch("http://example.com/a").await;
        assert_eq!(retrieval.outcome(), "invalid-url");
        assert_eq!(transport.total_calls(), 0);
    }
}
