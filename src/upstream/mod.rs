//! Calls to the two upstream services.
//!
//! The local cache server (LCS) answers bundle lookups and receives
//! decode-failure reports; the request server (RS) starts producing new
//! bundles. Every call goes through the [`Transport`] seam with an
//! explicit deadline and is attempted exactly once.
//!
//! - [`transport`] -- the [`Transport`] trait and its hyper implementation.
//! - [`probe`] -- startup availability checks.
//! - [`lookup`] -- bundle lookup with the decode-failure report fallback.
//! - [`create`] -- bundle creation requests.

pub mod create;
pub mod lookup;
pub mod probe;
pub mod transport;

use std::fmt;

use hyper::StatusCode;
use serde::Serialize;
use tokio::time::Instant;
use url::Url;

use crate::config::model::Config;
use crate::error::ProxyError;

pub use transport::{HyperTransport, OutboundRequest, Transport, TransportError, UpstreamResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Cache,
    Request,
}

impl Service {
    pub const ALL: [Self; 2] = [Self::Cache, Self::Request];

    /// How to bring the service up, shown when it fails the startup probe.
    #[must_use]
    pub const fn run_hint(self) -> &'static str {
        match self {
            Self::Cache => {
                "Start the local cache server first and check that `cache_service`\n  \
                 in your config points at it (it must answer GET /ping with 200)."
            }
            Self::Request => {
                "Start the request server first and check that `request_service`\n  \
                 in your config points at it (it must answer GET /ping with 200)."
            }
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cache => "local cache server",
            Self::Request => "request server",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("responded with status {0}")]
    Status(StatusCode),
}

/// A call to an upstream service that did not produce a 2xx response.
#[derive(Debug, thiserror::Error)]
#[error("unsuccessful request to {service}: {failure}")]
pub struct UpstreamError {
    pub service: Service,
    #[source]
    pub failure: UpstreamFailure,
}

/// Resolved upstream locations, built once from a validated [`Config`].
#[derive(Debug, Clone)]
pub struct Endpoints {
    cache: Url,
    request: Url,
    error_report_path: String,
    create_path: String,
}

impl Endpoints {
    pub fn from_config(config: &Config) -> Result<Self, ProxyError> {
        let parse = |service: Service, location: &str| {
            Url::parse(location).map_err(|source| ProxyError::Location {
                service,
                location: location.to_string(),
                source,
            })
        };

        Ok(Self {
            cache: parse(Service::Cache, &config.cache_service)?,
            request: parse(Service::Request, &config.request_service)?,
            error_report_path: config.error_report_path.clone(),
            create_path: config.create_path.clone(),
        })
    }

    #[must_use]
    pub const fn base(&self, service: Service) -> &Url {
        match service {
            Service::Cache => &self.cache,
            Service::Request => &self.request,
        }
    }

    #[must_use]
    pub fn ping(&self, service: Service) -> Url {
        join(self.base(service), "/ping")
    }

    #[must_use]
    pub fn lookup(&self, requested: &str) -> Url {
        let mut url = join(&self.cache, "/lookup");
        url.query_pairs_mut().append_pair("url", requested);
        url
    }

    #[must_use]
    pub fn error_report(&self) -> Url {
        join(&self.cache, &self.error_report_path)
    }

    #[must_use]
    pub fn create(&self, requested: &str) -> Url {
        let mut url = join(&self.request, &self.create_path);
        url.query_pairs_mut().append_pair("url", requested);
        url
    }
}

/// Append `path` to the base location, keeping any path prefix it has.
fn join(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{prefix}{path}"));
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Send one request and require a 2xx status.
pub(crate) async fn call(
    transport: &dyn Transport,
    service: Service,
    request: OutboundRequest,
    deadline: Instant,
) -> Result<UpstreamResponse, UpstreamError> {
    let response = transport
        .send(request, deadline)
        .await
        .map_err(|e| UpstreamError {
            service,
            failure: e.into(),
        })?;

    if !response.status.is_success() {
        return Err(UpstreamError {
            service,
            failure: UpstreamFailure::Status(response.status),
        });
    }

    Ok(response)
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted [`Transport`] that records every request it sees.

    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use hyper::{Method, StatusCode};
    use tokio::time::Instant;

    use super::{OutboundRequest, Transport, TransportError, UpstreamResponse};

    pub enum Reply {
        Respond(StatusCode, &'static str),
        Refuse,
    }

    pub struct ScriptedTransport {
        routes: Vec<(Method, &'static str, Reply)>,
        pub seen: Mutex<Vec<OutboundRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self {
                routes: Vec::new(),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn on(mut self, method: Method, path: &'static str, reply: Reply) -> Self {
            self.routes.push((method, path, reply));
            self
        }

        pub fn calls_to(&self, path: &str) -> usize {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.url.path() == path)
                .count()
        }

        pub fn total_calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            request: OutboundRequest,
            _deadline: Instant,
        ) -> Result<UpstreamResponse, TransportError> {
            let reply = self
                .routes
                .iter()
                .find(|(m, p, _)| *m == request.method && *p == request.url.path())
                .map(|(_, _, r)| r);
            self.seen.lock().unwrap().push(request);

            match reply {
                Some(Reply::Respond(status, body)) => Ok(UpstreamResponse {
                    status: *status,
                    body: Bytes::from_static((*body).as_bytes()),
                }),
                Some(Reply::Refuse) | None => Err(TransportError::TimedOut),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints(cache: &str, request: &str) -> Endpoints {
        Endpoints::from_config(&Config::new(cache, request)).unwrap()
    }

    #[test]
    fn endpoints_append_to_bare_hosts() {
        let e = endpoints("http://localhost:3091", "http://localhost:3092");
        assert_eq!(e.ping(Service::Cache).as_str(), "http://localhost:3091/ping");
        assert_eq!(
            e.ping(Service::Request).as_str(),
            "http://localhost:3092/ping"
        );
        assert_eq!(
            e.error_report().as_str(),
            "http://localhost:3091/error/decode"
        );
    }

    #[test]
    fn endpoints_keep_base_path_prefix() {
        let e = endpoints("http://lcs.local/api/", "http://rs.local/v2");
        assert_eq!(e.ping(Service::Cache).as_str(), "http://lcs.local/api/ping");
        assert_eq!(
            e.create("http://example.com/").path(),
            "/v2/create"
        );
    }

    #[test]
    fn requested_url_is_query_encoded() {
        let e = endpoints("http://localhost:3091", "http://localhost:3092");
        let lookup = e.lookup("http://example.com/a?b=c&d");
        assert_eq!(lookup.path(), "/lookup");
        let pairs: Vec<_> = lookup.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "url");
        assert_eq!(pairs[0].1, "http://example.com/a?b=c&d");
    }

    #[test]
    fn service_display_names() {
        assert_eq!(Service::Cache.to_string(), "local cache server");
        assert_eq!(Service::Request.to_string(), "request server");
    }
}
