//! Extraction of the requested URL from an inbound request target.
//!
//! Three request shapes are understood, checked in this order:
//!
//! 1. absolute-form (`GET http://example.com/a HTTP/1.1`), sent by clients
//!    that use this node as their HTTP proxy: the full target;
//! 2. a `url` query parameter on the root path
//!    (`GET /?url=http%3A%2F%2Fexample.com%2Fa`): its form-decoded value;
//! 3. anything else (`GET /http://example.com/a?url=b`): the path without
//!    its leading `/`, followed by the whole query string if there is one.
//!    A `url` parameter here belongs to the target, not to the proxy.
//!
//! The result is not normalized.

use axum::http::Uri;

#[must_use]
pub fn requested_url(uri: &Uri) -> String {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return uri.to_string();
    }

    if let (Some(query), "/") = (uri.query(), uri.path()) {
        if let Some((_, value)) = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "url")
        {
            return value.into_owned();
        }
    }

    let path = uri.path().strip_prefix('/').unwrap_or(uri.path());
    match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}
