//! HTTP client construction for the profiling platform backend.
//!
//! Builds a `reqwest` client from transport options and applies
//! per-request header configuration.

use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;

use crate::options::{HttpTransport, TransportOptions};

/// Build a configured HTTP client from transport options.
///
/// Applies common configuration like timeouts and proxies. Note that the
/// timeout covers the whole request, including the time spent reading the
/// streamed body; analysis sessions can run for minutes, so callers
/// typically either leave it unset or set it generously.
pub fn build_http_client(
    transport_options: &TransportOptions<HttpTransport>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.provider.proxy {
        if let Ok(proxy) = reqwest::Proxy::all(proxy_url) {
            builder = builder.proxy(proxy);
        }
    }

    builder.build()
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}
