//! Executes `HttpRequest` descriptors through a `ureq::Agent`.
//!
//! This is the only module that performs network I/O. `dispatch` stops once
//! response headers are in, which is all the no-callback mode needs; `buffer`
//! drains the body for validation. Every request overrides the agent's
//! `http_status_as_error`, so 4xx/5xx responses always arrive as data.

use tracing::{debug, warn};
use ureq::http::Response;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Agent used when the configuration does not supply one.
///
/// Status codes are returned as data so 4xx/5xx bodies stay readable.
pub(crate) fn default_agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Send `request` and return the response as soon as its headers arrive.
pub(crate) fn dispatch(agent: &Agent, request: &HttpRequest) -> Result<Response<Body>, ApiError> {
    debug!(method = %request.method, url = %request.url, "dispatching request");

    let url = request.url.as_str();
    let headers = request.headers.as_slice();
    let body = request.body.as_deref();

    let result = match request.method {
        HttpMethod::Post => send(with_headers(agent.post(url), headers), body),
        HttpMethod::Put => send(with_headers(agent.put(url), headers), body),
        HttpMethod::Patch => send(with_headers(agent.patch(url), headers), body),
        HttpMethod::Get => call(with_headers(agent.get(url), headers), body),
        HttpMethod::Delete => call(with_headers(agent.delete(url), headers), body),
        HttpMethod::Head => call(with_headers(agent.head(url), headers), body),
        HttpMethod::Options => call(with_headers(agent.options(url), headers), body),
    };

    let response = result.map_err(|err| {
        warn!(url = %request.url, error = %err, "transport failure");
        ApiError::Transport(err)
    })?;

    debug!(url = %request.url, status = response.status().as_u16(), "response headers received");
    Ok(response)
}

/// Drain the whole response body into an `HttpResponse`.
///
/// ureq's default 10 MB read limit is lifted; the body is buffered in full.
pub(crate) fn buffer(mut response: Response<Body>) -> Result<HttpResponse, ApiError> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let bytes = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|err| {
            warn!(status, error = %err, "failed to read response body");
            ApiError::Transport(err)
        })?;

    Ok(HttpResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn with_headers<B>(builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    let mut builder = builder.config().http_status_as_error(false).build();
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(builder: RequestBuilder<WithBody>, body: Option<&str>) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn call(builder: RequestBuilder<WithoutBody>, body: Option<&str>) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
}
