//! Request builder, response validator and dispatch entry points for the
//! feedsme API.
//!
//! # Design
//! `FeedsmeClient` holds only a normalized base URL and a transport agent and
//! carries no mutable state between calls. Every call is split into three
//! steps: `build_request` produces an `HttpRequest`, the transport executes
//! it, and `parse_response` validates the buffered `HttpResponse`. The
//! public entry points differ only in how the single outcome is delivered:
//!
//! - `send` runs on a worker thread and hands the result to an `FnOnce`
//!   callback, which therefore fires exactly once;
//! - `send_blocking` returns the result on the calling thread;
//! - `stream` returns the raw response handle and skips validation.

use std::fmt;
use std::io;
use std::thread::{self, JoinHandle};

use serde_json::Value;
use tracing::warn;
use ureq::http::Response;
use ureq::{Agent, Body};
use url::Url;

use crate::config::ClientOptions;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport;
use crate::types::RequestOptions;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Stateless client for the feedsme build service.
///
/// Cheap to clone; the agent is shared between clones and between concurrent
/// calls.
#[derive(Clone)]
pub struct FeedsmeClient {
    base: Url,
    agent: Agent,
}

impl FeedsmeClient {
    /// Resolve and normalize the base URL.
    ///
    /// Fails with `ApiError::MissingUrl` when the configuration names no URL
    /// and with `ApiError::InvalidUrl` when it cannot be parsed as a base.
    pub fn new(config: impl Into<ClientOptions>) -> Result<Self, ApiError> {
        let config = config.into();
        let base = config.resolve_base()?;
        let agent = config.agent.unwrap_or_else(transport::default_agent);
        Ok(Self { base, agent })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Trigger a change for `environment` and deliver the result to
    /// `on_complete`.
    pub fn change<F>(
        &self,
        environment: &str,
        options: RequestOptions,
        on_complete: F,
    ) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce(Result<Value, ApiError>) + Send + 'static,
    {
        self.send(Some(change_path(environment).as_str()), options, on_complete)
    }

    pub fn change_blocking(&self, environment: &str, options: RequestOptions) -> Result<Value, ApiError> {
        self.send_blocking(Some(change_path(environment).as_str()), options)
    }

    pub fn change_stream(
        &self,
        environment: &str,
        options: RequestOptions,
    ) -> Result<Response<Body>, ApiError> {
        self.stream(Some(change_path(environment).as_str()), options)
    }

    /// Run one round trip on a worker thread.
    ///
    /// `on_complete` receives the parsed JSON body, or the first error among
    /// serialization, transport, unparsable body and non-200 status. The
    /// returned handle only allows waiting; it does not cancel the call.
    ///
    /// Fails only when the worker thread cannot be created, in which case
    /// nothing was sent and `on_complete` is dropped uncalled.
    pub fn send<F>(
        &self,
        pathname: Option<&str>,
        options: RequestOptions,
        on_complete: F,
    ) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce(Result<Value, ApiError>) + Send + 'static,
    {
        let client = self.clone();
        let pathname = pathname.map(str::to_owned);
        thread::Builder::new()
            .name("feedsme-send".to_string())
            .spawn(move || on_complete(client.send_blocking(pathname.as_deref(), options)))
    }

    /// Run one round trip on the calling thread.
    pub fn send_blocking(&self, pathname: Option<&str>, options: RequestOptions) -> Result<Value, ApiError> {
        let request = self.build_request(pathname, options)?;
        let response = transport::dispatch(&self.agent, &request)?;
        self.parse_response(transport::buffer(response)?)
    }

    /// Dispatch the request and return the response handle unread.
    ///
    /// Status and body are left to the caller; only serialization and
    /// transport failures are reported.
    pub fn stream(&self, pathname: Option<&str>, options: RequestOptions) -> Result<Response<Body>, ApiError> {
        let request = self.build_request(pathname, options)?;
        transport::dispatch(&self.agent, &request)
    }

    /// Build the request descriptor for one call without touching the
    /// network.
    ///
    /// The path is `pathname`, else `options.pathname`, else `/`, with empty
    /// strings counting as absent; host and query come from the base URL.
    /// Attached data, or an explicit `POST` / `PUT`, forces
    /// `Content-Type: application/json` and makes `POST` the default method.
    pub fn build_request(
        &self,
        pathname: Option<&str>,
        mut options: RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let mut url = self.base.clone();
        let path = pathname
            .filter(|p| !p.is_empty())
            .or(options.pathname.as_deref().filter(|p| !p.is_empty()))
            .unwrap_or("/");
        url.set_path(path);

        let data = options.take_data().transpose().map_err(ApiError::Serialization)?;
        let json = data.is_some() || options.method.is_some_and(HttpMethod::requires_json);

        let method = match options.method {
            Some(method) => method,
            None if json => HttpMethod::Post,
            None => HttpMethod::Get,
        };

        let mut headers = options.headers;
        if json {
            headers.retain(|(name, _)| !name.eq_ignore_ascii_case("content-type"));
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }

        let body = data
            .map(|value| serde_json::to_string(&value))
            .transpose()
            .map_err(ApiError::Serialization)?;

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Validate a buffered response.
    ///
    /// A missing or falsy JSON body is reported before the status code is
    /// looked at, so a non-200 with garbage reads as unparsable.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        let status = response.status;
        let body = match serde_json::from_str::<Value>(&response.body) {
            Ok(body) if !is_falsy(&body) => body,
            _ => {
                warn!(status, "unparsable response body");
                return Err(ApiError::UnparsableResponse { status });
            }
        };

        if status != 200 {
            let message = server_message(&body).unwrap_or_else(|| format!("Invalid status code {status}"));
            warn!(status, %message, "request rejected");
            return Err(ApiError::Status { status, message });
        }

        Ok(body)
    }
}

impl fmt::Debug for FeedsmeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedsmeClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

fn change_path(environment: &str) -> String {
    format!("change/{environment}")
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// The body's `message` field, when it is truthy.
fn server_message(body: &Value) -> Option<String> {
    match body.get("message")? {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::String(_) => None,
        other if is_falsy(other) => None,
        other => Some(other.to_string()),
    }
}
