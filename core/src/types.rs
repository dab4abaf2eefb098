//! Per-call request options.
//!
//! # Design
//! `RequestOptions` is consumed by value on every call, so nothing set for
//! one request can leak into the next. The payload is converted to a
//! `serde_json::Value` as soon as it is attached; a conversion failure is
//! kept and reported when the request is built, so it reaches the caller
//! through the same single result as every other per-call error.

use serde::Serialize;
use serde_json::Value;

use crate::http::HttpMethod;

/// Options recognized by `FeedsmeClient::send` and friends.
#[derive(Debug, Default)]
pub struct RequestOptions {
    /// Explicit method. Defaults to `GET`, or `POST` when a JSON body is
    /// implied.
    pub method: Option<HttpMethod>,
    /// Extra headers, sent in order.
    pub headers: Vec<(String, String)>,
    /// Request path, used when no explicit pathname is passed to the call.
    pub pathname: Option<String>,
    data: Option<serde_json::Result<Value>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = Some(pathname.into());
        self
    }

    /// Attach a JSON body.
    pub fn data<T: Serialize + ?Sized>(mut self, data: &T) -> Self {
        self.data = Some(serde_json::to_value(data));
        self
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub(crate) fn take_data(&mut self) -> Option<serde_json::Result<Value>> {
        self.data.take()
    }
}
