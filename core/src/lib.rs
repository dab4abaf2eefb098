//! HTTP client for the feedsme build-orchestration service.
//!
//! # Overview
//! Triggers build "change" events for an environment and validates the JSON
//! answer. Every call is one stateless round trip: resolve the path against
//! the base URL, optionally attach a JSON body, dispatch through a
//! `ureq::Agent`, then check the status and parse the body.
//!
//! # Design
//! - `FeedsmeClient` is immutable after construction; it holds the
//!   normalized base URL and the agent, and is safe to share across threads.
//! - Requests are built as plain `HttpRequest` values and responses parsed
//!   from plain `HttpResponse` values, so request construction and
//!   validation are testable without a network.
//! - Callback mode takes an `FnOnce`, which is invoked exactly once per call.
//! - There are no retries; callers own retry policy.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
mod transport;
pub mod types;

pub use client::FeedsmeClient;
pub use config::ClientOptions;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::RequestOptions;
pub use ureq;
