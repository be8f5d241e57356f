//! HTTP transport module
//!
//! Dispatches scroll requests over HTTP with:
//! - Automatic retries with configurable backoff
//! - `Retry-After` support on throttling responses
//! - Error classification for retry decisions
//!
//! The trait seam keeps the rest of the crate transport-agnostic; tests
//! substitute scripted clients for the reqwest-backed one.

mod client;

pub use client::{HttpClientConfig, HttpClientConfigBuilder, HttpFetchClient};

use crate::error::Result;
use crate::request::ScrollRequest;
use async_trait::async_trait;
use bytes::Bytes;

/// Trait for dispatching one scroll request
///
/// A dispatch resolves exactly once: to the raw response body on success,
/// or to an error after the transport gave up. Retry policy lives behind
/// this seam; callers never retry.
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// Dispatch one request and return the raw response body
    async fn dispatch(&self, request: ScrollRequest) -> Result<Bytes>;
}
