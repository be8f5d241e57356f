//! # scrollstream
//!
//! A demand-driven async stream over scroll-style paginated search APIs
//! (the `_search` / `_search/scroll` protocol). Records are pulled one at
//! a time with strict backpressure, while the fetch for the next page
//! overlaps the consumer's processing of the current one.
//!
//! ## Features
//!
//! - **Pull-based backpressure**: at most one fetch in flight, at most one
//!   page buffered ahead of demand
//! - **Opaque cursor threading**: every continuation carries the latest
//!   `_scroll_id` returned by the service
//! - **Typed payloads**: documents deserialize into any `DeserializeOwned`
//!   type, with `serde_json::Value` as the schemaless fallback
//! - **Pluggable decoding and transport**: trait seams for the page decoder
//!   and the fetch client
//! - **Transport retry**: bounded retries with constant, linear, or
//!   exponential backoff and `Retry-After` support
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//! use scrollstream::{HttpFetchClient, ScrollSource, SearchTarget, SourceSettings};
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> scrollstream::Result<()> {
//!     let client = Arc::new(HttpFetchClient::new("http://localhost:9200")?);
//!
//!     let source: ScrollSource<Value> = ScrollSource::new(
//!         client,
//!         SearchTarget::index("logs"),
//!         SourceSettings::default().with_buffer_size(100),
//!         json!({"query": {"match_all": {}}}),
//!     );
//!
//!     let mut records = source.stream();
//!     while let Some(record) = records.try_next().await? {
//!         println!("{}: {}", record.id, record.payload);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      ScrollSource<T>                       │
//! │      stream() → Stream<Item = Result<ScrollRecord<T>>>    │
//! └────────────────────────────────────────────────────────────┘
//!                  │ pull                      ▲ records
//!                  ▼                           │
//!        ┌───────────────────────────────────────────┐
//!        │   SourceDriver (single-consumer mailbox)  │
//!        │   SourceMachine (cursor, in-flight flag,  │
//!        │   pending pull, one-page prefetch buffer) │
//!        └───────────────────────────────────────────┘
//!                  │ dispatch                  ▲ completion
//!                  ▼                           │
//!        RequestBuilder → FetchClient (retry) → PageDecoder
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Core result types and shared enums
pub mod types;

/// Source settings
pub mod config;

/// Wire-request construction
pub mod request;

/// Response-body interpretation
pub mod decode;

/// HTTP transport with retry
pub mod http;

/// The demand-driven scroll source
pub mod source;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::SourceSettings;
pub use decode::{JsonPageDecoder, PageDecoder};
pub use http::{FetchClient, HttpClientConfig, HttpClientConfigBuilder, HttpFetchClient};
pub use request::{RequestBuilder, ScrollRequest, SearchTarget};
pub use source::{ScrollSource, ScrollStream};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
