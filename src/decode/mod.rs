//! Response-body interpretation
//!
//! One fetch returns opaque bytes; this module turns them into a
//! [`FetchOutcome`]. The split matters for error routing:
//!
//! - `Err(_)` from [`PageDecoder::decode`] means the body could not be
//!   interpreted at all and is treated like a failed fetch.
//! - `Ok(FetchOutcome::Error(_))` means the body was well-formed but the
//!   service reported a failure inside it.

mod json;

pub use json::JsonPageDecoder;

use crate::error::Result;
use crate::types::FetchOutcome;

/// Trait for interpreting raw page responses
pub trait PageDecoder<T>: Send + Sync {
    /// Decode one response body into a fetch outcome
    fn decode(&self, body: &[u8]) -> Result<FetchOutcome<T>>;
}
