//! Core types for scrollstream
//!
//! Typed results flowing out of a scroll source, plus shared enums used
//! across modules. A completed fetch is always expressed as data
//! (`FetchOutcome`): a decoded page and a service-reported error are two
//! variants of the same type, never an exception channel.

use serde::{Deserialize, Serialize};

// ============================================================================
// Scroll Results
// ============================================================================

/// One record pulled from the search service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollRecord<T> {
    /// Document identifier (`_id`)
    pub id: String,
    /// Deserialized document payload (`_source`)
    pub payload: T,
    /// Document version (`_version`), when the service reports one
    pub version: Option<i64>,
}

impl<T> ScrollRecord<T> {
    /// Create a record without a version
    pub fn new(id: impl Into<String>, payload: T) -> Self {
        Self {
            id: id.into(),
            payload,
            version: None,
        }
    }

    /// Create a record carrying a document version
    pub fn with_version(id: impl Into<String>, payload: T, version: i64) -> Self {
        Self {
            id: id.into(),
            payload,
            version: Some(version),
        }
    }
}

/// One decoded page of a scroll
///
/// `cursor` is the opaque continuation token for the next fetch, exactly as
/// the service returned it. `records` preserve service order. `aggregate`
/// carries the aggregations payload when the search requested one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollPage<T> {
    /// Continuation cursor (`_scroll_id`)
    pub cursor: String,
    /// Hits of this page, in service order
    pub records: Vec<ScrollRecord<T>>,
    /// Aggregations payload, when present
    pub aggregate: Option<T>,
}

impl<T> ScrollPage<T> {
    /// Create a page with records and no aggregate
    pub fn new(cursor: impl Into<String>, records: Vec<ScrollRecord<T>>) -> Self {
        Self {
            cursor: cursor.into(),
            records,
            aggregate: None,
        }
    }

    /// True when the page carries neither records nor an aggregate
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.aggregate.is_none()
    }
}

/// What one completed fetch means
///
/// `Error` is a well-formed response in which the service reported a
/// failure; it never carries a cursor or records. A body that cannot be
/// interpreted at all is not an outcome, it is a decode `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// The service reported an error inside the response body
    Error(String),
    /// A decoded page
    Page(ScrollPage<T>),
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for transport retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
