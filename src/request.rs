//! Wire-request construction for the scroll protocol
//!
//! Builds the two request shapes a scroll uses: the initial search
//! (`POST /{index}/_search`, or `POST /{index}/{doc_type}/_search` when a
//! secondary type is set) and the continuation (`POST /_search/scroll`).
//! Requests come out as plain data so tests can assert on them without a
//! server and any transport can dispatch them.

use crate::config::SourceSettings;
use crate::error::{Error, Result};
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Query parameter asking the service for stable, index-order pagination.
const SORT_PARAM: &str = "_doc";

// ============================================================================
// Search Target
// ============================================================================

/// What to search: an index and an optional secondary type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    /// Index name
    pub index: String,
    /// Secondary type identifier, for services that still use typed indices
    pub doc_type: Option<String>,
}

impl SearchTarget {
    /// Target an index
    pub fn index(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: None,
        }
    }

    /// Set the secondary type identifier
    #[must_use]
    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }
}

// ============================================================================
// Scroll Request
// ============================================================================

/// A fully-determined request, ready for any transport to dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRequest {
    /// HTTP method
    pub method: Method,
    /// Request path, starting with `/`
    pub path: String,
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// JSON body
    pub body: Value,
}

// ============================================================================
// Request Builder
// ============================================================================

/// Builds initial-search and continuation requests for one scroll
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    target: SearchTarget,
    settings: SourceSettings,
    search_params: Value,
}

impl RequestBuilder {
    /// Create a builder for one scroll.
    ///
    /// `search_params` is the caller's search body, an opaque JSON object
    /// (the query DSL is never interpreted here).
    pub fn new(target: SearchTarget, settings: SourceSettings, search_params: Value) -> Self {
        Self {
            target,
            settings,
            search_params,
        }
    }

    /// Build the next request of the scroll.
    ///
    /// `cursor == None` means no query has been issued yet and produces the
    /// initial search; a set cursor produces the continuation shape. Errors
    /// here travel the same terminal path as a failed fetch.
    pub fn build(&self, cursor: Option<&str>) -> Result<ScrollRequest> {
        match cursor {
            None => self.build_initial(),
            Some(cursor) => Ok(self.build_continuation(cursor)),
        }
    }

    fn build_initial(&self) -> Result<ScrollRequest> {
        if self.target.index.is_empty() {
            return Err(Error::request("index name is empty"));
        }

        let mut body = match &self.search_params {
            Value::Object(map) => map.clone(),
            other => {
                return Err(Error::request(format!(
                    "search params must be a JSON object, got {}",
                    json_type_name(other)
                )))
            }
        };

        // Defaults fill gaps only; caller-supplied keys always win.
        body.entry("size")
            .or_insert_with(|| json!(self.settings.buffer_size));
        if self.settings.include_document_version {
            body.entry("version").or_insert(Value::Bool(true));
        }

        let path = match &self.target.doc_type {
            Some(doc_type) => format!("/{}/{}/_search", self.target.index, doc_type),
            None => format!("/{}/_search", self.target.index),
        };

        let mut query = HashMap::new();
        query.insert("scroll".to_string(), self.settings.scroll_keep_alive.clone());
        query.insert("sort".to_string(), SORT_PARAM.to_string());

        Ok(ScrollRequest {
            method: Method::POST,
            path,
            query,
            headers: json_headers(),
            body: Value::Object(body),
        })
    }

    fn build_continuation(&self, cursor: &str) -> ScrollRequest {
        ScrollRequest {
            method: Method::POST,
            path: "/_search/scroll".to_string(),
            query: HashMap::new(),
            headers: json_headers(),
            body: json!({
                "scroll": self.settings.scroll_keep_alive,
                "scroll_id": cursor,
            }),
        }
    }
}

fn json_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn builder(settings: SourceSettings) -> RequestBuilder {
        RequestBuilder::new(
            SearchTarget::index("logs"),
            settings,
            json!({"query": {"match_all": {}}}),
        )
    }

    #[test_case(None, "/logs/_search" ; "index only")]
    #[test_case(Some("event"), "/logs/event/_search" ; "index and doc type")]
    fn test_initial_path_shapes(doc_type: Option<&str>, expected: &str) {
        let mut target = SearchTarget::index("logs");
        if let Some(doc_type) = doc_type {
            target = target.with_doc_type(doc_type);
        }
        let builder = RequestBuilder::new(target, SourceSettings::default(), json!({}));
        let request = builder.build(None).unwrap();
        assert_eq!(request.path, expected);
        assert_eq!(request.method, Method::POST);
    }

    #[test]
    fn test_initial_query_params_and_headers() {
        let request = builder(SourceSettings::default()).build(None).unwrap();
        assert_eq!(request.query.get("scroll").unwrap(), "5m");
        assert_eq!(request.query.get("sort").unwrap(), "_doc");
        assert_eq!(
            request.headers.get("Content-Type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_initial_body_injects_size_default() {
        let request = builder(SourceSettings::default()).build(None).unwrap();
        assert_eq!(request.body["size"], json!(10));
        assert_eq!(request.body["query"], json!({"match_all": {}}));
    }

    #[test]
    fn test_caller_size_wins_over_settings() {
        let builder = RequestBuilder::new(
            SearchTarget::index("logs"),
            SourceSettings::default().with_buffer_size(50),
            json!({"size": 3}),
        );
        let request = builder.build(None).unwrap();
        assert_eq!(request.body["size"], json!(3));
    }

    #[test]
    fn test_version_flag_injected_only_when_requested() {
        let request = builder(SourceSettings::default()).build(None).unwrap();
        assert!(request.body.get("version").is_none());

        let request = builder(SourceSettings::default().with_document_version(true))
            .build(None)
            .unwrap();
        assert_eq!(request.body["version"], json!(true));
    }

    #[test]
    fn test_caller_version_wins_over_settings() {
        let builder = RequestBuilder::new(
            SearchTarget::index("logs"),
            SourceSettings::default().with_document_version(true),
            json!({"version": false}),
        );
        let request = builder.build(None).unwrap();
        assert_eq!(request.body["version"], json!(false));
    }

    #[test]
    fn test_continuation_shape() {
        let request = builder(SourceSettings::default())
            .build(Some("cursor-abc"))
            .unwrap();
        assert_eq!(request.path, "/_search/scroll");
        assert!(request.query.is_empty());
        assert_eq!(
            request.body,
            json!({"scroll": "5m", "scroll_id": "cursor-abc"})
        );
    }

    #[test]
    fn test_keep_alive_setting_threads_through_both_shapes() {
        let settings = SourceSettings::default().with_scroll_keep_alive("90s");
        let initial = builder(settings.clone()).build(None).unwrap();
        assert_eq!(initial.query.get("scroll").unwrap(), "90s");

        let continuation = builder(settings).build(Some("c")).unwrap();
        assert_eq!(continuation.body["scroll"], json!("90s"));
    }

    #[test]
    fn test_empty_index_rejected() {
        let builder =
            RequestBuilder::new(SearchTarget::index(""), SourceSettings::default(), json!({}));
        let err = builder.build(None).unwrap_err();
        assert!(matches!(err, Error::Request { .. }));
    }

    #[test]
    fn test_non_object_search_params_rejected() {
        let builder = RequestBuilder::new(
            SearchTarget::index("logs"),
            SourceSettings::default(),
            json!([1, 2, 3]),
        );
        let err = builder.build(None).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_builds_do_not_mutate_caller_params() {
        let b = builder(SourceSettings::default());
        let first = b.build(None).unwrap();
        let second = b.build(None).unwrap();
        assert_eq!(first, second);
    }
}
