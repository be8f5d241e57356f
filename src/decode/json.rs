//! JSON decoder for the scroll response shape

use super::PageDecoder;
use crate::error::{Error, Result};
use crate::types::{FetchOutcome, ScrollPage, ScrollRecord};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

/// Decoder for scroll-style JSON search responses.
///
/// Understands the response layout of the scroll protocol: a top-level
/// `error` field, the `_scroll_id` continuation cursor, hits under
/// `hits.hits[]` (with `_id`, `_source`, `_version`), and an optional
/// `aggregations` payload. Payloads deserialize into the caller's `T`;
/// `serde_json::Value` keeps them schemaless.
pub struct JsonPageDecoder<T> {
    _payload: PhantomData<fn() -> T>,
}

impl<T> JsonPageDecoder<T> {
    /// Create a new decoder
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<T> Default for JsonPageDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for JsonPageDecoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonPageDecoder").finish()
    }
}

impl<T: DeserializeOwned> PageDecoder<T> for JsonPageDecoder<T> {
    fn decode(&self, body: &[u8]) -> Result<FetchOutcome<T>> {
        let value: Value = serde_json::from_slice(body).map_err(|e| Error::Decode {
            message: format!("Failed to parse response JSON: {e}"),
        })?;

        if let Some(error) = value.get("error") {
            return Ok(FetchOutcome::Error(error_reason(error)));
        }

        let Some(cursor) = value.get("_scroll_id").and_then(Value::as_str) else {
            return Ok(FetchOutcome::Error(
                "response is missing _scroll_id".to_string(),
            ));
        };

        let hits = value
            .get("hits")
            .and_then(|hits| hits.get("hits"))
            .and_then(Value::as_array);

        let mut records = Vec::new();
        for hit in hits.into_iter().flatten() {
            records.push(decode_hit(hit)?);
        }

        let aggregate = match value.get("aggregations") {
            Some(aggregations) => Some(
                serde_json::from_value(aggregations.clone()).map_err(|e| Error::Decode {
                    message: format!("Failed to deserialize aggregations: {e}"),
                })?,
            ),
            None => None,
        };

        Ok(FetchOutcome::Page(ScrollPage {
            cursor: cursor.to_string(),
            records,
            aggregate,
        }))
    }
}

fn decode_hit<T: DeserializeOwned>(hit: &Value) -> Result<ScrollRecord<T>> {
    let id = hit
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::decode("hit is missing _id"))?;

    let source = hit.get("_source").cloned().unwrap_or(Value::Null);
    let payload = serde_json::from_value(source).map_err(|e| Error::Decode {
        message: format!("Failed to deserialize _source of hit '{id}': {e}"),
    })?;

    let version = hit.get("_version").and_then(Value::as_i64);

    Ok(ScrollRecord {
        id: id.to_string(),
        payload,
        version,
    })
}

/// Render the `error` field into a one-line reason.
fn error_reason(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => match fields.get("reason").and_then(Value::as_str) {
            Some(reason) => reason.to_string(),
            None => error.to_string(),
        },
        other => other.to_string(),
    }
}
