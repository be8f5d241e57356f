//! Configuration types for scroll sources
//!
//! Tuning knobs for a scroll source. Settings only fill gaps: a value the
//! caller already put into the search params always wins over a default
//! injected from here.

use serde::{Deserialize, Serialize};

// ============================================================================
// Source Settings
// ============================================================================

/// Settings for a scroll source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSettings {
    /// Page size requested from the service (`size` in the search body)
    /// and the bound on records fetched ahead of demand per page
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Ask the service for document versions and carry them on records
    #[serde(default)]
    pub include_document_version: bool,

    /// Scroll-context keep-alive, sent as the `scroll` query parameter
    /// and in continuation bodies
    #[serde(default = "default_scroll_keep_alive")]
    pub scroll_keep_alive: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            include_document_version: false,
            scroll_keep_alive: default_scroll_keep_alive(),
        }
    }
}

fn default_buffer_size() -> usize {
    10
}

fn default_scroll_keep_alive() -> String {
    "5m".to_string()
}

impl SourceSettings {
    /// Create settings with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Request document versions on records
    #[must_use]
    pub fn with_document_version(mut self, include: bool) -> Self {
        self.include_document_version = include;
        self
    }

    /// Set the scroll-context keep-alive
    #[must_use]
    pub fn with_scroll_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.scroll_keep_alive = keep_alive.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SourceSettings::default();
        assert_eq!(settings.buffer_size, 10);
        assert!(!settings.include_document_version);
        assert_eq!(settings.scroll_keep_alive, "5m");
    }

    #[test]
    fn test_builders() {
        let settings = SourceSettings::new()
            .with_buffer_size(50)
            .with_document_version(true)
            .with_scroll_keep_alive("1m");
        assert_eq!(settings.buffer_size, 50);
        assert!(settings.include_document_version);
        assert_eq!(settings.scroll_keep_alive, "1m");
    }

    #[test]
    fn test_serde_camel_case_keys() {
        let settings: SourceSettings = serde_json::from_str(
            r#"{"bufferSize": 25, "includeDocumentVersion": true}"#,
        )
        .unwrap();
        assert_eq!(settings.buffer_size, 25);
        assert!(settings.include_document_version);
        assert_eq!(settings.scroll_keep_alive, "5m");
    }

    #[test]
    fn test_serde_empty_object_uses_defaults() {
        let settings: SourceSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SourceSettings::default());
    }
}
