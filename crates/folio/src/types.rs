use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form metadata attached to a [`Document`].
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Metadata key holding the blob source identifier.
pub const SOURCE_KEY: &str = "source";
/// Metadata key holding the 0-indexed page number.
pub const PAGE_KEY: &str = "page";

/// One extracted text unit, usually a single PDF page.
///
/// Documents returned from a cache hit carry the whole concatenated text and
/// empty metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    page_content: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: Metadata,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(page_content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            page_content: page_content.into(),
            metadata,
        }
    }

    /// A page document with `{source, page}` metadata.
    pub fn for_page(page_content: impl Into<String>, source: &str, page_index: usize) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(SOURCE_KEY.to_string(), serde_json::Value::from(source));
        metadata.insert(PAGE_KEY.to_string(), serde_json::Value::from(page_index));
        Self::with_metadata(page_content, metadata)
    }

    pub fn page_content(&self) -> &str {
        &self.page_content
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn into_page_content(self) -> String {
        self.page_content
    }

    pub fn page(&self) -> Option<usize> {
        self.metadata
            .get(PAGE_KEY)
            .and_then(serde_json::Value::as_u64)
            .map(|page| page as usize)
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(serde_json::Value::as_str)
    }
}
