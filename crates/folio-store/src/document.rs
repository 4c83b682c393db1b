//! Records returned by and handed to the store

use folio_codec::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated metadata record, `id` included
pub type Record = Metadata;

/// A single document as served: normalized metadata plus rendered body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Validated, qualified metadata with `id`
    pub metadata: Record,
    /// Rendered HTML body
    pub content: String,
}

impl DocumentRecord {
    /// Document identity
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.metadata.get("id").and_then(Value::as_str)
    }
}

/// Input for creating a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDocument {
    /// Caller supplied metadata
    pub metadata: Metadata,
    /// Markdown body
    pub body: String,
    /// Author stamp, overrides any `author` in `metadata`
    pub author: Option<String>,
    /// Fields the create path fixes regardless of input
    pub fixed: Vec<(String, Value)>,
}

impl NewDocument {
    /// Document from metadata and body
    #[must_use]
    pub fn new(metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
            ..Self::default()
        }
    }

    /// Stamp the author
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Force a field value
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fixed.push((key.into(), value.into()));
        self
    }

    /// Metadata with fixed fields and the author stamp applied
    pub(crate) fn stamped_metadata(&self) -> Metadata {
        let mut metadata = self.metadata.clone();
        for (key, value) in &self.fixed {
            metadata.insert(key.clone(), value.clone());
        }
        if let Some(author) = &self.author {
            metadata.insert("author".into(), Value::String(author.clone()));
        }
        metadata
    }
}

/// Partial update: absent parts are left byte-for-byte as they are
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    /// Metadata merged over the stored block
    pub metadata: Option<Metadata>,
    /// Replacement markdown body
    pub body: Option<String>,
}

impl DocumentPatch {
    /// Patch of metadata only
    #[must_use]
    pub fn metadata(metadata: Metadata) -> Self {
        Self {
            metadata: Some(metadata),
            body: None,
        }
    }

    /// Patch of body only
    #[must_use]
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            metadata: None,
            body: Some(body.into()),
        }
    }

    /// Also replace the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metadata.as_ref().map_or(true, Metadata::is_empty) && self.body.is_none()
    }
}
