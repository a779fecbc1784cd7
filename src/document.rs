use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Length of the hex prefix used as a document id
const DOCUMENT_ID_LEN: usize = 12;

/// An extracted, cleaned document. The chunker reads it and never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier derived from the source URL
    pub id: String,
    /// Plain text content, already cleaned and normalized
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Metadata attached to an extracted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source_url: String,
    pub title: String,
    /// Handbook section name
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub subsection: Option<String>,
    /// "page", "pdf", "book", "folder", ...
    pub content_type: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now", deserialize_with = "timestamp::deserialize")]
    pub extraction_date: DateTime<Utc>,
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl Document {
    /// Build a document whose id is derived from `source_url`
    pub fn create(
        source_url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        content_type: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        let source_url = source_url.into();
        let content = content.into();

        Self {
            id: document_id(&source_url),
            metadata: DocumentMetadata {
                title: title.into(),
                section: section.into(),
                subsection: None,
                content_type: content_type.into(),
                last_modified: None,
                extraction_date: Utc::now(),
                word_count: word_count(&content),
                parent_id: None,
                source_url,
            },
            content,
        }
    }

    /// Return a copy with replaced content and a refreshed word count
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        let content = content.into();
        let mut doc = self.clone();
        doc.metadata.word_count = word_count(&content);
        doc.content = content;
        doc
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Derive a document id from its URL: first 12 hex chars of its MD5, the
/// same ids the scraper's own exports and checkpoints use
pub fn document_id(source_url: &str) -> String {
    let digest = hex::encode(md5::compute(source_url.as_bytes()).0);
    digest[..DOCUMENT_ID_LEN].to_string()
}

/// Number of whitespace-delimited words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
