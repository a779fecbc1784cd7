use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chunk of text ready for embedding/indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// `{document_id}_chunk_{index}`
    pub id: String,
    /// Final text, including overlap and heading context
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Metadata for a chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source_url: String,
    pub document_id: String,
    pub document_title: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub subsection: Option<String>,
    /// Headings open at the segment start, outermost first
    #[serde(default)]
    pub heading_path: Vec<String>,
    pub chunk_index: usize,
    pub total_chunks_in_doc: usize,
    /// Unicode scalar values in `text`
    pub char_count: usize,
    /// Whitespace-delimited words in `text`
    pub word_count: usize,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub extraction_date: DateTime<Utc>,
    /// Hex MD5 of `text`, for deduplication
    pub content_hash: String,
}

/// Flattened record consumed by the embedding pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub text: String,
    pub source: String,
    pub title: String,
    pub section: String,
}

/// Document-level fields copied onto every chunk
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChunkSource<'a> {
    pub document_id: &'a str,
    pub document_title: &'a str,
    pub source_url: &'a str,
    pub section: &'a str,
    pub subsection: Option<&'a str>,
}

impl Chunk {
    pub(crate) fn build(
        source: ChunkSource<'_>,
        text: String,
        chunk_index: usize,
        total_chunks: usize,
        heading_path: Vec<String>,
        extraction_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: chunk_id(source.document_id, chunk_index),
            metadata: ChunkMetadata {
                source_url: source.source_url.to_string(),
                document_id: source.document_id.to_string(),
                document_title: source.document_title.to_string(),
                section: source.section.to_string(),
                subsection: source.subsection.map(str::to_string),
                heading_path,
                chunk_index,
                total_chunks_in_doc: total_chunks,
                char_count: text.chars().count(),
                word_count: text.split_whitespace().count(),
                extraction_date,
                content_hash: content_hash(&text),
            },
            text,
        }
    }

    /// Format for embedding pipeline input
    pub fn to_embedding_record(&self) -> EmbeddingRecord {
        EmbeddingRecord {
            id: self.id.clone(),
            text: self.text.clone(),
            source: self.metadata.source_url.clone(),
            title: self.metadata.document_title.clone(),
            section: self.metadata.section.clone(),
        }
    }
}

/// Deterministic chunk id
pub fn chunk_id(document_id: &str, chunk_index: usize) -> String {
    format!("{}_chunk_{}", document_id, chunk_index)
}

/// Hex MD5 of the chunk text
pub fn content_hash(text: &str) -> String {
    hex::encode(md5::compute(text.as_bytes()).0)
}
