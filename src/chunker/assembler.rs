use super::chunk::{Chunk, ChunkSource};
use super::headings::HeadingIndex;
use super::overlap::inject_overlap;
use super::splitter::{ParagraphSplitter, Segment};
use super::token::TokenCounter;
use crate::config::ChunkConfig;
use crate::document::Document;
use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Splits documents into chunks suitable for RAG embedding.
///
/// Holds no per-document state, so one instance can serve many threads.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
    counter: TokenCounter,
}

impl Chunker {
    /// Chunker with the best available token counter
    pub fn new(config: ChunkConfig) -> Self {
        Self::with_counter(config, TokenCounter::detect())
    }

    pub fn with_counter(config: ChunkConfig, counter: TokenCounter) -> Self {
        Self { config, counter }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// Raw segments of `text`, before overlap and heading context
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        ParagraphSplitter::new(&self.counter, self.config.chunk_size).split(text)
    }

    /// Split a document into chunks.
    ///
    /// All segments are produced before any chunk is built, since every chunk
    /// records the document's total. Blank documents yield no chunks.
    pub fn chunk_document(&self, document: &Document) -> Vec<Chunk> {
        if document.is_blank() {
            warn!("Empty document: {}", document.id);
            return Vec::new();
        }

        let text = document.content.as_str();
        let segments = inject_overlap(self.segments(text), self.config.chunk_overlap);
        let headings = HeadingIndex::new(text);
        let total = segments.len();
        let extraction_date = Utc::now();
        let source = ChunkSource {
            document_id: &document.id,
            document_title: &document.metadata.title,
            source_url: &document.metadata.source_url,
            section: &document.metadata.section,
            subsection: document.metadata.subsection.as_deref(),
        };

        let chunks: Vec<Chunk> = segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| {
                let heading_path = headings.headings_before(segment.start_offset);
                let text = if self.config.preserve_headings && !heading_path.is_empty() {
                    format!("[Context: {}]\n\n{}", heading_path.join(" > "), segment.text)
                } else {
                    segment.text
                };
                Chunk::build(source, text, index, total, heading_path, extraction_date)
            })
            .collect();

        debug!(
            "Created {} chunks from document '{}'",
            chunks.len(),
            document.metadata.title
        );
        chunks
    }

    /// Chunk documents one after another, keeping input order
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| self.chunk_document(doc))
            .collect();

        info!(
            "Created {} total chunks from {} documents",
            chunks.len(),
            documents.len()
        );
        chunks
    }

    /// Chunk documents across the rayon pool, keeping input order
    pub fn chunk_documents_par(&self, documents: &[Document]) -> Vec<Chunk> {
        let per_document: Vec<Vec<Chunk>> = documents
            .par_iter()
            .map(|doc| self.chunk_document(doc))
            .collect();
        let chunks: Vec<Chunk> = per_document.into_iter().flatten().collect();

        info!(
            "Created {} total chunks from {} documents (parallel)",
            chunks.len(),
            documents.len()
        );
        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}
