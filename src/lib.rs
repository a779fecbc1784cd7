// Public API exports
pub mod chunker;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod normalizer;
pub mod storage;
pub mod timestamp;

// Re-export main types for convenience
pub use chunker::{Chunk, ChunkMetadata, Chunker, EmbeddingRecord, TokenCounter, TokenizerKind};

pub use config::{ChunkConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, PipelineConfig};

pub use document::{Document, DocumentMetadata};

pub use error::{CheckpointError, ConfigError, ExportError};

pub use normalizer::TextNormalizer;

pub use storage::{CheckpointManager, CheckpointStats, ChunkIndex, JsonlExporter, ScrapingProgress};
