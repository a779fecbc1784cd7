//! On-disk artifacts: JSONL exports and the resumable progress checkpoint.

pub mod checkpoint;
pub mod export;

#[cfg(test)]
mod tests;

pub use checkpoint::{CHECKPOINT_FILE, CheckpointManager, CheckpointStats, ScrapingProgress};
pub use export::{
    CHUNKS_FILE, ChunkIndex, DOCUMENTS_FILE, DocumentEntry, EMBEDDING_FILE, INDEX_FILE,
    JsonlExporter,
};
