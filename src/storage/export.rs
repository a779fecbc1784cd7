use crate::chunker::Chunk;
use crate::document::Document;
use crate::error::ExportError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DOCUMENTS_FILE: &str = "documents.jsonl";
pub const CHUNKS_FILE: &str = "handbook_chunks.jsonl";
pub const EMBEDDING_FILE: &str = "chunks_for_embedding.jsonl";
pub const INDEX_FILE: &str = "chunk_index.json";

/// Section key for chunks whose document has no section
const UNKNOWN_SECTION: &str = "Unknown";

/// Lookup index written next to the chunk files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkIndex {
    pub created_at: DateTime<Utc>,
    pub total_chunks: usize,
    pub chunks_by_section: BTreeMap<String, Vec<String>>,
    pub chunks_by_document: BTreeMap<String, DocumentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub title: String,
    pub chunks: Vec<String>,
}

impl ChunkIndex {
    /// Group chunk ids by section and by document, keeping chunk order
    pub fn build(chunks: &[Chunk]) -> Self {
        let mut chunks_by_section: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut chunks_by_document: BTreeMap<String, DocumentEntry> = BTreeMap::new();

        for chunk in chunks {
            let section = match chunk.metadata.section.as_str() {
                "" => UNKNOWN_SECTION,
                s => s,
            };
            chunks_by_section
                .entry(section.to_string())
                .or_default()
                .push(chunk.id.clone());

            chunks_by_document
                .entry(chunk.metadata.document_id.clone())
                .or_insert_with(|| DocumentEntry {
                    title: chunk.metadata.document_title.clone(),
                    chunks: Vec::new(),
                })
                .chunks
                .push(chunk.id.clone());
        }

        Self {
            created_at: Utc::now(),
            total_chunks: chunks.len(),
            chunks_by_section,
            chunks_by_document,
        }
    }
}

/// Writes documents and chunks as JSON Lines under one output directory
#[derive(Debug, Clone)]
pub struct JsonlExporter {
    output_dir: PathBuf,
}

impl JsonlExporter {
    /// Exporter rooted at `output_dir`, created if missing
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| ExportError::io(&output_dir, e))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn export_documents(
        &self,
        documents: &[Document],
        filename: &str,
    ) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(filename);
        write_jsonl(&path, documents)?;
        info!("Exported {} documents to {}", documents.len(), path.display());
        Ok(path)
    }

    /// Full chunk records, metadata included
    pub fn export_chunks(&self, chunks: &[Chunk], filename: &str) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(filename);
        write_jsonl(&path, chunks)?;
        info!("Exported {} chunks to {}", chunks.len(), path.display());
        Ok(path)
    }

    /// Flat `{id, text, source, title, section}` records
    pub fn export_embedding_format(
        &self,
        chunks: &[Chunk],
        filename: &str,
    ) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(filename);
        let records: Vec<_> = chunks.iter().map(Chunk::to_embedding_record).collect();
        write_jsonl(&path, &records)?;
        info!(
            "Exported {} chunks for embedding to {}",
            chunks.len(),
            path.display()
        );
        Ok(path)
    }

    pub fn create_index(&self, chunks: &[Chunk], filename: &str) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(filename);
        let index = ChunkIndex::build(chunks);

        let file = File::create(&path).map_err(|e| ExportError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &index)?;
        writer.flush().map_err(|e| ExportError::io(&path, e))?;

        info!("Created chunk index at {}", path.display());
        Ok(path)
    }

    pub fn load_documents(path: impl AsRef<Path>) -> Result<Vec<Document>, ExportError> {
        read_jsonl(path.as_ref())
    }

    pub fn load_chunks(path: impl AsRef<Path>) -> Result<Vec<Chunk>, ExportError> {
        read_jsonl(path.as_ref())
    }
}

/// One compact JSON object per line; non-ASCII is written as UTF-8
fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer
            .write_all(b"\n")
            .map_err(|e| ExportError::io(path, e))?;
    }

    writer.flush().map_err(|e| ExportError::io(path, e))
}

fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ExportError> {
    let file = File::open(path).map_err(|e| ExportError::io(path, e))?;
    let mut items = Vec::new();

    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| ExportError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line).map_err(|source| ExportError::Malformed {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        items.push(item);
    }

    Ok(items)
}
