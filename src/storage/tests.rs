use super::*;
use crate::chunker::{Chunker, TokenCounter};
use crate::config::ChunkConfig;
use crate::document::Document;
use crate::error::ExportError;
use std::fs;
use tempfile::TempDir;

fn sample_documents() -> Vec<Document> {
    vec![
        Document::create(
            "https://portal.example.ac.uk/handbook/assessment",
            "Assessment",
            "# Assessment\n\nCoursework is submitted online.\n\nLate work is capped.",
            "page",
            "Handbook",
        ),
        Document::create(
            "https://portal.example.ac.uk/handbook/fees",
            "Fees – 2024/25",
            "Tuition fees are payable in two instalments. Café vouchers are not accepted.",
            "page",
            "",
        ),
    ]
}

fn sample_chunks(docs: &[Document]) -> Vec<crate::chunker::Chunk> {
    Chunker::with_counter(ChunkConfig::new(6, 2), TokenCounter::words()).chunk_documents(docs)
}

#[test]
fn test_exporter_creates_output_dir() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("nested").join("chunks");

    let exporter = JsonlExporter::new(&dir).unwrap();
    assert!(dir.is_dir());
    assert_eq!(exporter.output_dir(), dir.as_path());
}

#[test]
fn test_documents_round_trip() {
    let tmp = TempDir::new().unwrap();
    let exporter = JsonlExporter::new(tmp.path()).unwrap();
    let docs = sample_documents();

    let path = exporter.export_documents(&docs, DOCUMENTS_FILE).unwrap();
    assert_eq!(path, tmp.path().join(DOCUMENTS_FILE));

    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 2);
    // non-ASCII stays readable
    assert!(raw.contains("Café"));

    let loaded = JsonlExporter::load_documents(&path).unwrap();
    assert_eq!(loaded, docs);
}

#[test]
fn test_chunks_round_trip() {
    let tmp = TempDir::new().unwrap();
    let exporter = JsonlExporter::new(tmp.path()).unwrap();
    let chunks = sample_chunks(&sample_documents());

    let path = exporter.export_chunks(&chunks, CHUNKS_FILE).unwrap();
    let loaded = JsonlExporter::load_chunks(&path).unwrap();
    assert_eq!(loaded, chunks);
}

#[test]
fn test_embedding_format_is_flat() {
    let tmp = TempDir::new().unwrap();
    let exporter = JsonlExporter::new(tmp.path()).unwrap();
    let chunks = sample_chunks(&sample_documents());

    let path = exporter.export_embedding_format(&chunks, EMBEDDING_FILE).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    let first: serde_json::Value = serde_json::from_str(raw.lines().next().unwrap()).unwrap();

    let mut keys: Vec<&str> = first.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["id", "section", "source", "text", "title"]);
    assert_eq!(first["id"], chunks[0].id.as_str());
    assert_eq!(raw.lines().count(), chunks.len());
}

#[test]
fn test_index_groups_chunks() {
    let tmp = TempDir::new().unwrap();
    let exporter = JsonlExporter::new(tmp.path()).unwrap();
    let docs = sample_documents();
    let chunks = sample_chunks(&docs);

    let path = exporter.create_index(&chunks, INDEX_FILE).unwrap();
    let index: ChunkIndex = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(index.total_chunks, chunks.len());

    let fees_ids: Vec<String> = chunks
        .iter()
        .filter(|c| c.metadata.document_id == docs[1].id)
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(index.chunks_by_section["Unknown"], fees_ids);
    assert!(index.chunks_by_section.contains_key("Handbook"));

    let entry = &index.chunks_by_document[&docs[1].id];
    assert_eq!(entry.title, "Fees – 2024/25");
    assert_eq!(entry.chunks, fees_ids);
}

#[test]
fn test_load_skips_blank_lines() {
    let tmp = TempDir::new().unwrap();
    let exporter = JsonlExporter::new(tmp.path()).unwrap();
    let path = exporter
        .export_documents(&sample_documents(), DOCUMENTS_FILE)
        .unwrap();

    let padded = format!("\n{}\n   \n", fs::read_to_string(&path).unwrap());
    fs::write(&path, padded).unwrap();

    assert_eq!(JsonlExporter::load_documents(&path).unwrap().len(), 2);
}

#[test]
fn test_load_reports_malformed_line() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.jsonl");
    fs::write(&path, "{\"id\": \"x\"\nnot json\n").unwrap();

    match JsonlExporter::load_chunks(&path) {
        Err(ExportError::Malformed { line, .. }) => assert_eq!(line, 1),
        other => panic!("expected malformed error, got {:?}", other),
    }
}

#[test]
fn test_load_missing_file() {
    let tmp = TempDir::new().unwrap();
    let result = JsonlExporter::load_documents(tmp.path().join("missing.jsonl"));
    assert!(matches!(result, Err(ExportError::Io { .. })));
}

#[test]
fn test_load_documents_with_naive_timestamps() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(DOCUMENTS_FILE);
    let line = r##"{"id": "abc123def456", "content": "# Fees\n\nPay online.", "raw_html": "<h1>Fees</h1>", "metadata": {"source_url": "https://portal.example.ac.uk/fees", "title": "Fees", "section": "Handbook", "subsection": null, "content_type": "page", "last_modified": "2023-12-01T09:00:00", "extraction_date": "2024-01-15T10:30:00.123456", "word_count": 4, "parent_id": null}}"##;
    fs::write(&path, format!("{}\n", line)).unwrap();

    let docs = JsonlExporter::load_documents(&path).unwrap();
    assert_eq!(docs.len(), 1);

    let meta = &docs[0].metadata;
    assert_eq!(
        meta.extraction_date.to_rfc3339(),
        "2024-01-15T10:30:00.123456+00:00"
    );
    assert_eq!(
        meta.last_modified.unwrap().to_rfc3339(),
        "2023-12-01T09:00:00+00:00"
    );

    let chunks = Chunker::with_counter(ChunkConfig::new(50, 0), TokenCounter::words())
        .chunk_documents(&docs);
    assert_eq!(chunks.len(), 1);
}

#[test]
fn test_load_chunks_with_naive_timestamp() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(CHUNKS_FILE);
    let line = r#"{"id": "abc_chunk_0", "text": "Pay online.", "metadata": {"source_url": "u", "document_id": "abc", "document_title": "Fees", "section": "", "subsection": null, "heading_path": [], "chunk_index": 0, "total_chunks_in_doc": 1, "char_count": 11, "word_count": 2, "extraction_date": "2024-01-15T10:30:00", "content_hash": "x"}}"#;
    fs::write(&path, format!("{}\n", line)).unwrap();

    let chunks = JsonlExporter::load_chunks(&path).unwrap();
    assert_eq!(
        chunks[0].metadata.extraction_date.to_rfc3339(),
        "2024-01-15T10:30:00+00:00"
    );
}

#[test]
fn test_load_rejects_unparseable_timestamp() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(DOCUMENTS_FILE);
    let line = r#"{"id": "a", "content": "x", "metadata": {"source_url": "u", "title": "t", "content_type": "page", "extraction_date": "last tuesday"}}"#;
    fs::write(&path, format!("{}\n", line)).unwrap();

    assert!(matches!(
        JsonlExporter::load_documents(&path),
        Err(ExportError::Malformed { line: 1, .. })
    ));
}

#[test]
fn test_checkpoint_missing_file_loads_none() {
    let tmp = TempDir::new().unwrap();
    let mut manager = CheckpointManager::new(tmp.path()).unwrap();

    assert!(manager.load().is_none());
    assert!(manager.stats().is_none());
    assert!(!manager.is_processed("https://example.com"));
}

#[test]
fn test_checkpoint_corrupt_file_loads_none() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(CHECKPOINT_FILE), "{ not valid").unwrap();

    let mut manager = CheckpointManager::new(tmp.path()).unwrap();
    assert!(manager.load().is_none());
}

#[test]
fn test_checkpoint_persists_progress() {
    let tmp = TempDir::new().unwrap();
    let mut manager = CheckpointManager::new(tmp.path()).unwrap();

    manager.start_new(10).unwrap();
    manager.update_section("Handbook").unwrap();
    manager.mark_processed("https://a").unwrap();
    manager.mark_processed("https://b").unwrap();
    manager.mark_failed("https://c").unwrap();
    assert!(manager.checkpoint_file().exists());

    let mut reloaded = CheckpointManager::new(tmp.path()).unwrap();
    let progress = reloaded.load().unwrap().clone();
    assert_eq!(progress.total_resources, 10);
    assert_eq!(progress.processed_urls, vec!["https://a", "https://b"]);
    assert_eq!(progress.failed_urls, vec!["https://c"]);
    assert_eq!(progress.current_section, "Handbook");
    assert_eq!(progress.documents_saved, 2);
    assert!(reloaded.is_processed("https://a"));
    assert!(!reloaded.is_processed("https://c"));
}

#[test]
fn test_checkpoint_marks_are_deduplicated() {
    let tmp = TempDir::new().unwrap();
    let mut manager = CheckpointManager::new(tmp.path()).unwrap();

    manager.mark_processed("https://a").unwrap();
    manager.mark_processed("https://a").unwrap();
    manager.mark_failed("https://x").unwrap();
    manager.mark_failed("https://x").unwrap();

    let progress = manager.progress().unwrap();
    assert_eq!(progress.processed_urls.len(), 1);
    assert_eq!(progress.documents_saved, 1);
    assert_eq!(progress.failed_urls.len(), 1);
}

#[test]
fn test_checkpoint_stats() {
    let tmp = TempDir::new().unwrap();
    let mut manager = CheckpointManager::new(tmp.path()).unwrap();

    manager.start_new(5).unwrap();
    manager.mark_processed("https://a").unwrap();
    manager.mark_failed("https://b").unwrap();

    let stats = manager.stats().unwrap();
    assert_eq!(stats.total_resources, 5);
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.remaining, 3);
    assert_eq!(stats.documents_saved, 1);
    assert!(stats.last_updated >= stats.started_at);
}

#[test]
fn test_checkpoint_remaining_never_negative() {
    let tmp = TempDir::new().unwrap();
    let mut manager = CheckpointManager::new(tmp.path()).unwrap();

    // no session started, so total is zero
    manager.mark_processed("https://a").unwrap();
    manager.mark_failed("https://b").unwrap();

    assert_eq!(manager.stats().unwrap().remaining, 0);
}

#[test]
fn test_checkpoint_clear() {
    let tmp = TempDir::new().unwrap();
    let mut manager = CheckpointManager::new(tmp.path()).unwrap();

    manager.start_new(3).unwrap();
    manager.clear().unwrap();

    assert!(!manager.checkpoint_file().exists());
    assert!(manager.progress().is_none());
    // clearing twice is fine
    manager.clear().unwrap();
}
