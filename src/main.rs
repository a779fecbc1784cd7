use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portal_chunker::storage::{CHUNKS_FILE, DOCUMENTS_FILE, EMBEDDING_FILE, INDEX_FILE};
use portal_chunker::{
    CheckpointManager, Chunker, Document, JsonlExporter, PipelineConfig, TextNormalizer, logging,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Normalize course portal documents and split them into RAG chunks
#[derive(Parser, Debug)]
#[command(name = "portal-chunker", version, about)]
struct Cli {
    /// Log level filter (overrides LOG_LEVEL; RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk extracted documents and write the chunk files
    Process {
        /// Documents JSONL (defaults to <processed_dir>/documents.jsonl)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output directory (defaults to <chunks_dir>)
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        chunk_overlap: Option<usize>,
        /// Do not prefix chunks with their heading context
        #[arg(long)]
        no_headings: bool,
        /// Chunk documents on the rayon pool
        #[arg(long)]
        parallel: bool,
    },
    /// Normalize the content of a documents JSONL file
    Normalize {
        #[arg(long)]
        input: PathBuf,
        /// Defaults to rewriting the input file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show checkpoint progress
    Status,
    /// Delete the checkpoint
    Reset,
    /// Print the effective configuration as JSON
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env().context("Invalid configuration")?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    logging::init(&config.log_level, config.log_file.as_deref())?;

    match cli.command {
        Command::Process {
            input,
            output,
            chunk_size,
            chunk_overlap,
            no_headings,
            parallel,
        } => {
            if let Some(size) = chunk_size {
                config.chunk.chunk_size = size;
            }
            if let Some(overlap) = chunk_overlap {
                config.chunk.chunk_overlap = overlap;
            }
            if no_headings {
                config.chunk.preserve_headings = false;
            }
            config.chunk.validate()?;
            process(&config, input, output, parallel)
        }
        Command::Normalize { input, output } => {
            let output = output.unwrap_or_else(|| input.clone());
            normalize(&input, &output)
        }
        Command::Status => status(&config),
        Command::Reset => reset(&config),
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn process(
    config: &PipelineConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    parallel: bool,
) -> Result<()> {
    let start_time = Instant::now();
    config.ensure_directories()?;
    let input = input.unwrap_or_else(|| config.processed_dir.join(DOCUMENTS_FILE));
    let output = output.unwrap_or_else(|| config.chunks_dir.clone());

    // Step 1: Load documents
    let step_start = Instant::now();
    println!("Step 1: Loading documents from {}...", input.display());
    let documents = JsonlExporter::load_documents(&input)
        .with_context(|| format!("Failed to load documents from {}", input.display()))?;
    println!(
        "✓ Loaded {} documents [{:.2}s]\n",
        documents.len(),
        step_start.elapsed().as_secs_f64()
    );

    // Step 2: Normalize
    println!("Step 2: Normalizing content...");
    let normalizer = TextNormalizer::new();
    let documents: Vec<Document> = documents
        .iter()
        .map(|doc| doc.with_content(normalizer.normalize(&doc.content)))
        .collect();
    println!("✓ Normalized {} documents\n", documents.len());

    // Step 3: Chunk
    let step_start = Instant::now();
    println!("Step 3: Chunking documents...");
    let chunker = Chunker::new(config.chunk.clone());
    info!("Token counter: {:?}", chunker.counter().kind());
    let chunks = if parallel {
        chunker.chunk_documents_par(&documents)
    } else {
        chunker.chunk_documents(&documents)
    };
    println!(
        "✓ Created {} chunks [{:.2}s]\n",
        chunks.len(),
        step_start.elapsed().as_secs_f64()
    );

    // Step 4: Export
    println!("Step 4: Writing chunk files to {}...", output.display());
    let exporter = JsonlExporter::new(&output)?;
    let chunks_path = exporter.export_chunks(&chunks, CHUNKS_FILE)?;
    let embedding_path = exporter.export_embedding_format(&chunks, EMBEDDING_FILE)?;
    let index_path = exporter.create_index(&chunks, INDEX_FILE)?;

    let total_words: usize = chunks.iter().map(|c| c.metadata.word_count).sum();
    println!("\n=== Chunking Statistics ===");
    println!("Documents:            {}", documents.len());
    println!("Chunks:               {}", chunks.len());
    println!(
        "Avg words/chunk:      {:.1}",
        if chunks.is_empty() {
            0.0
        } else {
            total_words as f64 / chunks.len() as f64
        }
    );
    println!("Chunks file:          {}", chunks_path.display());
    println!("Embedding file:       {}", embedding_path.display());
    println!("Index file:           {}", index_path.display());
    println!(
        "Total time:           {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn normalize(input: &Path, output: &Path) -> Result<()> {
    let documents = JsonlExporter::load_documents(input)
        .with_context(|| format!("Failed to load documents from {}", input.display()))?;

    let normalizer = TextNormalizer::new();
    let normalized: Vec<Document> = documents
        .iter()
        .map(|doc| doc.with_content(normalizer.normalize(&doc.content)))
        .collect();

    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let filename = output
        .file_name()
        .and_then(|f| f.to_str())
        .with_context(|| format!("Invalid output path: {}", output.display()))?;

    let path = JsonlExporter::new(dir)?.export_documents(&normalized, filename)?;
    println!("✓ Normalized {} documents -> {}", normalized.len(), path.display());
    Ok(())
}

fn status(config: &PipelineConfig) -> Result<()> {
    let mut manager = CheckpointManager::new(&config.checkpoint_dir)?;
    manager.load();

    match manager.stats() {
        Some(stats) => {
            println!("=== Checkpoint Status ===");
            println!("Started:              {}", stats.started_at.to_rfc3339());
            println!("Last updated:         {}", stats.last_updated.to_rfc3339());
            println!("Total resources:      {}", stats.total_resources);
            println!("Processed:            {}", stats.processed);
            println!("Failed:               {}", stats.failed);
            println!("Remaining:            {}", stats.remaining);
            println!("Documents saved:      {}", stats.documents_saved);
        }
        None => println!("No checkpoint found at {}", manager.checkpoint_file().display()),
    }
    Ok(())
}

fn reset(config: &PipelineConfig) -> Result<()> {
    let mut manager = CheckpointManager::new(&config.checkpoint_dir)?;
    manager.clear()?;
    println!("✓ Checkpoint cleared");
    Ok(())
}
