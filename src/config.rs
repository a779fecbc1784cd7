use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default maximum tokens per segment
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Default number of words carried over from the previous segment
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Chunking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Max tokens per segment before it is considered full
    pub chunk_size: usize,
    /// Words carried from the previous segment into the next
    pub chunk_overlap: usize,
    /// Prefix each chunk with its heading context line
    pub preserve_headings: bool,
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        }
    }

    /// Toggle heading context lines
    pub fn preserve_headings(mut self, enabled: bool) -> Self {
        self.preserve_headings = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }

    /// Apply `CHUNK_SIZE`, `CHUNK_OVERLAP` and `PRESERVE_HEADINGS` overrides
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            chunk_size: parse_var(&lookup, "CHUNK_SIZE")?.unwrap_or(defaults.chunk_size),
            chunk_overlap: parse_var(&lookup, "CHUNK_OVERLAP")?
                .unwrap_or(defaults.chunk_overlap),
            preserve_headings: parse_bool_var(&lookup, "PRESERVE_HEADINGS")?
                .unwrap_or(defaults.preserve_headings),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            preserve_headings: true,
        }
    }
}

/// Top-level pipeline configuration: chunking plus on-disk layout and logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub chunk: ChunkConfig,
    pub data_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub chunks_dir: PathBuf,
    pub checkpoint_dir: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl PipelineConfig {
    /// Lay out the standard directory tree below `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            chunk: ChunkConfig::default(),
            processed_dir: data_dir.join("processed"),
            chunks_dir: data_dir.join("chunks"),
            checkpoint_dir: data_dir.join("checkpoints"),
            data_dir,
            log_level: "info".to_string(),
            log_file: None,
        }
    }

    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = lookup("DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let mut config = Self::with_data_dir(data_dir);
        config.chunk = ChunkConfig::from_lookup(&lookup)?;
        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            config.log_level = level.trim().to_lowercase();
        }
        config.log_file = lookup("LOG_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Ok(config)
    }

    /// Create every output directory the pipeline writes into
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.processed_dir, &self.chunks_dir, &self.checkpoint_dir] {
            ensure_dir(dir)?;
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}

fn parse_bool_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}
