use crate::error::CheckpointError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const CHECKPOINT_FILE: &str = "progress.json";

/// Progress of a resumable collection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapingProgress {
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub total_resources: usize,
    pub processed_urls: Vec<String>,
    pub failed_urls: Vec<String>,
    pub current_section: String,
    pub documents_saved: usize,
}

impl ScrapingProgress {
    pub fn new(total_resources: usize) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            last_updated: now,
            total_resources,
            processed_urls: Vec::new(),
            failed_urls: Vec::new(),
            current_section: String::new(),
            documents_saved: 0,
        }
    }
}

/// Summary of a progress record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointStats {
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub total_resources: usize,
    pub processed: usize,
    pub failed: usize,
    pub remaining: usize,
    pub documents_saved: usize,
}

/// Persists [`ScrapingProgress`] as pretty JSON, rewriting the file on every change
#[derive(Debug)]
pub struct CheckpointManager {
    checkpoint_file: PathBuf,
    progress: Option<ScrapingProgress>,
}

impl CheckpointManager {
    pub fn new(checkpoint_dir: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let dir = checkpoint_dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| CheckpointError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            checkpoint_file: dir.join(CHECKPOINT_FILE),
            progress: None,
        })
    }

    pub fn checkpoint_file(&self) -> &Path {
        &self.checkpoint_file
    }

    pub fn progress(&self) -> Option<&ScrapingProgress> {
        self.progress.as_ref()
    }

    /// Read the checkpoint from disk.
    ///
    /// A missing file is not an error. A corrupt one is logged and treated as missing.
    pub fn load(&mut self) -> Option<&ScrapingProgress> {
        let contents = match fs::read_to_string(&self.checkpoint_file) {
            Ok(contents) => contents,
            Err(_) => {
                debug!("No checkpoint found at {}", self.checkpoint_file.display());
                return None;
            }
        };

        match serde_json::from_str::<ScrapingProgress>(&contents) {
            Ok(progress) => {
                info!(
                    "Loaded checkpoint: {} URLs processed",
                    progress.processed_urls.len()
                );
                self.progress = Some(progress);
                self.progress.as_ref()
            }
            Err(e) => {
                error!(
                    "Failed to load checkpoint {}: {}",
                    self.checkpoint_file.display(),
                    e
                );
                None
            }
        }
    }

    /// Write `progress` to disk and make it current. Refreshes `last_updated`.
    pub fn save(&mut self, mut progress: ScrapingProgress) -> Result<(), CheckpointError> {
        progress.last_updated = Utc::now();
        let json = serde_json::to_string_pretty(&progress)?;
        fs::write(&self.checkpoint_file, json).map_err(|source| CheckpointError::Write {
            path: self.checkpoint_file.clone(),
            source,
        })?;

        debug!("Checkpoint saved: {} URLs", progress.processed_urls.len());
        self.progress = Some(progress);
        Ok(())
    }

    pub fn start_new(&mut self, total_resources: usize) -> Result<&ScrapingProgress, CheckpointError> {
        self.save(ScrapingProgress::new(total_resources))?;
        Ok(&*self.current_mut())
    }

    /// Record a successfully processed URL. Repeats are ignored.
    pub fn mark_processed(&mut self, url: &str) -> Result<(), CheckpointError> {
        let progress = self.current_mut();
        if progress.processed_urls.iter().any(|u| u == url) {
            return Ok(());
        }
        progress.processed_urls.push(url.to_string());
        progress.documents_saved += 1;
        self.persist()
    }

    /// Record a failed URL. Repeats are ignored.
    pub fn mark_failed(&mut self, url: &str) -> Result<(), CheckpointError> {
        let progress = self.current_mut();
        if progress.failed_urls.iter().any(|u| u == url) {
            return Ok(());
        }
        progress.failed_urls.push(url.to_string());
        self.persist()
    }

    pub fn is_processed(&self, url: &str) -> bool {
        self.progress
            .as_ref()
            .is_some_and(|p| p.processed_urls.iter().any(|u| u == url))
    }

    pub fn update_section(&mut self, section: &str) -> Result<(), CheckpointError> {
        self.current_mut().current_section = section.to_string();
        self.persist()
    }

    /// `None` when no session is loaded or started
    pub fn stats(&self) -> Option<CheckpointStats> {
        let p = self.progress.as_ref()?;
        let processed = p.processed_urls.len();
        let failed = p.failed_urls.len();

        Some(CheckpointStats {
            started_at: p.started_at,
            last_updated: p.last_updated,
            total_resources: p.total_resources,
            processed,
            failed,
            remaining: p.total_resources.saturating_sub(processed + failed),
            documents_saved: p.documents_saved,
        })
    }

    /// Delete the checkpoint file and forget the current session
    pub fn clear(&mut self) -> Result<(), CheckpointError> {
        if self.checkpoint_file.exists() {
            fs::remove_file(&self.checkpoint_file).map_err(|source| CheckpointError::Remove {
                path: self.checkpoint_file.clone(),
                source,
            })?;
        }
        self.progress = None;
        info!("Checkpoint cleared");
        Ok(())
    }

    /// Current session, starting an empty one if needed
    fn current_mut(&mut self) -> &mut ScrapingProgress {
        self.progress.get_or_insert_with(|| ScrapingProgress::new(0))
    }

    fn persist(&mut self) -> Result<(), CheckpointError> {
        let progress = self.current_mut().clone();
        self.save(progress)
    }
}
