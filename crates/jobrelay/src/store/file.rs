//! JSON file backing for the processed-ID set.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::error::{Result, StoreError};
use super::processed::{migrate, ProcessedIds};

const WRITE_CHECK_FILE: &str = ".write_test";

/// Processed-ID file: a single JSON array of token strings.
#[derive(Debug, Clone)]
pub struct IdStore {
    path: PathBuf,
}

impl IdStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the set from disk.
    ///
    /// A missing file is a first run and yields an empty set. A file that
    /// exists but cannot be read or parsed yields `StoreError::Corrupted`.
    /// Legacy tokens are migrated and the result saved before returning.
    pub fn load(&self) -> Result<ProcessedIds> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Processed IDs file does not exist: {} (first run)",
                    self.path.display()
                );
                return Ok(ProcessedIds::new());
            }
            Err(e) => {
                error!("Failed to read processed IDs: {}", e);
                return Err(self.corrupted(e.to_string()));
            }
        };

        let tokens: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse processed IDs: {}", e);
            self.corrupted(e.to_string())
        })?;

        info!(
            "Loaded {} processed IDs from {}",
            tokens.len(),
            self.path.display()
        );

        let loaded: ProcessedIds = tokens.into_iter().collect();
        let (migrated, count) = migrate(&loaded);
        if count > 0 {
            self.save(&migrated)?;
        }
        Ok(migrated)
    }

    /// Writes the set to disk, creating the parent directory if needed.
    ///
    /// The content goes to a sibling temp file first and is renamed over the
    /// target, so an interrupted write leaves the previous file intact.
    pub fn save(&self, ids: &ProcessedIds) -> Result<()> {
        self.ensure_parent_dir()?;

        let tokens: Vec<&str> = ids.iter().collect();
        let json = serde_json::to_vec(&tokens).map_err(|e| StoreError::WriteFile {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        let tmp_path = self.tmp_path();
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        };

        if let Err(e) = write() {
            error!("Failed to save processed IDs: {}", e);
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::WriteFile {
                path: self.path.clone(),
                source: e,
            });
        }

        info!(
            "Saved {} processed IDs to {}",
            ids.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Startup self-check: the directory must exist and accept a write, and
    /// the current file must load. Returns the number of tracked tokens.
    pub fn verify(&self) -> Result<usize> {
        info!("=== Storage Verification ===");
        info!("Processed IDs file: {}", self.path.display());

        let parent = self.parent_dir();
        info!(
            "Parent directory: {} (exists: {})",
            parent.display(),
            parent.exists()
        );

        self.ensure_parent_dir()?;

        let marker = parent.join(WRITE_CHECK_FILE);
        fs::write(&marker, b"test")
            .and_then(|()| fs::remove_file(&marker))
            .map_err(|e| {
                error!("Storage write test FAILED: {}", e);
                StoreError::NotWritable {
                    path: parent.clone(),
                    source: e,
                }
            })?;
        info!("Storage write test: PASSED");

        let ids = self.load()?;
        info!("Currently tracking {} processed IDs", ids.len());
        info!("=== Storage Verification Complete ===");
        Ok(ids.len())
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        let parent = self.parent_dir();
        if parent.exists() {
            return Ok(());
        }
        fs::create_dir_all(&parent).map_err(|e| {
            warn!("Failed to create directory {}: {}", parent.display(), e);
            StoreError::CreateDirectory {
                path: parent.clone(),
                source: e,
            }
        })?;
        info!("Created directory: {}", parent.display());
        Ok(())
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn corrupted(&self, reason: String) -> StoreError {
        StoreError::Corrupted {
            path: self.path.clone(),
            reason,
        }
    }
}
