//! Persistence for the stored credential and recent history
//!
//! Stores data in `{data_dir}/rizzmaster/`: `api_key` and `history.json`.

use crate::log_debug;
use crate::types::HistoryItem;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Number of history entries kept, newest first
pub const MAX_HISTORY: usize = 10;

const API_KEY_FILE: &str = "api_key";
const HISTORY_FILE: &str = "history.json";

/// Prepends `item` and drops whatever falls beyond [`MAX_HISTORY`]
pub fn push_capped(mut history: Vec<HistoryItem>, item: HistoryItem) -> Vec<HistoryItem> {
    history.insert(0, item);
    history.truncate(MAX_HISTORY);
    history
}

/// File-backed key-value store
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Opens (and creates) a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Opens the per-user store
    pub fn open_default() -> Result<Self> {
        let base = dirs::data_dir().context("Could not determine data directory")?;
        Self::new(base.join("rizzmaster"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn api_key_path(&self) -> PathBuf {
        self.dir.join(API_KEY_FILE)
    }

    fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    /// Load the stored credential, if any
    pub fn load_api_key(&self) -> Result<Option<String>> {
        let path = self.api_key_path();
        if !path.exists() {
            return Ok(None);
        }

        let key = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let key = key.trim();
        Ok((!key.is_empty()).then(|| key.to_string()))
    }

    /// Save the credential
    pub fn save_api_key(&self, key: &str) -> Result<()> {
        Self::atomic_write(&self.api_key_path(), key.trim().as_bytes())
    }

    /// Remove the stored credential
    pub fn clear_api_key(&self) -> Result<()> {
        let path = self.api_key_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Load history, newest first. A malformed file reads as empty.
    pub fn load_history(&self) -> Vec<HistoryItem> {
        let path = self.history_path();
        let Ok(content) = fs::read_to_string(&path) else {
            return Vec::new();
        };

        match serde_json::from_str(&content) {
            Ok(history) => history,
            Err(e) => {
                log_debug!("Failed to load history from {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Replace the whole history list
    pub fn save_history(&self, history: &[HistoryItem]) -> Result<()> {
        let json = serde_json::to_string_pretty(history)?;
        Self::atomic_write(&self.history_path(), json.as_bytes())
    }

    /// Record a new entry and return the updated list
    pub fn push_history(&self, item: HistoryItem) -> Result<Vec<HistoryItem>> {
        let history = push_capped(self.load_history(), item);
        self.save_history(&history)?;
        Ok(history)
    }

    /// Overwrite the newest entry in place, or record it if history is empty
    pub fn replace_latest(&self, item: HistoryItem) -> Result<Vec<HistoryItem>> {
        let mut history = self.load_history();
        match history.first_mut() {
            Some(latest) => *latest = item,
            None => history.push(item),
        }
        self.save_history(&history)?;
        Ok(history)
    }

    /// Delete all history
    pub fn clear_history(&self) -> Result<()> {
        let path = self.history_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Atomic write using temp file + rename
    fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
