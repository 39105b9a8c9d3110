//! JSON file history store
//!
//! Persists the lowest-seen record per item between runs. The whole file is
//! rewritten on every save; no locking is done and a single writer is
//! assumed.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::domain::record::ItemMap;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to read history file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("History file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// History store backed by one pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted history. A missing file is an empty history.
    pub async fn load(&self) -> Result<ItemMap, HistoryError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No history file at {}, starting fresh", self.path.display());
                return Ok(ItemMap::new());
            }
            Err(source) => {
                return Err(HistoryError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let history: ItemMap =
            serde_json::from_str(&content).map_err(|source| HistoryError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        debug!("Loaded {} items from {}", history.len(), self.path.display());
        Ok(history)
    }

    /// Replace the persisted history wholesale
    pub async fn save(&self, history: &ItemMap) -> Result<(), HistoryError> {
        let write_error = |source| HistoryError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        let content = serde_json::to_string_pretty(history)
            .map_err(|e| write_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        fs::write(&self.path, content).await.map_err(write_error)?;

        info!("Saved {} items to {}", history.len(), self.path.display());
        Ok(())
    }
}
