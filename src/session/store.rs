use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Persisted metadata for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session name (`Session_<N>`)
    pub name: String,

    /// Workspace directory path
    pub path: PathBuf,

    /// When the session was created
    pub created_at: DateTime<Utc>,
}

/// Durable mapping from session name to metadata.
///
/// The on-disk form (a JSON array of records) is the single source of truth
/// for which sessions exist across restarts. Every mutating call performs a
/// full rewrite of the backing file; callers must serialize mutations to
/// avoid lost updates. There is no entry-level update: records are immutable
/// once appended except via full-collection `replace`.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted collection.
    ///
    /// An absent file is an empty collection. A corrupted file is also an
    /// empty collection: corruption means "no prior sessions", never an
    /// error to the caller.
    pub fn list(&self) -> Vec<SessionRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Corrupted session store {}, treating as empty: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Add one record and rewrite the full collection.
    pub fn append(&self, record: SessionRecord) -> Result<()> {
        let mut records = self.list();
        records.push(record);
        self.write(&records)
    }

    /// Overwrite the entire persisted collection. Used after deletion or
    /// bulk clear to resynchronize with in-memory state.
    pub fn replace(&self, records: &[SessionRecord]) -> Result<()> {
        self.write(records)
    }

    fn write(&self, records: &[SessionRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)?;

        Ok(())
    }
}
