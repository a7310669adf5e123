use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::remote::RemoteError;

const DOCUMENT_ID_KEY: &str = "document_id";

/// Durable key-value file remembering which remote document holds the
/// checklist, so later sessions reopen the same one.
#[derive(Debug, Clone)]
pub struct DocIdCache {
    path: PathBuf,
}

impl DocIdCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/checklist-tui/state.json`, if the platform has a data dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("checklist-tui").join("state.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached document id. A missing or unreadable file means none.
    pub fn load(&self) -> Option<String> {
        self.read_entries().remove(DOCUMENT_ID_KEY)
    }

    pub fn store(&self, id: &str) -> Result<(), RemoteError> {
        let mut entries = self.read_entries();
        entries.insert(DOCUMENT_ID_KEY.to_string(), id.to_string());
        self.write_entries(&entries)
    }

    pub fn clear(&self) -> Result<(), RemoteError> {
        let mut entries = self.read_entries();
        if entries.remove(DOCUMENT_ID_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt cache file");
                BTreeMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), RemoteError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| cache_error(&self.path, e))?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| RemoteError::Cache(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| cache_error(&self.path, e))
    }
}

fn cache_error(path: &Path, e: std::io::Error) -> RemoteError {
    RemoteError::Cache(format!("{}: {}", path.display(), e))
}
