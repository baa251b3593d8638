//! Durable storage backends for the project collection
//!
//! The store hands the whole ordered collection to a backend on every
//! mutation and reads it back once at startup. Backends never reorder.

use super::types::ProjectRecord;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Persistence for the ordered project collection.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Load the persisted collection.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet. Unreadable or
    /// corrupt state is an error, never an empty collection.
    async fn load(&self) -> Result<Option<Vec<ProjectRecord>>>;

    /// Replace the persisted collection. Must not return before the data is
    /// durable.
    async fn save(&self, records: &[ProjectRecord]) -> Result<()>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Single JSON file holding the full collection.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-write leaves the previous state intact.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default file (~/.scholarhub/projects.json)
    pub fn default_path() -> PathBuf {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".scholarhub")
            .join("projects.json")
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "projects.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StorageBackend for JsonFileBackend {
    async fn load(&self) -> Result<Option<Vec<ProjectRecord>>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&data).map(Some).map_err(|e| {
            Error::Storage(format!("corrupt project file {}: {}", self.path.display(), e))
        })
    }

    async fn save(&self, records: &[ProjectRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::Storage(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.temp_path();
        let write_err =
            |e: std::io::Error| Error::Storage(format!("failed to write {}: {}", tmp.display(), e));
        let mut file = tokio::fs::File::create(&tmp).await.map_err(write_err)?;
        file.write_all(json.as_bytes()).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            Error::Storage(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

/// Volatile backend for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<Option<Vec<ProjectRecord>>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-persisted collection
    pub fn with_records(records: Vec<ProjectRecord>) -> Self {
        Self {
            records: Mutex::new(Some(records)),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent `save` calls fail, simulating an unavailable disk
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// What has been persisted so far
    pub async fn snapshot(&self) -> Option<Vec<ProjectRecord>> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn load(&self) -> Result<Option<Vec<ProjectRecord>>> {
        Ok(self.records.lock().await.clone())
    }

    async fn save(&self, records: &[ProjectRecord]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage("memory backend rejected write".to_string()));
        }
        *self.records.lock().await = Some(records.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
