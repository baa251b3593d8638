//! Project store with monotonic id assignment and write-through persistence
//!
//! Holds the authoritative ordered collection (newest first) behind a single
//! mutex. Every mutation builds the next collection, flushes it through the
//! storage backend, and only then swaps it into memory, so a failed flush
//! leaves both memory and disk at the previous state.

use super::backend::StorageBackend;
use super::types::{AccessLevel, ProjectRecord};
use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Ordered project collection backed by a swappable storage backend
pub struct ProjectStore {
    backend: Arc<dyn StorageBackend>,
    records: Mutex<Vec<ProjectRecord>>,
}

impl ProjectStore {
    /// Open the store, loading persisted state or initializing it from
    /// `seed` when nothing has been persisted yet.
    ///
    /// Corrupt or unreadable persisted state is returned as an error.
    pub async fn open(backend: Arc<dyn StorageBackend>, seed: Vec<ProjectRecord>) -> Result<Self> {
        Self::open_with(backend, seed, true).await
    }

    /// Open the store for reading only.
    ///
    /// Behaves like [`ProjectStore::open`] except that a missing collection
    /// is served from `seed` in memory and nothing is written.
    pub async fn open_read_only(
        backend: Arc<dyn StorageBackend>,
        seed: Vec<ProjectRecord>,
    ) -> Result<Self> {
        Self::open_with(backend, seed, false).await
    }

    async fn open_with(
        backend: Arc<dyn StorageBackend>,
        seed: Vec<ProjectRecord>,
        persist_seed: bool,
    ) -> Result<Self> {
        let records = match backend.load().await? {
            Some(records) => {
                for r in &records {
                    r.validate().map_err(|e| {
                        Error::Storage(format!("invalid persisted project {}: {}", r.id, e))
                    })?;
                }
                tracing::info!(
                    "Loaded {} projects from {}",
                    records.len(),
                    backend.describe()
                );
                records
            }
            None => {
                let mut seed = seed;
                seed.sort_by(|a, b| b.id.cmp(&a.id));
                if persist_seed {
                    backend.save(&seed).await?;
                    tracing::info!(
                        "Initialized {} with {} seed projects",
                        backend.describe(),
                        seed.len()
                    );
                } else {
                    tracing::debug!("{} is empty; serving seed projects", backend.describe());
                }
                seed
            }
        };

        Ok(Self {
            backend,
            records: Mutex::new(records),
        })
    }

    /// Full collection, newest first, unfiltered
    pub async fn list_all(&self) -> Vec<ProjectRecord> {
        self.records.lock().await.clone()
    }

    /// Find a record by id, regardless of visibility
    pub async fn get(&self, id: u64) -> Option<ProjectRecord> {
        self.records.lock().await.iter().find(|r| r.id == id).cloned()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// One more than the highest id present, or 1 for an empty store
    pub async fn next_id(&self) -> u64 {
        next_id_of(&self.records.lock().await)
    }

    /// Insert a record at the head of the collection and persist.
    ///
    /// The id is re-checked under the lock: a record whose id is not above
    /// every stored id (a draft that lost a race with another insert) gets
    /// the next free id instead. A new record must list its creator as its
    /// only author. Returns the record as stored.
    pub async fn insert(&self, mut record: ProjectRecord) -> Result<ProjectRecord> {
        record.validate()?;
        if record.authors.len() != 1 || record.authors[0] != record.creator_identity {
            return Err(Error::Validation(format!(
                "new project must list its creator {} as sole author",
                record.creator_identity
            )));
        }

        let mut records = self.records.lock().await;
        let next = next_id_of(&records);
        if record.id < next {
            tracing::debug!(
                requested = record.id,
                assigned = next,
                "Reassigning stale project id"
            );
            record.id = next;
        }

        let mut updated = Vec::with_capacity(records.len() + 1);
        updated.push(record.clone());
        updated.extend(records.iter().cloned());

        self.backend.save(&updated).await?;
        *records = updated;

        tracing::debug!(project_id = record.id, "Inserted project");
        Ok(record)
    }

    /// Replace the record with the same id wholesale and persist.
    ///
    /// Returns `Ok(false)` without touching memory or storage when no
    /// record has that id. `created_at` and `creator_identity` are
    /// immutable; a replacement that changes them is rejected.
    pub async fn replace(&self, record: ProjectRecord) -> Result<bool> {
        self.replace_if(record, |_| true).await
    }

    /// Like [`ProjectStore::replace`], but only when `allow` accepts the
    /// currently stored record.
    ///
    /// `allow` runs under the same lock as the write, so it sees the state
    /// the replacement applies to. A rejected guard returns `Ok(false)` and
    /// writes nothing, same as a missing id.
    pub async fn replace_if<F>(&self, record: ProjectRecord, allow: F) -> Result<bool>
    where
        F: FnOnce(&ProjectRecord) -> bool + Send,
    {
        record.validate()?;

        let mut records = self.records.lock().await;
        let Some(pos) = records.iter().position(|r| r.id == record.id) else {
            return Ok(false);
        };
        if !allow(&records[pos]) {
            return Ok(false);
        }

        let existing = &records[pos];
        if existing.creator_identity != record.creator_identity {
            return Err(Error::Validation(format!(
                "creator of project {} cannot change",
                record.id
            )));
        }
        if existing.created_at != record.created_at {
            return Err(Error::Validation(format!(
                "creation time of project {} cannot change",
                record.id
            )));
        }

        let mut updated = records.clone();
        updated[pos] = record;

        self.backend.save(&updated).await?;
        *records = updated;
        Ok(true)
    }
}

fn next_id_of(records: &[ProjectRecord]) -> u64 {
    records.iter().map(|r| r.id).max().unwrap_or(0) + 1
}

fn seed_time(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Demo projects written to a fresh store
pub fn builtin_projects() -> Vec<ProjectRecord> {
    vec![
        ProjectRecord {
            id: 1,
            title: "Open Dataset of Regional Rainfall".to_string(),
            description: "Two decades of station-level precipitation readings, cleaned and gap-filled.".to_string(),
            department_id: 3,
            institution_id: 1,
            year: 2022,
            access_level: AccessLevel::Public,
            artifact_hash: "QmXoypizjW3WknFiJnKLwHCnL72vedxjQkDDP1mXWo6uco".to_string(),
            authors: vec!["0x1f9a6c2b8e4d7035a1c9e2f4b6d8a0c2e4f6a8b0".to_string()],
            created_at: seed_time(2022, 5, 14),
            creator_identity: "0x1f9a6c2b8e4d7035a1c9e2f4b6d8a0c2e4f6a8b0".to_string(),
            summary: None,
        },
        ProjectRecord {
            id: 2,
            title: "Campus Energy Load Forecasting".to_string(),
            description: "Short-horizon load models trained on building telemetry, shared with partner campuses.".to_string(),
            department_id: 7,
            institution_id: 2,
            year: 2023,
            access_level: AccessLevel::Institution,
            artifact_hash: "QmT78zSuBmuS4z925WZfrqQ1qHaJ56DQaTfyMUF7F8ff5o".to_string(),
            authors: vec!["0x7b3e5d1f9a2c4e6b8d0f1a3c5e7b9d2f4a6c8e0b".to_string()],
            created_at: seed_time(2023, 2, 8),
            creator_identity: "0x7b3e5d1f9a2c4e6b8d0f1a3c5e7b9d2f4a6c8e0b".to_string(),
            summary: None,
        },
        ProjectRecord {
            id: 3,
            title: "Protein Folding Benchmark Drafts".to_string(),
            description: "Unpublished benchmark harness and preliminary results.".to_string(),
            department_id: 4,
            institution_id: 1,
            year: 2024,
            access_level: AccessLevel::Private,
            artifact_hash: "QmPChd2hVbrJ6bfo3WBcTW4iZnpHm8TEzWkLHmLpXhF68A".to_string(),
            authors: vec!["0x1f9a6c2b8e4d7035a1c9e2f4b6d8a0c2e4f6a8b0".to_string()],
            created_at: seed_time(2024, 9, 30),
            creator_identity: "0x1f9a6c2b8e4d7035a1c9e2f4b6d8a0c2e4f6a8b0".to_string(),
            summary: None,
        },
    ]
}
