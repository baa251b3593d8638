//! Project use-case service
//!
//! Orchestrates id assignment, creator affiliation, enrichment and the
//! visibility filter on top of `ProjectStore`.
//!
//! Trust boundaries:
//! - `list_all_unfiltered` and `update_project` perform no access check;
//!   callers authorize first. `update_as` checks authorship itself.
//! - Viewer identities are taken as already authenticated.

use super::access::can_view;
use super::store::{builtin_projects, ProjectStore};
use super::types::{CreateProjectRequest, ProjectRecord};
use crate::config::ScholarHubConfig;
use crate::directory::{Affiliation, Directory};
use crate::enrichment::{self, DisabledSummarizer, Summarizer};
use crate::error::{Error, Result};
use crate::fixtures;
use crate::projects::backend::{JsonFileBackend, StorageBackend};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Institution assigned to creators the directory cannot resolve
pub const DEFAULT_INSTITUTION_ID: u64 = 1;

/// Default bound on one enrichment call
pub const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Project service over a shared store
pub struct ProjectService {
    store: Arc<ProjectStore>,
    directory: Arc<dyn Directory>,
    summarizer: Arc<dyn Summarizer>,
    default_institution_id: u64,
    enrichment_timeout: Duration,
}

impl ProjectService {
    /// Create a service with enrichment disabled and default fallbacks
    pub fn new(store: Arc<ProjectStore>, directory: Arc<dyn Directory>) -> Self {
        Self {
            store,
            directory,
            summarizer: Arc::new(DisabledSummarizer),
            default_institution_id: DEFAULT_INSTITUTION_ID,
            enrichment_timeout: DEFAULT_ENRICHMENT_TIMEOUT,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn with_default_institution(mut self, institution_id: u64) -> Self {
        self.default_institution_id = institution_id;
        self
    }

    pub fn with_enrichment_timeout(mut self, timeout: Duration) -> Self {
        self.enrichment_timeout = timeout;
        self
    }

    /// Wire store, directory and summarizer from configuration
    pub async fn from_config(config: &ScholarHubConfig) -> Result<Self> {
        Self::from_config_with(config, true).await
    }

    /// Like [`ProjectService::from_config`], but never writes the seed
    /// collection to a missing storage file. For inspection commands.
    pub async fn from_config_read_only(config: &ScholarHubConfig) -> Result<Self> {
        Self::from_config_with(config, false).await
    }

    async fn from_config_with(config: &ScholarHubConfig, writable: bool) -> Result<Self> {
        let backend: Arc<dyn StorageBackend> =
            Arc::new(JsonFileBackend::new(config.storage.path.clone()));
        let seed = if config.storage.seed_builtin {
            builtin_projects()
        } else {
            Vec::new()
        };
        let store = if writable {
            ProjectStore::open(backend, seed).await?
        } else {
            ProjectStore::open_read_only(backend, seed).await?
        };
        let store = Arc::new(store);

        Ok(Self::new(store, Arc::new(config.directory.build()))
            .with_summarizer(enrichment::summarizer_from_config(&config.enrichment))
            .with_default_institution(config.directory.default_institution_id)
            .with_enrichment_timeout(config.enrichment.timeout()))
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    /// Build a new project record without storing it.
    ///
    /// # Contract
    /// - `id` is the store's next id at the time of the call.
    /// - Affiliation comes from the directory when the author resolves,
    ///   otherwise from `request.department_id` and the default institution.
    /// - `authors == [author]` and `creator_identity == author`.
    /// - A missing author gets a fabricated placeholder identity and a
    ///   missing artifact hash gets a fabricated placeholder; neither is
    ///   verified.
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
        author: Option<&str>,
    ) -> Result<ProjectRecord> {
        let author = match author {
            Some(a) if !a.trim().is_empty() => a.to_string(),
            Some(_) => {
                return Err(Error::Validation(
                    "author identity must not be empty".to_string(),
                ))
            }
            None => {
                let fabricated = fixtures::fabricate_identity();
                tracing::debug!(author = %fabricated, "Using fabricated author identity");
                fabricated
            }
        };

        let artifact_hash = match request.artifact_hash {
            Some(hash) if hash.trim().is_empty() => {
                return Err(Error::Validation(
                    "artifact hash must not be empty when supplied".to_string(),
                ))
            }
            Some(hash) => hash,
            None => fixtures::fabricate_artifact_hash(),
        };

        let id = self.store.next_id().await;

        let (institution_id, department_id) = match self.directory.resolve(&author) {
            Some(aff) => (aff.institution_id, aff.department_id),
            None => (self.default_institution_id, request.department_id),
        };

        let record = ProjectRecord {
            id,
            title: request.title,
            description: request.description,
            department_id,
            institution_id,
            year: request.year,
            access_level: request.access_level,
            artifact_hash,
            authors: vec![author.clone()],
            created_at: Utc::now(),
            creator_identity: author,
            summary: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Enrich (best effort) and store a record.
    ///
    /// Enrichment failures and timeouts never fail the write. Storage
    /// failures do. Returns the record as stored, which may carry a
    /// different id if another insert claimed the drafted one first.
    pub async fn add_project(&self, mut record: ProjectRecord) -> Result<ProjectRecord> {
        if record.summary.is_none() {
            record.summary =
                enrichment::enrich(self.summarizer.as_ref(), &record, self.enrichment_timeout)
                    .await;
        }

        let stored = self.store.insert(record).await?;
        tracing::info!(
            project_id = stored.id,
            access_level = %stored.access_level,
            "Project published"
        );
        Ok(stored)
    }

    /// `create_project` followed by `add_project`
    pub async fn publish(
        &self,
        request: CreateProjectRequest,
        author: Option<&str>,
    ) -> Result<ProjectRecord> {
        let draft = self.create_project(request, author).await?;
        self.add_project(draft).await
    }

    /// Records `viewer` may see, in store order (newest first)
    pub async fn list_visible(&self, viewer: Option<&str>) -> Vec<ProjectRecord> {
        let affiliation = self.viewer_affiliation(viewer);
        self.store
            .list_all()
            .await
            .into_iter()
            .filter(|r| can_view(r, viewer, affiliation.as_ref()))
            .collect()
    }

    /// Every record, unfiltered. Callers must hold administrative rights.
    pub async fn list_all_unfiltered(&self) -> Vec<ProjectRecord> {
        self.store.list_all().await
    }

    /// One record if `viewer` may see it.
    ///
    /// Hidden and absent records both yield `Error::NotFound`.
    pub async fn get_visible(&self, id: u64, viewer: Option<&str>) -> Result<ProjectRecord> {
        let affiliation = self.viewer_affiliation(viewer);
        self.store
            .get(id)
            .await
            .filter(|r| can_view(r, viewer, affiliation.as_ref()))
            .ok_or(Error::NotFound(id))
    }

    /// Replace a stored record wholesale. No access check is made here.
    ///
    /// An unknown id is reported as `Error::NotFound` and leaves the store
    /// untouched.
    pub async fn update_project(&self, record: ProjectRecord) -> Result<ProjectRecord> {
        let id = record.id;
        if !self.store.replace(record.clone()).await? {
            tracing::debug!(project_id = id, "Update for unknown project ignored");
            return Err(Error::NotFound(id));
        }
        tracing::info!(project_id = id, "Project updated");
        Ok(record)
    }

    /// Replace a stored record on behalf of `editor`.
    ///
    /// The authorship check runs against the stored record inside the same
    /// critical section as the write. Non-authors and unknown ids both get
    /// `Error::NotFound` and leave the store untouched.
    pub async fn update_as(&self, record: ProjectRecord, editor: &str) -> Result<ProjectRecord> {
        let id = record.id;
        if !self
            .store
            .replace_if(record.clone(), |current| current.is_author(editor))
            .await?
        {
            tracing::debug!(project_id = id, editor, "Update rejected");
            return Err(Error::NotFound(id));
        }
        tracing::info!(project_id = id, editor, "Project updated");
        Ok(record)
    }

    fn viewer_affiliation(&self, viewer: Option<&str>) -> Option<Affiliation> {
        viewer.and_then(|v| self.directory.resolve(v))
    }
}
