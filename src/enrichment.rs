//! Best-effort summary enrichment
//!
//! A `Summarizer` produces a short text summary for a project before it is
//! stored. Enrichment never blocks a write: `enrich` bounds the call with a
//! timeout and turns every failure into "no summary" plus a warning.

use crate::config::EnrichmentConfig;
use crate::error::{Error, Result};
use crate::projects::types::ProjectRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Pluggable summary generator.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize a project. `Ok(None)` means the backend chose not to.
    async fn summarize(&self, record: &ProjectRecord) -> Result<Option<String>>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Summarizer that never produces a summary
pub struct DisabledSummarizer;

#[async_trait]
impl Summarizer for DisabledSummarizer {
    async fn summarize(&self, _record: &ProjectRecord) -> Result<Option<String>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeRequest<'a> {
    id: u64,
    title: &'a str,
    description: &'a str,
    year: i32,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    #[serde(default)]
    summary: Option<String>,
}

/// Summarizer backed by an HTTP endpoint.
///
/// POSTs `{id, title, description, year}` as JSON and expects
/// `{"summary": "..."}` back.
pub struct HttpSummarizer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSummarizer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, record: &ProjectRecord) -> Result<Option<String>> {
        let payload = SummarizeRequest {
            id: record.id,
            title: &record.title,
            description: &record.description,
            year: record.year,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Enrichment(format!("summarizer rejected request: {}", e)))?;

        let body: SummarizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Enrichment(format!("invalid summarizer response: {}", e)))?;

        Ok(body.summary.filter(|s| !s.trim().is_empty()))
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Build the summarizer described by configuration
pub fn summarizer_from_config(config: &EnrichmentConfig) -> Arc<dyn Summarizer> {
    if config.enabled && !config.endpoint.is_empty() {
        Arc::new(HttpSummarizer::new(config.endpoint.clone()))
    } else {
        Arc::new(DisabledSummarizer)
    }
}

/// Ask `summarizer` for a summary, waiting at most `timeout`.
///
/// Errors and timeouts are logged and yield `None`. Dropping the returned
/// future cancels the in-flight call.
pub async fn enrich(
    summarizer: &dyn Summarizer,
    record: &ProjectRecord,
    timeout: Duration,
) -> Option<String> {
    match tokio::time::timeout(timeout, summarizer.summarize(record)).await {
        Ok(Ok(summary)) => summary,
        Ok(Err(e)) => {
            tracing::warn!(
                project_id = record.id,
                backend = summarizer.name(),
                "Summary enrichment failed: {}",
                e
            );
            None
        }
        Err(_) => {
            tracing::warn!(
                project_id = record.id,
                backend = summarizer.name(),
                "Summary enrichment timed out after {}ms",
                timeout.as_millis()
            );
            None
        }
    }
}
