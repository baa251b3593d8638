//! ScholarHub configuration management

use crate::directory::{DirectoryMember, StaticDirectory};
use crate::error::{Error, Result};
use crate::projects::backend::JsonFileBackend;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main ScholarHub configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScholarHubConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Project storage configuration
    pub storage: StorageConfig,

    /// Participant directory configuration
    pub directory: DirectoryConfig,

    /// Summary enrichment configuration
    pub enrichment: EnrichmentConfig,

    /// Administrative access configuration
    pub admin: AdminConfig,
}

impl ScholarHubConfig {
    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot run
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if self.enrichment.timeout_ms == 0 {
            return Err(Error::Config(
                "enrichment.timeout_ms must be non-zero".to_string(),
            ));
        }
        if self.enrichment.enabled && self.enrichment.endpoint.trim().is_empty() {
            return Err(Error::Config(
                "enrichment.endpoint is required when enrichment is enabled".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for member in &self.directory.members {
            if !seen.insert(member.identity.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate directory identity: {}",
                    member.identity
                )));
            }
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Accept project creation without an identity header, fabricating a
    /// placeholder author. Demo deployments only.
    pub demo_mode: bool,

    /// Allowed CORS origins (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18800,
            demo_mode: false,
            cors_origins: Vec::new(),
        }
    }
}

/// Project storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the project collection
    pub path: PathBuf,

    /// Write the builtin demo projects when the file does not exist yet
    pub seed_builtin: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: JsonFileBackend::default_path(),
            seed_builtin: true,
        }
    }
}

/// Participant directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Institution assigned to creators the directory does not know
    pub default_institution_id: u64,

    /// Known participants
    pub members: Vec<DirectoryMember>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            default_institution_id: 1,
            members: Vec::new(),
        }
    }
}

impl DirectoryConfig {
    /// Build the in-memory directory for the configured members
    pub fn build(&self) -> StaticDirectory {
        StaticDirectory::from_members(&self.members)
    }
}

/// Summary enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Call the summarizer when publishing
    pub enabled: bool,

    /// Summarizer endpoint URL
    pub endpoint: String,

    /// Upper bound on one summarizer call
    pub timeout_ms: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://127.0.0.1:8088/summarize".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Administrative access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Environment variable holding the admin bearer token
    pub token_env: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            token_env: "SCHOLARHUB_ADMIN_TOKEN".to_string(),
        }
    }
}

impl AdminConfig {
    /// Resolve the admin token; `None` disables the admin endpoints
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}
