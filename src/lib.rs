//! ScholarHub - access-controlled project registry for academic networks
//!
//! Members of a multi-institution network publish research projects with a
//! declared visibility and list only the projects they are entitled to see.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP (axum)                    CLI (clap)
//!        │                             │
//!        └──────────────┬──────────────┘
//!                       ▼
//!            ┌─────────────────────┐      ┌──────────────┐
//!            │   ProjectService    │─────▶│  Summarizer  │ best effort,
//!            │ create / add / list │      └──────────────┘ time-bounded
//!            │  get / update       │      ┌──────────────┐
//!            │                     │─────▶│  Directory   │ identity →
//!            └──────────┬──────────┘      └──────────────┘ affiliation
//!                       │  can_view() on every read
//!                       ▼
//!            ┌─────────────────────┐
//!            │    ProjectStore     │ one mutex, monotonic ids,
//!            └──────────┬──────────┘ flush on every mutation
//!                       ▼
//!               StorageBackend (JSON file / memory)
//! ```
//!
//! ## Modules
//!
//! - [`projects`]: records, visibility rules, store, service, REST handlers
//! - [`directory`]: participant affiliation lookup
//! - [`enrichment`]: summary generation
//! - [`fixtures`]: unverified placeholder identities and artifact hashes
//! - [`api`]: HTTP application and server
//! - [`config`]: Configuration management

pub mod api;
pub mod config;
pub mod directory;
pub mod enrichment;
pub mod error;
pub mod fixtures;
pub mod projects;

pub use config::ScholarHubConfig;
pub use error::{Error, Result};
