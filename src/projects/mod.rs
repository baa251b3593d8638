//! Projects module: access-controlled research project registry
//!
//! Layers, bottom-up: durable `backend`, ordered `store` with monotonic ids,
//! the pure `access` predicate, the `service` use cases, and the REST
//! `handler`.

pub mod access;
pub mod backend;
pub mod handler;
pub mod service;
pub mod store;
pub mod types;

pub use access::can_view;
pub use handler::{projects_router, ProjectsState};
pub use service::ProjectService;
pub use store::ProjectStore;
pub use types::{AccessLevel, CreateProjectRequest, ProjectRecord};
