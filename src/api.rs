//! HTTP application for ScholarHub
//!
//! Wraps the projects router with CORS and request tracing and serves it.
//!
//! ## Endpoint Map
//!
//! | Prefix                   | Module   | Description                       |
//! |--------------------------|----------|-----------------------------------|
//! | `/health`                | projects | Liveness probe with project count |
//! | `/api/v1/projects/*`     | projects | Visible listing, publish, update  |
//! | `/api/v1/admin/projects` | projects | Unfiltered listing (admin token)  |

use crate::config::ScholarHubConfig;
use crate::error::Result;
use crate::projects::handler::VIEWER_HEADER;
use crate::projects::{projects_router, ProjectService, ProjectsState};
use axum::http::{header, HeaderName, Method};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete HTTP application
pub fn build_app(state: ProjectsState, cors_origins: &[String]) -> Router {
    projects_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(cors_origins))
}

/// Open the project service from `config` and serve until `shutdown`
/// resolves.
pub async fn serve(
    config: &ScholarHubConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let service = Arc::new(ProjectService::from_config(config).await?);
    let admin_token = config.admin.resolve_token();
    if admin_token.is_none() {
        tracing::warn!(
            "{} is not set; admin endpoints are disabled",
            config.admin.token_env
        );
    }
    if config.server.demo_mode {
        tracing::warn!("Demo mode enabled: anonymous publishing uses fabricated identities");
    }

    let state = ProjectsState {
        service,
        admin_token,
        demo_mode: config.server.demo_mode,
    };
    let app = build_app(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("ScholarHub listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(VIEWER_HEADER),
        ]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(parsed)
    }
}
