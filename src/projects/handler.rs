//! HTTP handlers for the Projects API
//!
//! - GET    /api/v1/projects          projects visible to the caller
//! - GET    /api/v1/projects/:id      one visible project
//! - POST   /api/v1/projects          publish a project
//! - PUT    /api/v1/projects/:id      replace a project (authors only)
//! - GET    /api/v1/admin/projects    every project (admin token)
//! - GET    /health                   liveness
//!
//! The caller's identity arrives in the `x-viewer-identity` header and is
//! trusted as already authenticated by the fronting gateway.

use super::service::ProjectService;
use super::types::{ApiError, CreateProjectRequest, ProjectRecord};
use crate::error::Error;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

/// Header carrying the authenticated caller identity
pub const VIEWER_HEADER: &str = "x-viewer-identity";

/// Shared state for project handlers
#[derive(Clone)]
pub struct ProjectsState {
    pub service: Arc<ProjectService>,
    /// Bearer token for the admin listing; `None` disables it
    pub admin_token: Option<String>,
    /// Allow anonymous publishing with a fabricated author
    pub demo_mode: bool,
}

/// Create the projects router
pub fn projects_router(state: ProjectsState) -> Router {
    Router::new()
        .route("/api/v1/projects", get(list_projects).post(create_project))
        .route("/api/v1/projects/:id", get(get_project).put(update_project))
        .route("/api/v1/admin/projects", get(list_all_projects))
        .route("/health", get(health))
        .with_state(state)
}

fn viewer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(VIEWER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn json_error(status: StatusCode, err: ApiError) -> (StatusCode, Json<Value>) {
    (status, Json(serde_json::to_value(err).unwrap_or(Value::Null)))
}

fn error_response(err: Error) -> (StatusCode, Json<Value>) {
    match err {
        Error::NotFound(_) => json_error(StatusCode::NOT_FOUND, ApiError::not_found(err.to_string())),
        Error::Validation(_) => {
            json_error(StatusCode::BAD_REQUEST, ApiError::bad_request(err.to_string()))
        }
        other => {
            tracing::error!("Project request failed: {}", other);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal(other.to_string()),
            )
        }
    }
}

fn ok_json<T: serde::Serialize>(status: StatusCode, body: T) -> (StatusCode, Json<Value>) {
    match serde_json::to_value(body) {
        Ok(value) => (status, Json(value)),
        Err(e) => error_response(e.into()),
    }
}

/// GET /api/v1/projects
async fn list_projects(State(state): State<ProjectsState>, headers: HeaderMap) -> impl IntoResponse {
    let projects = state.service.list_visible(viewer(&headers)).await;
    Json(projects)
}

/// GET /api/v1/projects/:id
async fn get_project(
    State(state): State<ProjectsState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match state.service.get_visible(id, viewer(&headers)).await {
        Ok(project) => ok_json(StatusCode::OK, project),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/projects
async fn create_project(
    State(state): State<ProjectsState>,
    headers: HeaderMap,
    Json(request): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    let author = viewer(&headers);
    if author.is_none() && !state.demo_mode {
        return json_error(
            StatusCode::UNAUTHORIZED,
            ApiError::unauthorized(format!("{} header is required", VIEWER_HEADER)),
        );
    }

    match state.service.publish(request, author).await {
        Ok(project) => ok_json(StatusCode::CREATED, project),
        Err(e) => error_response(e),
    }
}

/// PUT /api/v1/projects/:id
///
/// Only a listed author of the stored record may replace it. Non-authors
/// get the same 404 as a missing id.
async fn update_project(
    State(state): State<ProjectsState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(record): Json<ProjectRecord>,
) -> impl IntoResponse {
    let Some(caller) = viewer(&headers) else {
        return json_error(
            StatusCode::UNAUTHORIZED,
            ApiError::unauthorized(format!("{} header is required", VIEWER_HEADER)),
        );
    };

    if record.id != id {
        return json_error(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request(format!("body id {} does not match path id {}", record.id, id)),
        );
    }

    match state.service.update_as(record, caller).await {
        Ok(project) => ok_json(StatusCode::OK, project),
        Err(e) => error_response(e),
    }
}

/// GET /api/v1/admin/projects
async fn list_all_projects(
    State(state): State<ProjectsState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(expected) = state.admin_token.as_deref() else {
        return json_error(
            StatusCode::FORBIDDEN,
            ApiError::forbidden("Admin access is not configured"),
        );
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented != Some(expected) {
        return json_error(
            StatusCode::UNAUTHORIZED,
            ApiError::unauthorized("Invalid or missing admin token"),
        );
    }

    ok_json(StatusCode::OK, state.service.list_all_unfiltered().await)
}

/// GET /health
async fn health(State(state): State<ProjectsState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "projects": state.service.store().len().await,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Affiliation, StaticDirectory};
    use crate::projects::backend::MemoryBackend;
    use crate::projects::store::ProjectStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn make_app(demo_mode: bool, admin_token: Option<&str>) -> (Router, Arc<ProjectService>) {
        let store = Arc::new(
            ProjectStore::open(Arc::new(MemoryBackend::new()), Vec::new())
                .await
                .unwrap(),
        );
        let mut directory = StaticDirectory::new();
        directory.insert(
            "0xAAA",
            Affiliation {
                institution_id: 2,
                department_id: 5,
            },
        );
        directory.insert(
            "0xCCC",
            Affiliation {
                institution_id: 2,
                department_id: 6,
            },
        );
        let service = Arc::new(ProjectService::new(store, Arc::new(directory)));
        let state = ProjectsState {
            service: service.clone(),
            admin_token: admin_token.map(str::to_string),
            demo_mode,
        };
        (projects_router(state), service)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn create_body(access_level: u8) -> String {
        serde_json::json!({
            "title": "Coral reef acoustics",
            "description": "Hydrophone recordings from four reef sites",
            "departmentId": 3,
            "year": 2024,
            "accessLevel": access_level
        })
        .to_string()
    }

    fn post_project(viewer: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/projects")
            .header("content-type", "application/json");
        if let Some(v) = viewer {
            builder = builder.header(VIEWER_HEADER, v);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn get_request(uri: &str, viewer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(v) = viewer {
            builder = builder.header(VIEWER_HEADER, v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_project() {
        let (app, _service) = make_app(false, None).await;
        let resp = app
            .oneshot(post_project(Some("0xAAA"), create_body(2)))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["id"], 1);
        assert_eq!(json["accessLevel"], 2);
        assert_eq!(json["institutionId"], 2);
        assert_eq!(json["departmentId"], 5);
        assert_eq!(json["authors"][0], "0xAAA");
    }

    #[tokio::test]
    async fn test_create_requires_identity_outside_demo_mode() {
        let (app, _service) = make_app(false, None).await;
        let resp = app.oneshot(post_project(None, create_body(0))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_in_demo_mode_fabricates_author() {
        let (app, _service) = make_app(true, None).await;
        let resp = app.oneshot(post_project(None, create_body(0))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert!(json["authors"][0].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_access_level() {
        let (app, _service) = make_app(false, None).await;
        let resp = app
            .oneshot(post_project(Some("0xAAA"), create_body(7)))
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn test_list_filters_by_viewer() {
        let (app, _service) = make_app(false, None).await;
        app.clone()
            .oneshot(post_project(Some("0xAAA"), create_body(2)))
            .await
            .unwrap();
        app.clone()
            .oneshot(post_project(Some("0xAAA"), create_body(1)))
            .await
            .unwrap();

        let json = body_json(app.clone().oneshot(get_request("/api/v1/projects", None)).await.unwrap()).await;
        assert!(json.as_array().unwrap().is_empty());

        let json = body_json(
            app.clone()
                .oneshot(get_request("/api/v1/projects", Some("0xCCC")))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json.as_array().unwrap().len(), 1);

        let json = body_json(
            app.oneshot(get_request("/api/v1/projects", Some("0xAAA")))
                .await
                .unwrap(),
        )
        .await;
        let ids: Vec<u64> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_get_hidden_project_is_not_found() {
        let (app, _service) = make_app(false, None).await;
        app.clone()
            .oneshot(post_project(Some("0xAAA"), create_body(2)))
            .await
            .unwrap();

        let hidden = app
            .clone()
            .oneshot(get_request("/api/v1/projects/1", Some("0xBBB")))
            .await
            .unwrap();
        assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
        let hidden_body = body_json(hidden).await;

        let missing = app
            .clone()
            .oneshot(get_request("/api/v1/projects/2", Some("0xBBB")))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(missing).await["error"]["code"], hidden_body["error"]["code"]);

        let own = app
            .oneshot(get_request("/api/v1/projects/1", Some("0xAAA")))
            .await
            .unwrap();
        assert_eq!(own.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_update_by_author() {
        let (app, service) = make_app(false, None).await;
        let stored = service
            .publish(
                CreateProjectRequest {
                    title: "Draft".to_string(),
                    description: "D".to_string(),
                    department_id: 1,
                    year: 2024,
                    access_level: crate::projects::types::AccessLevel::Private,
                    artifact_hash: None,
                },
                Some("0xAAA"),
            )
            .await
            .unwrap();

        let mut changed = stored.clone();
        changed.title = "Final".to_string();
        let body = serde_json::to_string(&changed).unwrap();

        let put = |viewer: &str, uri: &str, body: String| {
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header("content-type", "application/json")
                .header(VIEWER_HEADER, viewer)
                .body(Body::from(body))
                .unwrap()
        };

        let resp = app
            .clone()
            .oneshot(put("0xBBB", "/api/v1/projects/1", body.clone()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .clone()
            .oneshot(put("0xAAA", "/api/v1/projects/2", body.clone()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(put("0xAAA", "/api/v1/projects/1", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["title"], "Final");
        assert_eq!(service.store().get(1).await.unwrap().title, "Final");
    }

    #[tokio::test]
    async fn test_admin_listing_requires_token() {
        let (app, _service) = make_app(false, Some("s3cret")).await;
        app.clone()
            .oneshot(post_project(Some("0xAAA"), create_body(2)))
            .await
            .unwrap();

        let resp = app
            .clone()
            .oneshot(get_request("/api/v1/admin/projects", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/admin/projects")
                    .header("authorization", "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_listing_disabled_without_token() {
        let (app, _service) = make_app(false, None).await;
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/admin/projects")
                    .header("authorization", "Bearer anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _service) = make_app(false, None).await;
        let resp = app.oneshot(get_request("/health", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["projects"], 0);
    }
}
