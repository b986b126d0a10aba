//! Project, version and BOM endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use super::{guard, hub_error, not_found, page, PageQuery};
use crate::mock_server::state::MockState;
use crate::{ProjectRequest, ProjectVersionRequest};

type Shared = State<Arc<RwLock<MockState>>>;

fn created(location: String) -> Response {
    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}

/// GET /api/projects
pub async fn list_projects(
    State(state): Shared,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    let projects: Vec<_> = state
        .list_projects(query.q.as_deref())
        .into_iter()
        .cloned()
        .collect();
    page(&projects, &query, "/api/projects")
}

/// POST /api/projects
pub async fn create_project(
    State(state): Shared,
    headers: HeaderMap,
    Json(request): Json<ProjectRequest>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = guard(&state, &headers, true) {
        return rejection;
    }

    if state.projects.values().any(|p| p.name == request.name) {
        return hub_error(
            StatusCode::PRECONDITION_FAILED,
            "central.constraint_violation.project_name_duplicate_not_allowed",
            format!("A project named {} already exists", request.name),
        );
    }

    let id = state.create_project(request);
    created(format!("/api/projects/{id}"))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    match state.get_project(&id) {
        Some(project) => (StatusCode::OK, Json(project.clone())).into_response(),
        None => not_found("project", &id),
    }
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<ProjectRequest>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = guard(&state, &headers, true) {
        return rejection;
    }

    if state.update_project(&id, request) {
        StatusCode::OK.into_response()
    } else {
        not_found("project", &id)
    }
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = guard(&state, &headers, true) {
        return rejection;
    }

    if state.delete_project(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("project", &id)
    }
}

/// GET /api/projects/{id}/versions
pub async fn list_versions(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    let Some(versions) = state.versions.get(&id) else {
        return not_found("project", &id);
    };

    let filter = query
        .q
        .as_deref()
        .and_then(|q| q.strip_prefix("versionName:"))
        .map(str::to_string);
    let versions: Vec<_> = versions
        .iter()
        .filter(|v| filter.as_ref().map(|f| v.version_name == *f).unwrap_or(true))
        .cloned()
        .collect();
    page(&versions, &query, &format!("/api/projects/{id}/versions"))
}

/// POST /api/projects/{id}/versions
pub async fn create_version(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<ProjectVersionRequest>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = guard(&state, &headers, true) {
        return rejection;
    }

    match state.create_version(&id, request) {
        Some(version_id) => created(format!("/api/projects/{id}/versions/{version_id}")),
        None => not_found("project", &id),
    }
}

/// GET /api/projects/{id}/versions/{version_id}
pub async fn get_version(
    State(state): Shared,
    headers: HeaderMap,
    Path((id, version_id)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    match state.get_version(&id, &version_id) {
        Some(version) => (StatusCode::OK, Json(version.clone())).into_response(),
        None => not_found("project version", &version_id),
    }
}

/// GET /api/projects/{id}/versions/{version_id}/components
pub async fn list_bom_components(
    State(state): Shared,
    headers: HeaderMap,
    Path((id, version_id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    match state.bom.get(&version_id) {
        Some(components) => page(
            components,
            &query,
            &format!("/api/projects/{id}/versions/{version_id}/components"),
        ),
        None => not_found("project version", &version_id),
    }
}

/// GET /api/projects/{id}/versions/{version_id}/vulnerable-bom-components
pub async fn list_vulnerable_components(
    State(state): Shared,
    headers: HeaderMap,
    Path((id, version_id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    match state.vulnerable_bom.get(&version_id) {
        Some(components) => page(
            components,
            &query,
            &format!("/api/projects/{id}/versions/{version_id}/vulnerable-bom-components"),
        ),
        None => not_found("project version", &version_id),
    }
}

/// GET /api/projects/{id}/versions/{version_id}/codelocations
pub async fn list_version_code_locations(
    State(state): Shared,
    headers: HeaderMap,
    Path((id, version_id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    let Some(version) = state.get_version(&id, &version_id) else {
        return not_found("project version", &version_id);
    };
    let locations = state.code_locations_for(&version.meta.href);
    page(&locations, &query, &format!("{}/codelocations", version.meta.href))
}

/// GET /api/codelocations/{id}
pub async fn get_code_location(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    match state.code_locations.get(&id) {
        Some(location) => (StatusCode::OK, Json(location.clone())).into_response(),
        None => not_found("code location", &id),
    }
}

/// GET /api/policy-rules
pub async fn list_policy_rules(
    State(state): Shared,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    page(&state.policy_rules, &query, "/api/policy-rules")
}
