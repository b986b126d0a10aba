//! Server status endpoint handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use super::guard;
use crate::mock_server::state::{meta, MockState};
use crate::{CurrentVersion, HealthCheckStatus, CURRENT_VERSION_PATH};

fn health(state: &MockState) -> Response {
    let status = if state.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthCheckStatus {
        healthy: state.healthy,
        details: BTreeMap::from([(
            "database".to_string(),
            serde_json::json!(if state.healthy { "UP" } else { "DOWN" }),
        )]),
    };
    (status, Json(body)).into_response()
}

/// GET /api/health-checks/readiness
pub async fn readiness(State(state): State<Arc<RwLock<MockState>>>) -> Response {
    health(&*state.read().await)
}

/// GET /api/health-checks/liveness
pub async fn liveness(State(state): State<Arc<RwLock<MockState>>>) -> Response {
    health(&*state.read().await)
}

/// GET /api/current-version
pub async fn current_version(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    let body = CurrentVersion {
        version: state.version.clone(),
        meta: meta(CURRENT_VERSION_PATH, &[]),
    };
    (StatusCode::OK, Json(body)).into_response()
}
