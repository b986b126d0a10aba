//! Rapid scan endpoint handlers.
//!
//! A scan moves through three states: started by POSTing the BDIO header,
//! fed chunks by `append` PUTs, then closed by a `finish` PUT. Its results
//! answer 404 until the scan is finished and the configured number of polls
//! has passed.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;

use super::{guard, hub_error, not_found, page, PageQuery};
use crate::mock_server::state::MockState;
use crate::rapid_scan::{DOCUMENT_COUNT_HEADER, MODE_HEADER};

type Shared = State<Arc<RwLock<MockState>>>;

/// POST /api/developer-scans
pub async fn start_scan(State(state): Shared, headers: HeaderMap, body: String) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = guard(&state, &headers, true) {
        return rejection;
    }

    let id = state.start_rapid_scan(body);
    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/developer-scans/{id}"))],
    )
        .into_response()
}

/// PUT /api/developer-scans/{id}
pub async fn upload_chunk(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = guard(&state, &headers, true) {
        return rejection;
    }

    let mode = headers
        .get(MODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let count = headers
        .get(DOCUMENT_COUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    let Some(scan) = state.rapid_scans.get_mut(&id) else {
        return not_found("scan", &id);
    };
    if scan.finished {
        return hub_error(
            StatusCode::CONFLICT,
            "scan.upload_already_finished",
            "The upload has already been finished",
        );
    }

    match mode.as_deref() {
        Some("append") => {
            scan.chunks.push(body);
            scan.announced_count = count.or(scan.announced_count);
        }
        Some("finish") => scan.finished = true,
        _ => {
            return hub_error(
                StatusCode::BAD_REQUEST,
                "scan.invalid_upload_mode",
                format!("{MODE_HEADER} must be append or finish"),
            )
        }
    }

    StatusCode::ACCEPTED.into_response()
}

/// GET /api/developer-scans/{id}/full-result
pub async fn full_result(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let mut state = state.write().await;
    if let Err(rejection) = guard(&state, &headers, false) {
        return rejection;
    }

    let ready_after = state.rapid_scan_ready_after;
    let Some(scan) = state.rapid_scans.get_mut(&id) else {
        return not_found("scan", &id);
    };

    let ready = scan.finished && scan.polls >= ready_after;
    scan.polls += 1;
    if !ready {
        return not_found("scan result", &id);
    }

    page(
        &state.rapid_scan_results,
        &query,
        &format!("/api/developer-scans/{id}/full-result"),
    )
}
