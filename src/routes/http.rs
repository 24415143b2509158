// JSON handlers: view data, UI events, container actions

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::models::{ContainerTypeFilter, FilterState, TimeRange};
use crate::service::{ContainerDraft, ContainerUpdate};
use crate::view_model::ActionError;

/// Service name and version (from Cargo.toml at build time).
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `{success: false, error}` with a status matching the failure.
pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "success": false, "error": self.1 }))).into_response()
    }
}

impl From<ActionError> for ApiError {
    fn from(e: ActionError) -> Self {
        let status = match e {
            ActionError::InProgress(_) => StatusCode::CONFLICT,
            ActionError::Service(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError(status, e.to_string())
    }
}

/// GET /version
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/dashboard — current view data.
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.view_model.view_data())
}

/// POST /api/dashboard/refresh — no-op while anything is loading.
pub(super) async fn refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.view_model.refresh_all().await;
    Json(state.view_model.view_data())
}

/// POST /api/filters — replace the whole filter selection (page resets to 1).
pub(super) async fn filters_handler(
    State(state): State<AppState>,
    Json(filters): Json<FilterState>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .view_model
        .apply_filter_state(filters)
        .await
        .map_err(|e| ApiError(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(state.view_model.view_data()))
}

#[derive(Deserialize)]
pub(super) struct SearchRequest {
    term: String,
}

/// POST /api/search — debounced; `applied` is false when a newer term superseded this one.
pub(super) async fn search_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let applied = state.search.search(&req.term).await;
    Json(json!({ "applied": applied }))
}

/// GET /api/search/recent
pub(super) async fn recent_searches_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.search.recent_searches().await)
}

#[derive(Deserialize)]
pub(super) struct PaginationRequest {
    page: Option<u32>,
    page_size: Option<u32>,
}

/// POST /api/pagination — page size wins over page (it resets to page 1).
pub(super) async fn pagination_handler(
    State(state): State<AppState>,
    Json(req): Json<PaginationRequest>,
) -> impl IntoResponse {
    match (req.page_size, req.page) {
        (Some(size), _) => state.view_model.change_page_size(size).await,
        (None, Some(page)) => state.view_model.change_page(page).await,
        (None, None) => {}
    }
    Json(state.view_model.view_data())
}

#[derive(Deserialize)]
pub(super) struct PerformanceRequest {
    time_range: Option<TimeRange>,
    container_type: Option<ContainerTypeFilter>,
}

/// POST /api/performance — time range and/or performance-card type toggle.
pub(super) async fn performance_handler(
    State(state): State<AppState>,
    Json(req): Json<PerformanceRequest>,
) -> impl IntoResponse {
    if let Some(selected) = req.container_type {
        state.view_model.select_container_type(selected).await;
    }
    if let Some(range) = req.time_range {
        state.view_model.change_time_range(range).await;
    }
    Json(state.view_model.view_data())
}

/// POST /api/containers
pub(super) async fn create_container_handler(
    State(state): State<AppState>,
    Json(draft): Json<ContainerDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state.view_model.create_container(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "container": created })),
    ))
}

/// PUT /api/containers/{id}
pub(super) async fn update_container_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<ContainerUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.view_model.update_container(id, update).await?;
    Ok(Json(json!({ "success": true, "container": updated })))
}

/// DELETE /api/containers/{id}
pub(super) async fn delete_container_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.view_model.delete_container(id).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub(super) struct ShutdownRequest {
    reason: Option<String>,
}

/// POST /api/containers/{id}/shutdown — body is optional.
pub(super) async fn shutdown_container_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let reason = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<ShutdownRequest>(&body)
            .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.to_string()))?
            .reason
    };
    state.view_model.shutdown_container(id, reason).await?;
    Ok(Json(json!({ "success": true })))
}
