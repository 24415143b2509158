// HTTP + WebSocket binding surface for the dashboard view-model

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::support::DebouncedSearch;
use crate::view_model::DashboardViewModel;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) view_model: Arc<DashboardViewModel>,
    pub(crate) search: Arc<DebouncedSearch>,
}

pub fn app(view_model: Arc<DashboardViewModel>, search: Arc<DebouncedSearch>) -> Router {
    let state = AppState { view_model, search };
    Router::new()
        .route("/", get(|| async { "farmdash: dashboard core is up" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/dashboard", get(http::dashboard_handler)) // GET /api/dashboard
        .route("/api/dashboard/refresh", post(http::refresh_handler)) // POST /api/dashboard/refresh
        .route("/api/filters", post(http::filters_handler)) // POST /api/filters
        .route("/api/search", post(http::search_handler)) // POST /api/search
        .route("/api/search/recent", get(http::recent_searches_handler)) // GET /api/search/recent
        .route("/api/pagination", post(http::pagination_handler)) // POST /api/pagination
        .route("/api/performance", post(http::performance_handler)) // POST /api/performance
        .route("/api/containers", post(http::create_container_handler)) // POST /api/containers
        .route(
            "/api/containers/{id}",
            put(http::update_container_handler).delete(http::delete_container_handler),
        ) // PUT, DELETE /api/containers/{id}
        .route(
            "/api/containers/{id}/shutdown",
            post(http::shutdown_container_handler),
        ) // POST /api/containers/{id}/shutdown
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
