pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route("/api/v1/analyses/:id", get(handlers::handle_get_analysis))
        // Rendered report retrieval
        .route(
            "/api/v1/reports/:id",
            get(handlers::handle_get_report_text),
        )
        .route(
            "/api/v1/reports/:id/html",
            get(handlers::handle_get_report_html),
        )
        .with_state(state)
}
