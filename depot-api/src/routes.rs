//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Warehouse weather
        .route(
            "/api/v1/warehouses/:id/weather",
            get(handlers::warehouse_weather),
        )

        // Cache
        .route("/api/v1/cache/stats", get(handlers::cache_stats))

        .with_state(state)
}
