//! API route handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{debug, instrument};

use depot_core::error::DepotError;
use depot_core::traits::WarehouseDirectory;
use depot_core::types::WarehouseId;

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /api/v1/warehouses/:id/weather
#[instrument(skip(state))]
pub async fn warehouse_weather(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WarehouseWeatherResponse>> {
    let warehouse_id: WarehouseId = id
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid warehouse id: {}", id)))?;

    let warehouse = state
        .directory
        .get(warehouse_id)
        .await?
        .ok_or(DepotError::WarehouseNotFound(warehouse_id))?;

    let found = state.weather.weather_for(&warehouse).await?;

    debug!(
        warehouse_id,
        source = ?found.source,
        "Served warehouse weather"
    );

    Ok(Json(WarehouseWeatherResponse::new(&warehouse, found)))
}

/// GET /api/v1/cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        freshness_seconds: state.weather.freshness().as_secs(),
        stats: state.weather.stats(),
    })
}

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let start = START_TIME.get_or_init(Instant::now);
    let uptime = start.elapsed().as_secs();

    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: uptime,
        warehouses_count: state.directory.len(),
        cached_reports: state.weather.stats().entries,
    })
}
