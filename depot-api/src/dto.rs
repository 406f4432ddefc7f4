//! DTOs for API responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use depot_cache::{CacheLookup, CacheStats, LookupSource};
use depot_core::types::{Warehouse, WeatherReport};

/// Warehouse summary embedded in responses.
#[derive(Debug, Serialize)]
pub struct WarehouseDto {
    /// Warehouse id
    pub warehouse_id: i32,
    /// City name
    pub city_name: String,
    /// Three-letter city code
    pub city_code: String,
}

impl From<&Warehouse> for WarehouseDto {
    fn from(w: &Warehouse) -> Self {
        Self {
            warehouse_id: w.warehouse_id,
            city_name: w.city_name.clone(),
            city_code: w.city_code.clone(),
        }
    }
}

/// Current weather at a warehouse.
#[derive(Debug, Serialize)]
pub struct WarehouseWeatherResponse {
    /// The warehouse
    pub warehouse: WarehouseDto,
    /// Condition description, e.g. "light rain"
    pub description: String,
    /// Temperature in degrees Fahrenheit
    pub temperature: f64,
    /// When the report was fetched
    pub fetched_at: DateTime<Utc>,
    /// Whether it came from cache, a fresh fetch, or a stale fallback
    pub source: LookupSource,
    /// True when the report is past its freshness window
    pub stale: bool,
}

impl WarehouseWeatherResponse {
    /// Builds the response from a warehouse and its cache lookup.
    pub fn new(warehouse: &Warehouse, found: CacheLookup<WeatherReport>) -> Self {
        let stale = found.is_stale();
        Self {
            warehouse: WarehouseDto::from(warehouse),
            description: found.value.description,
            temperature: found.value.temperature,
            fetched_at: found.fetched_at,
            source: found.source,
            stale,
        }
    }
}

/// Weather cache statistics.
#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    /// Freshness window in seconds
    pub freshness_seconds: u64,
    /// Counters and sizes
    #[serde(flatten)]
    pub stats: CacheStats,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Warehouses in the directory
    pub warehouses_count: usize,
    /// Weather reports currently cached
    pub cached_reports: usize,
}
