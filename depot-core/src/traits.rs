//! Common traits for Depot.
//!
//! These traits define the interfaces that different implementations can satisfy,
//! enabling modularity and testing.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Coordinates, NewWarehouse, Warehouse, WarehouseId, WeatherReport};

// ═══════════════════════════════════════════════════════════════════════════════
// WEATHER PROVIDER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of current weather conditions.
///
/// Implementations might use:
/// - A third-party HTTP API (production)
/// - A canned or scripted provider (tests)
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolves a city name to coordinates.
    async fn geocode(&self, city_name: &str) -> Result<Coordinates>;

    /// Fetches current conditions at the given coordinates.
    async fn current_weather(&self, coordinates: Coordinates) -> Result<WeatherReport>;

    /// Fetches current conditions for a warehouse.
    ///
    /// Uses stored coordinates when the warehouse has them and geocodes its
    /// city name otherwise.
    async fn weather_for(&self, warehouse: &Warehouse) -> Result<WeatherReport> {
        let coordinates = match warehouse.coordinates {
            Some(coordinates) => coordinates,
            None => self.geocode(&warehouse.city_name).await?,
        };
        self.current_weather(coordinates).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WAREHOUSE DIRECTORY TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Lookup of warehouses by id.
///
/// This is the narrow contract the weather consumer needs from whatever
/// stores warehouse records.
#[async_trait]
pub trait WarehouseDirectory: Send + Sync {
    /// Adds a warehouse and returns it with its assigned id.
    async fn add(&self, warehouse: NewWarehouse) -> Result<Warehouse>;

    /// Retrieves a warehouse by id.
    async fn get(&self, warehouse_id: WarehouseId) -> Result<Option<Warehouse>>;
}
