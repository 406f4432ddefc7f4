//! Domain types for Depot.
//!
//! - [`Warehouse`]: A storage location, keyed by an integer id
//! - [`NewWarehouse`]: Normalized, validated input for adding a warehouse
//! - [`Coordinates`]: Latitude/longitude used to query weather
//! - [`WeatherReport`]: Current conditions for a warehouse's city
//! - [`InventoryItemInput`] / [`NewInventoryItem`]: Raw and validated item forms

mod inventory;
mod warehouse;
mod weather;

pub use inventory::*;
pub use warehouse::*;
pub use weather::*;
