//! Warehouse types.

use serde::{Deserialize, Serialize};

use crate::constants::CITY_CODE_LEN;
use crate::error::{DepotError, Result};
use crate::validation::validate_add_warehouse_input;

/// Identifier of a warehouse. Also the key of the weather cache.
pub type WarehouseId = i32;

// ═══════════════════════════════════════════════════════════════════════════════
// COORDINATES
// ═══════════════════════════════════════════════════════════════════════════════

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, -90..=90
    pub lat: f64,
    /// Longitude, -180..=180
    pub lon: f64,
}

impl Coordinates {
    /// Creates coordinates, rejecting values outside the valid ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(DepotError::ValidationError(format!(
                "coordinates out of range: lat={lat}, lon={lon}"
            )));
        }
        Ok(Self { lat, lon })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WAREHOUSE
// ═══════════════════════════════════════════════════════════════════════════════

/// A warehouse for inventory storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    /// Unique identifier (assigned by the directory)
    pub warehouse_id: WarehouseId,
    /// Three-letter city code, upper case
    pub city_code: String,
    /// City name, title case. Used for geocoding when coordinates are unknown.
    pub city_name: String,
    /// Known location, skips geocoding when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Warehouse {
    /// Builds a warehouse from validated input and an assigned id.
    pub fn from_new(warehouse_id: WarehouseId, new: NewWarehouse) -> Self {
        Self {
            warehouse_id,
            city_code: new.city_code,
            city_name: new.city_name,
            coordinates: new.coordinates,
        }
    }
}

/// Validated input for adding a warehouse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewWarehouse {
    /// City name, title case
    pub city_name: String,
    /// City code, upper case
    pub city_code: String,
    /// Optional known location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl NewWarehouse {
    /// Normalizes and validates raw form input.
    ///
    /// The city name is title-cased and the code upper-cased before the
    /// checks run, so `"san francisco"`/`"sfo"` is accepted.
    pub fn parse(city_name: &str, city_code: &str) -> Result<Self> {
        let city_name = title_case(city_name.trim());
        let city_code = city_code.trim().to_uppercase();

        if !validate_add_warehouse_input(&city_name, &city_code) {
            return Err(DepotError::ValidationError(format!(
                "city name is required and city code must be {CITY_CODE_LEN} characters"
            )));
        }
        if !city_code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DepotError::ValidationError(format!(
                "city code must be alphabetic: {city_code}"
            )));
        }

        Ok(Self {
            city_name,
            city_code,
            coordinates: None,
        })
    }

    /// Attaches known coordinates.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
