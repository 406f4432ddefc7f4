//! Weather report type.

use serde::{Deserialize, Serialize};

/// Current weather conditions for a warehouse's city.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Short human-readable description, e.g. "clear sky"
    pub description: String,
    /// Temperature in degrees Fahrenheit
    pub temperature: f64,
}

impl WeatherReport {
    /// Creates a report.
    pub fn new(description: impl Into<String>, temperature: f64) -> Self {
        Self {
            description: description.into(),
            temperature,
        }
    }
}
