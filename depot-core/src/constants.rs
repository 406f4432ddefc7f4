//! Service-wide constants for Depot.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// WEATHER CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// How long a warehouse weather report stays fresh, in seconds.
pub const DEFAULT_WEATHER_TTL_SECS: u64 = 3600;

/// Default freshness window for warehouse weather reports.
pub const DEFAULT_WEATHER_TTL: Duration = Duration::from_secs(DEFAULT_WEATHER_TTL_SECS);

/// Upper bound on a single weather fetch (geocoding + current conditions), in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default fetch timeout as a [`Duration`].
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS);

// ═══════════════════════════════════════════════════════════════════════════════
// WEATHER API
// ═══════════════════════════════════════════════════════════════════════════════

/// Base URL of the OpenWeather API (geocoding and current weather share it).
pub const DEFAULT_WEATHER_API_BASE: &str = "https://api.openweathermap.org";

/// Unit system requested from the weather API. Temperatures come back in °F.
pub const WEATHER_UNITS: &str = "imperial";

// ═══════════════════════════════════════════════════════════════════════════════
// VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Exact length of a warehouse city code (IATA-style, e.g. "SFO").
pub const CITY_CODE_LEN: usize = 3;
