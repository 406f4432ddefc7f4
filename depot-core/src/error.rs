//! Error types for Depot.
//!
//! This module provides a single error hierarchy using `thiserror`.
//! All errors include context and are designed to be actionable.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using `DepotError`.
pub type Result<T> = std::result::Result<T, DepotError>;

/// Main error type for all Depot operations.
#[derive(Debug, Error)]
pub enum DepotError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CACHE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The fetch function behind a cache lookup failed.
    ///
    /// The source is shared because every caller coalesced onto the same
    /// in-flight refresh observes the same failure.
    #[error("Fetch failed for key '{key}': {source}")]
    FetchFailed {
        key: String,
        #[source]
        source: Arc<DepotError>,
    },

    /// The fetch function did not finish within its timeout.
    #[error("Fetch for key '{key}' timed out after {timeout:?}")]
    FetchTimeout { key: String, timeout: Duration },

    // ═══════════════════════════════════════════════════════════════════════════
    // WAREHOUSE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// No warehouse with the given id.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(i32),

    /// A warehouse with the same city code already exists.
    #[error("Duplicate warehouse city code: {0}")]
    DuplicateWarehouse(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // WEATHER API ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Geocoding returned no match for a city.
    #[error("City not found by geocoding: {0}")]
    CityNotFound(String),

    /// Weather API answered with a non-success status.
    #[error("Weather API returned {status}: {message}")]
    WeatherApiError { status: u16, message: String },

    /// Weather API response could not be interpreted.
    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Connection timeout.
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // IO ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Socket I/O error, e.g. binding the API listener.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DepotError {
    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            DepotError::HttpError(_)
            | DepotError::ConnectionTimeout(_)
            | DepotError::FetchTimeout { .. } => true,
            DepotError::WeatherApiError { status, .. } => *status == 429 || *status >= 500,
            DepotError::FetchFailed { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    /// Returns true if a cache refresh failed, whether by error or by timeout.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            DepotError::FetchFailed { .. } | DepotError::FetchTimeout { .. }
        )
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            DepotError::ValidationError(_) | DepotError::DuplicateWarehouse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DepotError::FetchTimeout {
            key: "7".into(),
            timeout: Duration::from_secs(10),
        };
        assert!(err.to_string().contains("'7'"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_fetch_failed_keeps_source() {
        let err = DepotError::FetchFailed {
            key: "W1".into(),
            source: Arc::new(DepotError::CityNotFound("Atlantis".into())),
        };
        assert!(err.to_string().contains("Atlantis"));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("City not found"));
    }

    #[test]
    fn test_error_classification() {
        assert!(DepotError::HttpError("test".into()).is_recoverable());
        assert!(DepotError::ConnectionTimeout("test".into()).is_recoverable());
        assert!(DepotError::WeatherApiError { status: 503, message: String::new() }.is_recoverable());
        assert!(!DepotError::WeatherApiError { status: 401, message: String::new() }.is_recoverable());
        assert!(!DepotError::ValidationError("test".into()).is_recoverable());

        let wrapped = DepotError::FetchFailed {
            key: "1".into(),
            source: Arc::new(DepotError::HttpError("reset".into())),
        };
        assert!(wrapped.is_recoverable());
        assert!(wrapped.is_fetch_failure());
        assert!(DepotError::FetchTimeout { key: "1".into(), timeout: Duration::ZERO }.is_fetch_failure());
        assert!(!DepotError::WarehouseNotFound(1).is_fetch_failure());

        assert!(DepotError::ValidationError("test".into()).is_validation_error());
        assert!(!DepotError::HttpError("test".into()).is_validation_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err = DepotError::from(io);
        assert!(matches!(err, DepotError::IoError(_)));
        assert!(!err.is_fetch_failure());
    }
}
