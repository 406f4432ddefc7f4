//! # Depot Core
//!
//! Core types, errors, and traits for the Depot warehouse inventory service.
//!
//! This crate provides the foundational building blocks used by all other Depot crates:
//!
//! - **Types**: Warehouses, inventory item input, coordinates, and weather reports
//! - **Errors**: A single error hierarchy with classification helpers
//! - **Validation**: Form input checks for items and warehouses
//! - **Constants**: Cache and weather defaults
//! - **Traits**: Seams for weather providers and warehouse lookup
//!
//! ## Example
//!
//! ```rust
//! use depot_core::{NewWarehouse, DepotError};
//!
//! let warehouse = NewWarehouse::parse("san francisco", "sfo").unwrap();
//! assert_eq!(warehouse.city_name, "San Francisco");
//! assert_eq!(warehouse.city_code, "SFO");
//!
//! let err = NewWarehouse::parse("Oakland", "OAKL").unwrap_err();
//! assert!(matches!(err, DepotError::ValidationError(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{DepotError, Result};
pub use traits::*;
pub use types::*;
pub use validation::{is_float, validate_add_warehouse_input, validate_create_item_input};
