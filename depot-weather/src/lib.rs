//! Weather lookups for Depot warehouses.
//!
//! [`WeatherClient`] talks to the third-party API; [`WarehouseWeather`] puts a
//! time-bounded cache in front of it, keyed by warehouse id.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;
mod service;

pub use client::{WeatherClient, WeatherConfig};
pub use service::WarehouseWeather;
