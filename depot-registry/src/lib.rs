//! # Depot Registry
//!
//! Warehouse directory storage for Depot.
//!
//! Only an in-memory backend lives here; relational storage is owned by the
//! surrounding application.
//!
//! ## Example
//!
//! ```rust,ignore
//! use depot_registry::{MemoryWarehouseDirectory, WarehouseDirectory};
//!
//! let directory = MemoryWarehouseDirectory::new();
//! let denver = directory.add(NewWarehouse::parse("denver", "den")?).await?;
//! assert_eq!(denver.warehouse_id, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;

pub use memory::MemoryWarehouseDirectory;

// Re-export the trait from core
pub use depot_core::traits::WarehouseDirectory;
