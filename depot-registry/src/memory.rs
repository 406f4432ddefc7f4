//! In-memory warehouse directory.
//!
//! Thread-safe storage suitable for development, testing, and
//! single-process deployments.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, instrument};

use depot_core::error::{DepotError, Result};
use depot_core::traits::WarehouseDirectory;
use depot_core::types::{NewWarehouse, Warehouse, WarehouseId};
use depot_core::validation::validate_add_warehouse_input;

/// In-memory warehouse directory.
///
/// Warehouses are indexed by:
/// - ID: For direct lookup
/// - City code: For duplicate rejection
///
/// All operations are thread-safe and can be called concurrently.
#[derive(Debug)]
pub struct MemoryWarehouseDirectory {
    /// Primary storage: ID → Warehouse
    warehouses: DashMap<WarehouseId, Warehouse>,
    /// City code index: code → warehouse ID
    code_index: DashMap<String, WarehouseId>,
    /// Next warehouse ID
    next_id: AtomicI32,
}

impl MemoryWarehouseDirectory {
    /// Creates a new empty directory.
    pub fn new() -> Self {
        Self {
            warehouses: DashMap::new(),
            code_index: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }

    /// Returns the number of warehouses.
    pub fn len(&self) -> usize {
        self.warehouses.len()
    }

    /// Returns true if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.warehouses.is_empty()
    }
}

impl Default for MemoryWarehouseDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WarehouseDirectory for MemoryWarehouseDirectory {
    /// Adds a warehouse.
    ///
    /// The record is validated, checked against existing city codes, and
    /// assigned the next sequential id.
    #[instrument(skip(self, warehouse), fields(city_code = %warehouse.city_code))]
    async fn add(&self, warehouse: NewWarehouse) -> Result<Warehouse> {
        if !validate_add_warehouse_input(&warehouse.city_name, &warehouse.city_code) {
            return Err(DepotError::ValidationError(format!(
                "invalid warehouse: {} ({})",
                warehouse.city_name, warehouse.city_code
            )));
        }

        // The entry guard keeps the code reserved until the record is stored.
        let slot = match self.code_index.entry(warehouse.city_code.clone()) {
            Entry::Occupied(_) => {
                return Err(DepotError::DuplicateWarehouse(warehouse.city_code));
            }
            Entry::Vacant(slot) => slot,
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = Warehouse::from_new(id, warehouse);
        self.warehouses.insert(id, stored.clone());
        slot.insert(id);

        debug!(id, city = %stored.city_name, "Added warehouse");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn get(&self, warehouse_id: WarehouseId) -> Result<Option<Warehouse>> {
        Ok(self.warehouses.get(&warehouse_id).map(|entry| entry.clone()))
    }
}
