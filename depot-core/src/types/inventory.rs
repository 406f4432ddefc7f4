//! Inventory item input.
//!
//! Items arrive as raw form strings. [`InventoryItemInput::validate`] turns
//! them into a typed [`NewInventoryItem`] or reports the first bad field.

use serde::{Deserialize, Serialize};

use super::WarehouseId;
use crate::error::{DepotError, Result};
use crate::validation::{is_digits, is_float, validate_create_item_input};

/// Raw, unvalidated item form fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InventoryItemInput {
    /// Stock keeping unit, digits only
    pub sku: String,
    /// Item name
    pub name: String,
    /// Free-form description (may be empty)
    #[serde(default)]
    pub description: String,
    /// Quantity on hand, digits only
    pub quantity: String,
    /// Unit of measure, e.g. "box"
    pub unit: String,
    /// Cost per unit
    pub unit_cost: String,
    /// Id of the warehouse holding the item
    pub warehouse: String,
}

/// A validated inventory item ready to be stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    /// Stock keeping unit
    pub sku: u64,
    /// Item name
    pub name: String,
    /// Description
    pub description: String,
    /// Quantity on hand
    pub quantity: u64,
    /// Unit of measure
    pub unit: String,
    /// Cost per unit
    pub unit_cost: f64,
    /// Warehouse holding the item
    pub warehouse_id: WarehouseId,
}

impl InventoryItemInput {
    /// Validates every field and converts to typed values.
    pub fn validate(&self) -> Result<NewInventoryItem> {
        if !validate_create_item_input(
            &self.sku,
            &self.name,
            &self.quantity,
            &self.unit,
            &self.unit_cost,
            &self.warehouse,
        ) {
            return Err(DepotError::ValidationError(self.first_invalid_field().into()));
        }

        let sku = self
            .sku
            .parse::<u64>()
            .map_err(|e| DepotError::ValidationError(format!("sku: {e}")))?;
        let quantity = self
            .quantity
            .parse::<u64>()
            .map_err(|e| DepotError::ValidationError(format!("quantity: {e}")))?;
        let unit_cost = self
            .unit_cost
            .trim()
            .parse::<f64>()
            .map_err(|e| DepotError::ValidationError(format!("unit_cost: {e}")))?;
        if !unit_cost.is_finite() {
            return Err(DepotError::ValidationError(
                "unit_cost must be a finite number".into(),
            ));
        }
        let warehouse_id = self
            .warehouse
            .trim()
            .parse::<WarehouseId>()
            .map_err(|e| DepotError::ValidationError(format!("warehouse: {e}")))?;

        Ok(NewInventoryItem {
            sku,
            name: self.name.clone(),
            description: self.description.clone(),
            quantity,
            unit: self.unit.clone(),
            unit_cost,
            warehouse_id,
        })
    }

    fn first_invalid_field(&self) -> &'static str {
        if self.sku.is_empty() {
            "sku is required"
        } else if self.name.is_empty() {
            "name is required"
        } else if self.quantity.is_empty() {
            "quantity is required"
        } else if self.unit.is_empty() {
            "unit is required"
        } else if self.unit_cost.is_empty() {
            "unit_cost is required"
        } else if self.warehouse.is_empty() {
            "warehouse is required"
        } else if !is_digits(&self.sku) {
            "sku must contain digits only"
        } else if !is_digits(&self.quantity) {
            "quantity must contain digits only"
        } else if !is_float(&self.unit_cost) {
            "unit_cost must be a number"
        } else {
            "invalid item input"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> InventoryItemInput {
        InventoryItemInput {
            sku: "100234".into(),
            name: "Pallet wrap".into(),
            description: "18in x 1500ft".into(),
            quantity: "40".into(),
            unit: "roll".into(),
            unit_cost: "21.75".into(),
            warehouse: "3".into(),
        }
    }

    #[test]
    fn test_validate_ok() {
        let item = widget().validate().unwrap();
        assert_eq!(item.sku, 100234);
        assert_eq!(item.quantity, 40);
        assert_eq!(item.unit_cost, 21.75);
        assert_eq!(item.warehouse_id, 3);
    }

    #[test]
    fn test_validate_reports_field() {
        let mut input = widget();
        input.quantity = "4o".into();
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("quantity"));

        let mut input = widget();
        input.name.clear();
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn test_description_optional() {
        let mut input = widget();
        input.description.clear();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_non_finite_cost_rejected() {
        let mut input = widget();
        input.unit_cost = "inf".into();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_non_numeric_warehouse_rejected() {
        let mut input = widget();
        input.warehouse = "north".into();
        assert!(input.validate().unwrap_err().is_validation_error());
    }
}
