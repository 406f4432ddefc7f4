//! Form input checks.
//!
//! These are plain predicates; the typed constructors in [`crate::types`]
//! build on them and produce descriptive errors.

use crate::constants::CITY_CODE_LEN;

/// Returns true if `input` parses as a floating-point number.
///
/// Surrounding whitespace is ignored.
pub fn is_float(input: &str) -> bool {
    input.trim().parse::<f64>().is_ok()
}

pub(crate) fn is_digits(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
}

/// Checks the create-item form.
///
/// Every field must be non-empty, `sku` and `quantity` must be digits only,
/// and `unit_cost` must be a number. Description is not checked.
pub fn validate_create_item_input(
    sku: &str,
    name: &str,
    quantity: &str,
    unit: &str,
    unit_cost: &str,
    warehouse: &str,
) -> bool {
    let all_present = [sku, name, quantity, unit, unit_cost, warehouse]
        .iter()
        .all(|field| !field.is_empty());

    all_present && is_digits(sku) && is_digits(quantity) && is_float(unit_cost)
}

/// Checks the add-warehouse form: both fields present and a three character city code.
pub fn validate_add_warehouse_input(city_name: &str, city_code: &str) -> bool {
    !city_name.is_empty() && city_code.chars().count() == CITY_CODE_LEN
}
