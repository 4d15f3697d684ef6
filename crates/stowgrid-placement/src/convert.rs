//! Type conversions between state store types and engine types.
//!
//! Bridges `stowgrid_state::{WarehouseLoad, SupplyUnit}` to the engine's
//! [`Warehouse`] and [`Item`]. Every unit becomes its own item keyed by
//! product id, so several items may share an id.

use stow_core::{Item, Warehouse};
use stowgrid_state::{SupplyUnit, WarehouseLoad};

/// Convert an aggregated [`WarehouseLoad`] to an engine [`Warehouse`].
pub fn load_to_warehouse(load: &WarehouseLoad) -> Warehouse {
    Warehouse::new(load.warehouse_id.clone(), load.total_capacity_m3)
        .with_stock(load.current_stock_m3)
        .with_incoming(load.incoming_m3)
}

pub fn loads_to_warehouses(loads: &[WarehouseLoad]) -> Vec<Warehouse> {
    loads.iter().map(load_to_warehouse).collect()
}

pub fn unit_to_item(unit: &SupplyUnit) -> Item {
    Item::new(unit.product_id.clone(), unit.volume_m3, unit.priority)
}

pub fn units_to_items(units: &[SupplyUnit]) -> Vec<Item> {
    units.iter().map(unit_to_item).collect()
}
