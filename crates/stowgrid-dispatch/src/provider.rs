//! Read side of the service: where snapshots come from.

use stow_core::{Item, Warehouse};
use stowgrid_placement::{loads_to_warehouses, units_to_items};
use stowgrid_state::{StateResult, StateStore};

/// Source of the network state an allocation run starts from.
///
/// Implementations return fresh values on every call; the service mutates
/// what it receives.
pub trait StateProvider: Send + Sync {
    /// Every warehouse with stock and inbound shipments folded in.
    fn fetch_warehouses(&self) -> StateResult<Vec<Warehouse>>;

    /// One item per unit of the supply still waiting for distribution.
    fn fetch_pending_items(&self, supply_id: &str) -> StateResult<Vec<Item>>;

    /// Hub the supply arrived at.
    fn source_warehouse(&self, supply_id: &str) -> StateResult<String>;
}

impl StateProvider for StateStore {
    fn fetch_warehouses(&self) -> StateResult<Vec<Warehouse>> {
        Ok(loads_to_warehouses(&self.network_loads()?))
    }

    fn fetch_pending_items(&self, supply_id: &str) -> StateResult<Vec<Item>> {
        Ok(units_to_items(&self.supply_units(supply_id)?))
    }

    fn source_warehouse(&self, supply_id: &str) -> StateResult<String> {
        self.supply_source(supply_id)
    }
}
