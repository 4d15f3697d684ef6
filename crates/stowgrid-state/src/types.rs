//! Record types for the stowgrid state store.
//!
//! These mirror the inventory system's tables. Volumes are cubic metres
//! per unit; quantities are unit counts.

use serde::{Deserialize, Serialize};

/// Unique identifier for a warehouse.
pub type WarehouseId = String;

/// Unique identifier for a product.
pub type ProductId = String;

/// Priority given to supply lines that don't carry one.
pub const DEFAULT_PRIORITY: i64 = 10;

// ── Warehouse ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WarehouseRecord {
    pub id: WarehouseId,
    #[serde(default)]
    pub name: String,
    pub total_capacity_m3: f64,
}

// ── Product ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    /// Volume of one unit.
    pub volume_m3: f64,
}

// ── Stock ─────────────────────────────────────────────────────────

/// Units of a product physically present in a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockLevel {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl StockLevel {
    /// Build the composite key for the stock_levels table.
    pub fn table_key(&self) -> String {
        format!("{}:{}", self.warehouse_id, self.product_id)
    }
}

// ── Shipment ──────────────────────────────────────────────────────

/// Lifecycle of a shipment between warehouses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Capacity reserved by a distribution plan, not yet dispatched.
    Planned,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    /// Whether the shipment still occupies capacity at its destination
    /// without being part of its stock.
    pub fn is_inbound(self) -> bool {
        matches!(self, ShipmentStatus::Planned | ShipmentStatus::InTransit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shipment {
    pub id: String,
    #[serde(default)]
    pub source_id: Option<WarehouseId>,
    pub destination_id: WarehouseId,
    pub status: ShipmentStatus,
    pub items: Vec<ShipmentLine>,
}

// ── Supply ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SupplyStatus {
    /// Arrived at the source hub, waiting for a plan.
    #[default]
    Received,
    Distributed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplyLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Higher is more urgent; [`DEFAULT_PRIORITY`] when absent.
    #[serde(default)]
    pub priority: Option<i64>,
}

/// A batch of goods that landed at a source hub and must be spread
/// across the network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supply {
    pub id: String,
    /// Source hub the goods arrived at.
    pub warehouse_id: WarehouseId,
    #[serde(default)]
    pub status: SupplyStatus,
    pub items: Vec<SupplyLine>,
}

// ── Aggregates ────────────────────────────────────────────────────

/// Per-warehouse volume figures, aggregated from stock and shipments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WarehouseLoad {
    pub warehouse_id: WarehouseId,
    pub total_capacity_m3: f64,
    /// Σ stock quantity × unit volume.
    pub current_stock_m3: f64,
    /// Σ quantity × unit volume over planned and in-transit shipments
    /// destined here.
    pub incoming_m3: f64,
}

/// One physical unit of a supply line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplyUnit {
    pub product_id: ProductId,
    pub volume_m3: f64,
    pub priority: i64,
}

/// Bulk import document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeedData {
    pub warehouses: Vec<WarehouseRecord>,
    pub products: Vec<Product>,
    pub stock_levels: Vec<StockLevel>,
    pub shipments: Vec<Shipment>,
    pub supplies: Vec<Supply>,
}
