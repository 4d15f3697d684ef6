//! redb table definitions for the stowgrid state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized records).

use redb::TableDefinition;

/// Shape shared by every table.
pub type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Warehouse records keyed by `{warehouse_id}`.
pub const WAREHOUSES: JsonTable = TableDefinition::new("warehouses");

/// Product catalogue keyed by `{product_id}`.
pub const PRODUCTS: JsonTable = TableDefinition::new("products");

/// On-hand stock keyed by `{warehouse_id}:{product_id}`.
pub const STOCK_LEVELS: JsonTable = TableDefinition::new("stock_levels");

/// Inter-warehouse shipments keyed by `{shipment_id}`.
pub const SHIPMENTS: JsonTable = TableDefinition::new("shipments");

/// Inbound supplies awaiting distribution keyed by `{supply_id}`.
pub const SUPPLIES: JsonTable = TableDefinition::new("supplies");
