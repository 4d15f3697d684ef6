//! StateStore — redb-backed inventory records for stowgrid.
//!
//! Provides typed CRUD over warehouses, products, stock levels, shipments
//! and supplies, plus the two aggregate reads the distribution service
//! needs. All values are JSON-serialized into redb's `&[u8]` value
//! columns. The store supports both on-disk and in-memory backends (the
//! latter for testing).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        for table in [WAREHOUSES, PRODUCTS, STOCK_LEVELS, SHIPMENTS, SUPPLIES] {
            txn.open_table(table).map_err(map_err!(Table))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic JSON access ────────────────────────────────────────

    fn put_json<T: Serialize>(&self, table: JsonTable, key: &str, value: &T) -> StateResult<()> {
        let bytes = serde_json::to_vec(value).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut t = txn.open_table(table).map_err(map_err!(Table))?;
            t.insert(key, bytes.as_slice()).map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, table: JsonTable, key: &str) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let t = txn.open_table(table).map_err(map_err!(Table))?;
        match t.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let value = serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn list_json<T: DeserializeOwned>(&self, table: JsonTable) -> StateResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let t = txn.open_table(table).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in t.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            results.push(serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?);
        }
        Ok(results)
    }

    fn delete_key(&self, table: JsonTable, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut t = txn.open_table(table).map_err(map_err!(Table))?;
            existed = t.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(existed)
    }

    // ── Warehouses ─────────────────────────────────────────────────

    pub fn put_warehouse(&self, warehouse: &WarehouseRecord) -> StateResult<()> {
        self.put_json(WAREHOUSES, &warehouse.id, warehouse)?;
        debug!(id = %warehouse.id, "warehouse stored");
        Ok(())
    }

    pub fn get_warehouse(&self, id: &str) -> StateResult<Option<WarehouseRecord>> {
        self.get_json(WAREHOUSES, id)
    }

    /// List all warehouses, ordered by id.
    pub fn list_warehouses(&self) -> StateResult<Vec<WarehouseRecord>> {
        self.list_json(WAREHOUSES)
    }

    /// Delete a warehouse by id. Returns true if it existed.
    pub fn delete_warehouse(&self, id: &str) -> StateResult<bool> {
        self.delete_key(WAREHOUSES, id)
    }

    // ── Products ───────────────────────────────────────────────────

    pub fn put_product(&self, product: &Product) -> StateResult<()> {
        self.put_json(PRODUCTS, &product.id, product)
    }

    pub fn get_product(&self, id: &str) -> StateResult<Option<Product>> {
        self.get_json(PRODUCTS, id)
    }

    pub fn list_products(&self) -> StateResult<Vec<Product>> {
        self.list_json(PRODUCTS)
    }

    // ── Stock levels ───────────────────────────────────────────────

    /// Insert or replace the on-hand quantity for a warehouse/product pair.
    pub fn put_stock_level(&self, level: &StockLevel) -> StateResult<()> {
        self.put_json(STOCK_LEVELS, &level.table_key(), level)
    }

    pub fn get_stock_level(
        &self,
        warehouse_id: &str,
        product_id: &str,
    ) -> StateResult<Option<StockLevel>> {
        self.get_json(STOCK_LEVELS, &format!("{warehouse_id}:{product_id}"))
    }

    pub fn list_stock_levels(&self) -> StateResult<Vec<StockLevel>> {
        self.list_json(STOCK_LEVELS)
    }

    // ── Shipments ──────────────────────────────────────────────────

    pub fn put_shipment(&self, shipment: &Shipment) -> StateResult<()> {
        self.put_json(SHIPMENTS, &shipment.id, shipment)?;
        debug!(id = %shipment.id, status = ?shipment.status, "shipment stored");
        Ok(())
    }

    pub fn get_shipment(&self, id: &str) -> StateResult<Option<Shipment>> {
        self.get_json(SHIPMENTS, id)
    }

    pub fn list_shipments(&self) -> StateResult<Vec<Shipment>> {
        self.list_json(SHIPMENTS)
    }

    pub fn delete_shipment(&self, id: &str) -> StateResult<bool> {
        self.delete_key(SHIPMENTS, id)
    }

    // ── Supplies ───────────────────────────────────────────────────

    pub fn put_supply(&self, supply: &Supply) -> StateResult<()> {
        self.put_json(SUPPLIES, &supply.id, supply)
    }

    pub fn get_supply(&self, id: &str) -> StateResult<Option<Supply>> {
        self.get_json(SUPPLIES, id)
    }

    pub fn list_supplies(&self) -> StateResult<Vec<Supply>> {
        self.list_json(SUPPLIES)
    }

    pub fn delete_supply(&self, id: &str) -> StateResult<bool> {
        self.delete_key(SUPPLIES, id)
    }

    // ── Bulk import ────────────────────────────────────────────────

    /// Write every record in `seed` in a single transaction.
    pub fn import_snapshot(&self, seed: &SeedData) -> StateResult<()> {
        fn insert<T: Serialize>(
            t: &mut redb::Table<'_, &'static str, &'static [u8]>,
            key: &str,
            value: &T,
        ) -> StateResult<()> {
            let bytes = serde_json::to_vec(value).map_err(map_err!(Serialize))?;
            t.insert(key, bytes.as_slice()).map_err(map_err!(Write))?;
            Ok(())
        }

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut t = txn.open_table(WAREHOUSES).map_err(map_err!(Table))?;
            for w in &seed.warehouses {
                insert(&mut t, &w.id, w)?;
            }
        }
        {
            let mut t = txn.open_table(PRODUCTS).map_err(map_err!(Table))?;
            for p in &seed.products {
                insert(&mut t, &p.id, p)?;
            }
        }
        {
            let mut t = txn.open_table(STOCK_LEVELS).map_err(map_err!(Table))?;
            for s in &seed.stock_levels {
                insert(&mut t, &s.table_key(), s)?;
            }
        }
        {
            let mut t = txn.open_table(SHIPMENTS).map_err(map_err!(Table))?;
            for s in &seed.shipments {
                insert(&mut t, &s.id, s)?;
            }
        }
        {
            let mut t = txn.open_table(SUPPLIES).map_err(map_err!(Table))?;
            for s in &seed.supplies {
                insert(&mut t, &s.id, s)?;
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;

        debug!(
            warehouses = seed.warehouses.len(),
            products = seed.products.len(),
            stock_levels = seed.stock_levels.len(),
            shipments = seed.shipments.len(),
            supplies = seed.supplies.len(),
            "seed data imported"
        );
        Ok(())
    }

    // ── Aggregates ─────────────────────────────────────────────────

    fn product_volumes(&self) -> StateResult<HashMap<String, f64>> {
        Ok(self
            .list_products()?
            .into_iter()
            .map(|p| (p.id, p.volume_m3))
            .collect())
    }

    /// Current and inbound volume per warehouse, ordered by warehouse id.
    ///
    /// Stock counts toward `current_stock_m3`; shipments that are planned
    /// or in transit count toward the destination's `incoming_m3`.
    pub fn network_loads(&self) -> StateResult<Vec<WarehouseLoad>> {
        let volumes = self.product_volumes()?;
        let unit_volume = |product_id: &str| {
            volumes
                .get(product_id)
                .copied()
                .ok_or_else(|| StateError::NotFound(format!("product {product_id}")))
        };

        let mut stock: HashMap<String, f64> = HashMap::new();
        for level in self.list_stock_levels()? {
            let volume = f64::from(level.quantity) * unit_volume(&level.product_id)?;
            *stock.entry(level.warehouse_id).or_default() += volume;
        }

        let mut incoming: HashMap<String, f64> = HashMap::new();
        for shipment in self.list_shipments()? {
            if !shipment.status.is_inbound() {
                continue;
            }
            let mut volume = 0.0;
            for line in &shipment.items {
                volume += f64::from(line.quantity) * unit_volume(&line.product_id)?;
            }
            *incoming.entry(shipment.destination_id).or_default() += volume;
        }

        let loads = self
            .list_warehouses()?
            .into_iter()
            .map(|w| WarehouseLoad {
                current_stock_m3: stock.get(&w.id).copied().unwrap_or(0.0),
                incoming_m3: incoming.get(&w.id).copied().unwrap_or(0.0),
                total_capacity_m3: w.total_capacity_m3,
                warehouse_id: w.id,
            })
            .collect::<Vec<_>>();

        debug!(warehouses = loads.len(), "network loads aggregated");
        Ok(loads)
    }

    /// Expand a supply into one [`SupplyUnit`] per physical unit, in line
    /// order.
    pub fn supply_units(&self, supply_id: &str) -> StateResult<Vec<SupplyUnit>> {
        let supply = self
            .get_supply(supply_id)?
            .ok_or_else(|| StateError::NotFound(format!("supply {supply_id}")))?;
        let volumes = self.product_volumes()?;

        let mut units = Vec::new();
        for line in &supply.items {
            let volume_m3 = volumes
                .get(&line.product_id)
                .copied()
                .ok_or_else(|| StateError::NotFound(format!("product {}", line.product_id)))?;
            let priority = line.priority.unwrap_or(DEFAULT_PRIORITY);
            units.extend((0..line.quantity).map(|_| SupplyUnit {
                product_id: line.product_id.clone(),
                volume_m3,
                priority,
            }));
        }
        Ok(units)
    }

    /// The hub a supply arrived at.
    pub fn supply_source(&self, supply_id: &str) -> StateResult<WarehouseId> {
        self.get_supply(supply_id)?
            .map(|s| s.warehouse_id)
            .ok_or_else(|| StateError::NotFound(format!("supply {supply_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warehouse(id: &str, capacity: f64) -> WarehouseRecord {
        WarehouseRecord {
            id: id.to_string(),
            name: format!("Warehouse {id}"),
            total_capacity_m3: capacity,
        }
    }

    fn product(id: &str, volume: f64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_uppercase(),
            volume_m3: volume,
        }
    }

    fn shipment(id: &str, dest: &str, status: ShipmentStatus, lines: &[(&str, u32)]) -> Shipment {
        Shipment {
            id: id.to_string(),
            source_id: Some("hub".to_string()),
            destination_id: dest.to_string(),
            status,
            items: lines
                .iter()
                .map(|(p, q)| ShipmentLine {
                    product_id: p.to_string(),
                    quantity: *q,
                })
                .collect(),
        }
    }

    fn seed() -> SeedData {
        SeedData {
            warehouses: vec![warehouse("kyiv", 1000.0), warehouse("lviv", 500.0)],
            products: vec![product("box", 2.0), product("pallet", 1.5)],
            stock_levels: vec![
                StockLevel {
                    warehouse_id: "kyiv".to_string(),
                    product_id: "box".to_string(),
                    quantity: 10,
                },
                StockLevel {
                    warehouse_id: "kyiv".to_string(),
                    product_id: "pallet".to_string(),
                    quantity: 4,
                },
            ],
            shipments: vec![
                shipment("s-1", "lviv", ShipmentStatus::InTransit, &[("box", 5)]),
                shipment("s-2", "lviv", ShipmentStatus::Planned, &[("pallet", 2)]),
                shipment("s-3", "lviv", ShipmentStatus::Delivered, &[("box", 100)]),
                shipment("s-4", "kyiv", ShipmentStatus::Cancelled, &[("box", 100)]),
            ],
            supplies: vec![Supply {
                id: "sup-1".to_string(),
                warehouse_id: "kyiv".to_string(),
                status: SupplyStatus::Received,
                items: vec![
                    SupplyLine {
                        product_id: "box".to_string(),
                        quantity: 3,
                        priority: None,
                    },
                    SupplyLine {
                        product_id: "pallet".to_string(),
                        quantity: 2,
                        priority: Some(20),
                    },
                ],
            }],
        }
    }

    // ── CRUD ───────────────────────────────────────────────────────

    #[test]
    fn warehouse_put_get_delete() {
        let store = StateStore::open_in_memory().unwrap();
        let wh = warehouse("kyiv", 1000.0);

        store.put_warehouse(&wh).unwrap();
        assert_eq!(store.get_warehouse("kyiv").unwrap(), Some(wh));

        assert!(store.delete_warehouse("kyiv").unwrap());
        assert!(!store.delete_warehouse("kyiv").unwrap());
        assert!(store.get_warehouse("kyiv").unwrap().is_none());
    }

    #[test]
    fn stock_level_update_in_place() {
        let store = StateStore::open_in_memory().unwrap();
        let mut level = StockLevel {
            warehouse_id: "kyiv".to_string(),
            product_id: "box".to_string(),
            quantity: 3,
        };
        store.put_stock_level(&level).unwrap();

        level.quantity = 7;
        store.put_stock_level(&level).unwrap();

        assert_eq!(store.list_stock_levels().unwrap().len(), 1);
        assert_eq!(
            store.get_stock_level("kyiv", "box").unwrap().unwrap().quantity,
            7
        );
    }

    #[test]
    fn shipment_status_round_trips() {
        let store = StateStore::open_in_memory().unwrap();
        let s = shipment("s-1", "lviv", ShipmentStatus::InTransit, &[("box", 1)]);
        store.put_shipment(&s).unwrap();

        assert_eq!(store.get_shipment("s-1").unwrap(), Some(s));
        assert!(store.delete_shipment("s-1").unwrap());
        assert!(store.list_shipments().unwrap().is_empty());
    }

    #[test]
    fn empty_store_operations() {
        let store = StateStore::open_in_memory().unwrap();

        assert!(store.list_warehouses().unwrap().is_empty());
        assert!(store.list_products().unwrap().is_empty());
        assert!(store.list_supplies().unwrap().is_empty());
        assert!(store.network_loads().unwrap().is_empty());
        assert!(!store.delete_supply("nope").unwrap());
        assert!(store.get_product("nope").unwrap().is_none());
    }

    #[test]
    fn import_writes_every_table() {
        let store = StateStore::open_in_memory().unwrap();
        store.import_snapshot(&seed()).unwrap();

        assert_eq!(store.list_warehouses().unwrap().len(), 2);
        assert_eq!(store.list_products().unwrap().len(), 2);
        assert_eq!(store.list_stock_levels().unwrap().len(), 2);
        assert_eq!(store.list_shipments().unwrap().len(), 4);
        assert_eq!(store.list_supplies().unwrap().len(), 1);
    }

    // ── Aggregates ─────────────────────────────────────────────────

    #[test]
    fn network_loads_fold_stock_and_open_shipments() {
        let store = StateStore::open_in_memory().unwrap();
        store.import_snapshot(&seed()).unwrap();

        let loads = store.network_loads().unwrap();
        assert_eq!(loads.len(), 2);

        let kyiv = &loads[0];
        assert_eq!(kyiv.warehouse_id, "kyiv");
        assert_eq!(kyiv.total_capacity_m3, 1000.0);
        assert_eq!(kyiv.current_stock_m3, 10.0 * 2.0 + 4.0 * 1.5);
        // Cancelled shipment does not count.
        assert_eq!(kyiv.incoming_m3, 0.0);

        let lviv = &loads[1];
        assert_eq!(lviv.current_stock_m3, 0.0);
        // In-transit + planned; delivered excluded.
        assert_eq!(lviv.incoming_m3, 5.0 * 2.0 + 2.0 * 1.5);
    }

    #[test]
    fn network_loads_reject_unknown_product() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_warehouse(&warehouse("kyiv", 10.0)).unwrap();
        store
            .put_stock_level(&StockLevel {
                warehouse_id: "kyiv".to_string(),
                product_id: "ghost".to_string(),
                quantity: 1,
            })
            .unwrap();

        assert!(matches!(
            store.network_loads(),
            Err(StateError::NotFound(_))
        ));
    }

    #[test]
    fn supply_units_expand_quantities() {
        let store = StateStore::open_in_memory().unwrap();
        store.import_snapshot(&seed()).unwrap();

        let units = store.supply_units("sup-1").unwrap();
        assert_eq!(units.len(), 5);
        assert!(units[..3].iter().all(|u| u.product_id == "box"
            && u.volume_m3 == 2.0
            && u.priority == DEFAULT_PRIORITY));
        assert!(units[3..].iter().all(|u| u.product_id == "pallet" && u.priority == 20));
    }

    #[test]
    fn supply_lookups_report_missing() {
        let store = StateStore::open_in_memory().unwrap();
        store.import_snapshot(&seed()).unwrap();

        assert_eq!(store.supply_source("sup-1").unwrap(), "kyiv");
        assert!(matches!(
            store.supply_source("sup-404"),
            Err(StateError::NotFound(_))
        ));
        assert!(matches!(
            store.supply_units("sup-404"),
            Err(StateError::NotFound(_))
        ));
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = StateStore::open(&db_path).unwrap();
            store.import_snapshot(&seed()).unwrap();
        }

        // Reopen the same database file.
        let store = StateStore::open(&db_path).unwrap();
        assert_eq!(store.list_warehouses().unwrap().len(), 2);
        assert_eq!(store.supply_units("sup-1").unwrap().len(), 5);
    }
}
