//! stowgrid-state — embedded inventory state store.
//!
//! Backed by [redb](https://docs.rs/redb), holds the warehouse network as
//! plain records: warehouses, products, stock levels, shipments, and the
//! inbound supplies waiting to be distributed.
//!
//! # Architecture
//!
//! All records are JSON-serialized into redb's `&[u8]` value columns.
//! Stock levels use a composite `{warehouse_id}:{product_id}` key.
//!
//! The store does the volume aggregation the allocation engine expects:
//! [`StateStore::network_loads`] folds stock and open shipments into
//! per-warehouse cubic-metre figures, and [`StateStore::supply_units`]
//! expands supply lines into one unit per item.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
