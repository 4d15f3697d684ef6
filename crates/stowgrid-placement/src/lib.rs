//! stowgrid distribution engine.
//!
//! Decides which warehouse receives each unit of an incoming supply. The
//! engine is pure: it takes a snapshot of warehouses and items, returns a
//! [`DistributionPlan`], and never touches storage or the network.
//!
//! # Components
//!
//! - **`packer`** — Packing strategies (worst-fit decreasing, first-fit)
//! - **`heap`** — Min-heap of warehouses keyed by utilization
//! - **`plan`** — Moves and unallocated items of one run
//! - **`balance`** — Load-spread statistics for comparing strategies
//! - **`convert`** — Type conversions from state store types

pub mod balance;
pub mod convert;
pub mod heap;
pub mod packer;
pub mod plan;

pub use balance::{BalanceReport, WarehouseBalance, mean_and_cv};
pub use convert::{load_to_warehouse, loads_to_warehouses, unit_to_item, units_to_items};
pub use heap::UtilizationHeap;
pub use packer::{FirstFitPacker, Packer, WfdPacker, packer_for};
pub use plan::{DistributionPlan, Move, PlanBuilder};
