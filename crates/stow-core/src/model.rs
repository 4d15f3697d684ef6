//! Capacity model — items, warehouses, and the fit arithmetic between them.
//!
//! All quantities are cubic metres. A [`Warehouse`] value is a private,
//! request-scoped copy of network state: [`Warehouse::allocate`] mutates
//! `incoming_m3` in place to model a tentative reservation made during a
//! single allocation run. Nothing here is ever written back to a store.

use serde::{Deserialize, Serialize};

use crate::error::{CapacityError, ModelError};

/// A unit of inventory waiting to be distributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Volume of a single unit in m³.
    pub volume_m3: f64,
    /// Higher value means more urgent.
    #[serde(default)]
    pub priority: i64,
}

impl Item {
    pub fn new(id: impl Into<String>, volume_m3: f64, priority: i64) -> Self {
        Self {
            id: id.into(),
            volume_m3,
            priority,
        }
    }

    /// Reject ids and volumes the engine cannot order or account for.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.is_empty() {
            return Err(ModelError::EmptyId("item"));
        }
        check_quantity(&self.id, "volume_m3", self.volume_m3)
    }
}

/// Capacity state of one warehouse as of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: String,
    pub total_capacity_m3: f64,
    /// Stock physically present.
    #[serde(default)]
    pub current_stock_m3: f64,
    /// Reserved but not yet landed: in-transit and planned shipments, plus
    /// anything allocated during the current run.
    #[serde(default)]
    pub incoming_m3: f64,
}

impl Warehouse {
    pub fn new(id: impl Into<String>, total_capacity_m3: f64) -> Self {
        Self {
            id: id.into(),
            total_capacity_m3,
            current_stock_m3: 0.0,
            incoming_m3: 0.0,
        }
    }

    pub fn with_stock(mut self, current_stock_m3: f64) -> Self {
        self.current_stock_m3 = current_stock_m3;
        self
    }

    pub fn with_incoming(mut self, incoming_m3: f64) -> Self {
        self.incoming_m3 = incoming_m3;
        self
    }

    /// Volume already committed: stock plus reservations.
    pub fn committed_m3(&self) -> f64 {
        self.current_stock_m3 + self.incoming_m3
    }

    /// Free space, never negative: `max(0, total - (current + incoming))`.
    pub fn available_capacity(&self) -> f64 {
        let used = self.committed_m3();
        if used >= self.total_capacity_m3 {
            return 0.0;
        }
        self.total_capacity_m3 - used
    }

    /// Fraction of capacity committed.
    ///
    /// A zero-capacity warehouse reports `1.0` so it always sorts as full.
    /// Over-committed warehouses report values above `1.0`.
    pub fn utilization(&self) -> f64 {
        if self.total_capacity_m3 == 0.0 {
            return 1.0;
        }
        self.committed_m3() / self.total_capacity_m3
    }

    /// Zero-capacity warehouses accept nothing, not even zero-volume items.
    pub fn can_fit(&self, item: &Item) -> bool {
        self.total_capacity_m3 > 0.0 && self.available_capacity() >= item.volume_m3
    }

    /// Reserve space for `item` by growing `incoming_m3`.
    ///
    /// Callers check [`Warehouse::can_fit`] first; reaching the error arm
    /// means that check was skipped.
    pub fn allocate(&mut self, item: &Item) -> Result<(), CapacityError> {
        if !self.can_fit(item) {
            return Err(CapacityError::Exceeded {
                warehouse_id: self.id.clone(),
                item_id: item.id.clone(),
                requested_m3: item.volume_m3,
                available_m3: self.available_capacity(),
            });
        }
        self.incoming_m3 += item.volume_m3;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.is_empty() {
            return Err(ModelError::EmptyId("warehouse"));
        }
        check_quantity(&self.id, "total_capacity_m3", self.total_capacity_m3)?;
        check_quantity(&self.id, "current_stock_m3", self.current_stock_m3)?;
        check_quantity(&self.id, "incoming_m3", self.incoming_m3)
    }
}

fn check_quantity(id: &str, field: &'static str, value: f64) -> Result<(), ModelError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::InvalidQuantity {
            id: id.to_string(),
            field,
            value,
        });
    }
    Ok(())
}

/// The network state and pending items handed to one allocation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub warehouses: Vec<Warehouse>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Snapshot {
    pub fn new(warehouses: Vec<Warehouse>, items: Vec<Item>) -> Self {
        Self { warehouses, items }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for warehouse in &self.warehouses {
            warehouse.validate()?;
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ModelError> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
