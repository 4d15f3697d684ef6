//! Distribution plan — the result of one allocation run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stow_core::Item;

/// One resolved assignment of a single item to a warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub item_id: String,
    pub warehouse_id: String,
    pub volume_m3: f64,
}

/// Ordered moves plus the items no warehouse could take.
///
/// Built once through [`PlanBuilder`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionPlan {
    request_id: String,
    moves: Vec<Move>,
    unallocated: Vec<Item>,
}

impl DistributionPlan {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Moves in the order the engine decided them.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn unallocated(&self) -> &[Item] {
        &self.unallocated
    }

    /// True when every input item received a move.
    pub fn is_complete(&self) -> bool {
        self.unallocated.is_empty()
    }

    pub fn allocated_volume_m3(&self) -> f64 {
        self.moves.iter().map(|m| m.volume_m3).sum()
    }

    pub fn unallocated_volume_m3(&self) -> f64 {
        self.unallocated.iter().map(|i| i.volume_m3).sum()
    }

    /// Total volume routed to each warehouse by this plan.
    pub fn load_by_warehouse(&self) -> BTreeMap<&str, f64> {
        let mut load = BTreeMap::new();
        for m in &self.moves {
            *load.entry(m.warehouse_id.as_str()).or_insert(0.0) += m.volume_m3;
        }
        load
    }

    pub fn into_parts(self) -> (String, Vec<Move>, Vec<Item>) {
        (self.request_id, self.moves, self.unallocated)
    }
}

/// Accumulates decisions while the engine runs.
#[derive(Debug)]
pub struct PlanBuilder {
    request_id: String,
    moves: Vec<Move>,
    unallocated: Vec<Item>,
}

impl PlanBuilder {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            moves: Vec::new(),
            unallocated: Vec::new(),
        }
    }

    pub fn with_capacity(request_id: impl Into<String>, items: usize) -> Self {
        Self {
            request_id: request_id.into(),
            moves: Vec::with_capacity(items),
            unallocated: Vec::new(),
        }
    }

    pub fn record_move(&mut self, item: &Item, warehouse_id: &str) {
        self.moves.push(Move {
            item_id: item.id.clone(),
            warehouse_id: warehouse_id.to_string(),
            volume_m3: item.volume_m3,
        });
    }

    pub fn record_unallocated(&mut self, item: Item) {
        self.unallocated.push(item);
    }

    #[cfg(test)]
    pub fn decided(&self) -> usize {
        self.moves.len() + self.unallocated.len()
    }

    pub fn build(self) -> DistributionPlan {
        DistributionPlan {
            request_id: self.request_id,
            moves: self.moves,
            unallocated: self.unallocated,
        }
    }
}
