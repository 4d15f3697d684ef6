//! Outbound plan — the aggregated form a plan is delivered in.
//!
//! The engine emits one move per unit. Consumers of the plan want one line
//! per `(warehouse, product)` pair with a unit count, so moves sharing both
//! ids collapse into a single [`OutboundMove`]. Lines are ordered by
//! warehouse id, then product id.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use stowgrid_placement::DistributionPlan;

/// Reason attached to every unit no warehouse could take.
pub const INSUFFICIENT_CAPACITY: &str = "insufficient_capacity";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMove {
    pub product_id: String,
    pub warehouse_id: String,
    /// Volume of one unit.
    pub volume_m3: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnallocatedUnit {
    pub product_id: String,
    pub volume_m3: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundPlan {
    pub request_id: String,
    pub supply_id: String,
    /// Hub the goods ship from.
    pub source_id: String,
    pub moves: Vec<OutboundMove>,
    pub unallocated: Vec<UnallocatedUnit>,
    /// Unix seconds.
    pub generated_at: u64,
}

impl OutboundPlan {
    /// Aggregate `plan`, stamped with the current time.
    pub fn new(plan: DistributionPlan, supply_id: &str, source_id: &str) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::at(plan, supply_id, source_id, now)
    }

    pub fn at(plan: DistributionPlan, supply_id: &str, source_id: &str, generated_at: u64) -> Self {
        let (request_id, moves, unallocated) = plan.into_parts();

        let mut grouped: BTreeMap<(String, String), OutboundMove> = BTreeMap::new();
        for m in moves {
            let line = grouped
                .entry((m.warehouse_id.clone(), m.item_id.clone()))
                .or_insert_with(|| OutboundMove {
                    product_id: m.item_id.clone(),
                    warehouse_id: m.warehouse_id.clone(),
                    volume_m3: m.volume_m3,
                    quantity: 0,
                });
            line.quantity += 1;
            line.volume_m3 = m.volume_m3;
        }

        let unallocated = unallocated
            .into_iter()
            .map(|item| UnallocatedUnit {
                product_id: item.id,
                volume_m3: item.volume_m3,
                reason: INSUFFICIENT_CAPACITY.to_string(),
            })
            .collect();

        Self {
            request_id,
            supply_id: supply_id.to_string(),
            source_id: source_id.to_string(),
            moves: grouped.into_values().collect(),
            unallocated,
            generated_at,
        }
    }

    /// Units routed by this plan.
    pub fn allocated_units(&self) -> u32 {
        self.moves.iter().map(|m| m.quantity).sum()
    }

    pub fn allocated_volume_m3(&self) -> f64 {
        self.moves
            .iter()
            .map(|m| m.volume_m3 * f64::from(m.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stow_core::Item;
    use stowgrid_placement::PlanBuilder;

    fn sample_plan() -> DistributionPlan {
        let mut b = PlanBuilder::new("req-1");
        b.record_move(&Item::new("box", 2.0, 10), "lviv");
        b.record_move(&Item::new("box", 2.0, 10), "kyiv");
        b.record_move(&Item::new("box", 2.0, 10), "lviv");
        b.record_move(&Item::new("crate", 5.0, 10), "kyiv");
        b.record_unallocated(Item::new("pallet", 900.0, 10));
        b.record_unallocated(Item::new("pallet", 900.0, 10));
        b.build()
    }

    #[test]
    fn groups_moves_by_warehouse_and_product() {
        let out = OutboundPlan::at(sample_plan(), "sup-1", "hub", 1_700_000_000);

        let lines: Vec<(&str, &str, u32)> = out
            .moves
            .iter()
            .map(|m| (m.warehouse_id.as_str(), m.product_id.as_str(), m.quantity))
            .collect();
        assert_eq!(
            lines,
            vec![("kyiv", "box", 1), ("kyiv", "crate", 1), ("lviv", "box", 2)]
        );
        assert_eq!(out.moves[2].volume_m3, 2.0);
        assert_eq!(out.allocated_units(), 4);
        assert_eq!(out.allocated_volume_m3(), 11.0);
    }

    #[test]
    fn unallocated_units_are_tagged() {
        let out = OutboundPlan::at(sample_plan(), "sup-1", "hub", 0);

        assert_eq!(out.unallocated.len(), 2);
        assert!(out
            .unallocated
            .iter()
            .all(|u| u.product_id == "pallet" && u.reason == INSUFFICIENT_CAPACITY));
    }

    #[test]
    fn carries_request_metadata() {
        let out = OutboundPlan::at(sample_plan(), "sup-1", "hub", 1234);
        assert_eq!(out.request_id, "req-1");
        assert_eq!(out.supply_id, "sup-1");
        assert_eq!(out.source_id, "hub");
        assert_eq!(out.generated_at, 1234);

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["moves"][0]["quantity"], 1);
        assert_eq!(json["unallocated"][0]["reason"], "insufficient_capacity");
    }

    #[test]
    fn empty_plan_has_no_lines() {
        let out = OutboundPlan::new(PlanBuilder::new("req-0").build(), "s", "h");
        assert!(out.moves.is_empty());
        assert!(out.unallocated.is_empty());
        assert!(out.generated_at > 0);
    }
}
