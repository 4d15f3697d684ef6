//! Packing strategies — turn a snapshot into a distribution plan.
//!
//! The production strategy is weighted worst-fit decreasing ([`WfdPacker`]):
//!
//! ```text
//! sort items by volume desc, then priority desc (stable)
//! heap  = warehouses keyed by utilization (least utilized on top)
//! for item in items:
//!     w = heap.pop_min()
//!     if w fits item:  allocate, record move, push w
//!     else:            drain heap until a fit (or exhaustion),
//!                      then push every drained warehouse back
//! ```
//!
//! The drain exists because utilization order says nothing about absolute
//! free space once capacities differ: a small empty warehouse can sit on
//! top of the heap while only a large, half-full one can take the item.
//!
//! [`FirstFitPacker`] is the naive baseline used when comparing balance.

use std::cmp::Ordering;

use tracing::{debug, warn};

use stow_core::{CapacityError, Item, PackerKind, Warehouse};

use crate::heap::UtilizationHeap;
use crate::plan::{DistributionPlan, PlanBuilder};

/// A distribution strategy.
///
/// Implementations take ownership of the snapshot and may mutate it freely;
/// callers wanting to keep their copy pass a clone.
pub trait Packer: Send + Sync {
    fn name(&self) -> &'static str;

    fn distribute(
        &self,
        request_id: &str,
        warehouses: Vec<Warehouse>,
        items: Vec<Item>,
    ) -> Result<DistributionPlan, CapacityError>;
}

/// Build the packer selected in configuration.
pub fn packer_for(kind: PackerKind) -> Box<dyn Packer> {
    match kind {
        PackerKind::Wfd => Box::new(WfdPacker::new()),
        PackerKind::FirstFit => Box::new(FirstFitPacker::new()),
    }
}

/// Decreasing volume, then decreasing priority. Used with a stable sort so
/// full ties keep input order.
///
/// Adding `0.0` folds `-0.0` into `0.0`, which `total_cmp` would otherwise
/// rank lower.
fn decreasing(a: &Item, b: &Item) -> Ordering {
    (b.volume_m3 + 0.0)
        .total_cmp(&(a.volume_m3 + 0.0))
        .then_with(|| b.priority.cmp(&a.priority))
}

/// Weighted worst-fit decreasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WfdPacker;

impl WfdPacker {
    pub fn new() -> Self {
        Self
    }
}

impl Packer for WfdPacker {
    fn name(&self) -> &'static str {
        "wfd"
    }

    fn distribute(
        &self,
        request_id: &str,
        warehouses: Vec<Warehouse>,
        mut items: Vec<Item>,
    ) -> Result<DistributionPlan, CapacityError> {
        items.sort_by(decreasing);

        let mut heap = UtilizationHeap::with_capacity(warehouses.len());
        for w in warehouses {
            heap.push(w);
        }

        let mut plan = PlanBuilder::with_capacity(request_id, items.len());
        let mut drains = 0usize;

        for item in items {
            let Some(mut best) = heap.pop_min() else {
                plan.record_unallocated(item);
                continue;
            };

            if best.can_fit(&item) {
                best.allocate(&item)?;
                plan.record_move(&item, &best.id);
                debug!(
                    item = %item.id,
                    warehouse = %best.id,
                    utilization = best.utilization(),
                    "placed item"
                );
                heap.push(best);
                continue;
            }

            // Least-utilized warehouse is too small; search the rest.
            drains += 1;
            let mut drained = vec![best];
            let mut placed_in = None;

            while let Some(mut candidate) = heap.pop_min() {
                if candidate.can_fit(&item) {
                    candidate.allocate(&item)?;
                    plan.record_move(&item, &candidate.id);
                    placed_in = Some(candidate.id.clone());
                    drained.push(candidate);
                    break;
                }
                drained.push(candidate);
            }

            debug!(
                item = %item.id,
                drained = drained.len(),
                placed = placed_in.is_some(),
                "fallback drain"
            );

            for w in drained {
                heap.push(w);
            }

            if placed_in.is_none() {
                warn!(
                    item = %item.id,
                    volume_m3 = item.volume_m3,
                    "no warehouse can fit item"
                );
                plan.record_unallocated(item);
            }
        }

        let plan = plan.build();
        debug!(
            request_id,
            moves = plan.moves().len(),
            unallocated = plan.unallocated().len(),
            drains,
            "wfd distribution complete"
        );
        Ok(plan)
    }
}

/// Input-order first fit: each item goes to the first warehouse, in input
/// order, with room for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitPacker;

impl FirstFitPacker {
    pub fn new() -> Self {
        Self
    }
}

impl Packer for FirstFitPacker {
    fn name(&self) -> &'static str {
        "first_fit"
    }

    fn distribute(
        &self,
        request_id: &str,
        mut warehouses: Vec<Warehouse>,
        items: Vec<Item>,
    ) -> Result<DistributionPlan, CapacityError> {
        let mut plan = PlanBuilder::with_capacity(request_id, items.len());

        for item in items {
            match warehouses.iter_mut().find(|w| w.can_fit(&item)) {
                Some(w) => {
                    w.allocate(&item)?;
                    plan.record_move(&item, &w.id);
                }
                None => plan.record_unallocated(item),
            }
        }

        Ok(plan.build())
    }
}
