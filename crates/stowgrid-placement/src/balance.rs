//! Load-balance statistics for a finished plan.
//!
//! The figure of merit is the coefficient of variation of the per-warehouse
//! load ratio (`volume moved in / total capacity`). Lower is more even.

use serde::Serialize;
use stow_core::Warehouse;

use crate::plan::DistributionPlan;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarehouseBalance {
    pub warehouse_id: String,
    pub moved_m3: f64,
    /// `moved_m3 / total_capacity_m3`; zero for zero-capacity warehouses.
    pub load_ratio: f64,
    /// Utilization once the plan lands, stock and reservations included.
    pub projected_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    pub warehouses: Vec<WarehouseBalance>,
    pub mean_load_ratio: f64,
    pub coefficient_of_variation: f64,
    pub moves: usize,
    pub unallocated: usize,
}

impl BalanceReport {
    /// Score `plan` against the snapshot it was computed from.
    pub fn from_plan(snapshot: &[Warehouse], plan: &DistributionPlan) -> Self {
        let load = plan.load_by_warehouse();

        let warehouses: Vec<WarehouseBalance> = snapshot
            .iter()
            .map(|w| {
                let moved_m3 = load.get(w.id.as_str()).copied().unwrap_or(0.0);
                let load_ratio = if w.total_capacity_m3 > 0.0 {
                    moved_m3 / w.total_capacity_m3
                } else {
                    0.0
                };
                let projected = w.clone().with_incoming(w.incoming_m3 + moved_m3);
                WarehouseBalance {
                    warehouse_id: w.id.clone(),
                    moved_m3,
                    load_ratio,
                    projected_utilization: projected.utilization(),
                }
            })
            .collect();

        let ratios: Vec<f64> = warehouses.iter().map(|w| w.load_ratio).collect();
        let (mean_load_ratio, coefficient_of_variation) = mean_and_cv(&ratios);

        Self {
            warehouses,
            mean_load_ratio,
            coefficient_of_variation,
            moves: plan.moves().len(),
            unallocated: plan.unallocated().len(),
        }
    }
}

/// Population mean and `stddev / mean`. Both zero for an empty or all-zero
/// sample.
pub fn mean_and_cv(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return (0.0, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt() / mean)
}
