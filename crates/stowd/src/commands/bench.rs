//! Synthetic benchmark — random network, every strategy, wall time.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use stow_core::{Item, PackerKind, Snapshot, Warehouse};
use stowgrid_placement::{BalanceReport, packer_for};

/// Random network: capacities 500–5000 m3 at 0–60% fill, items
/// 0.1–20 m3 with priority 1–10.
pub fn scenario(rng: &mut StdRng, warehouses: usize, items: usize) -> Snapshot {
    let warehouses = (0..warehouses)
        .map(|i| {
            let total = rng.gen_range(500.0..5000.0);
            let stock = total * rng.gen_range(0.0..0.6);
            Warehouse::new(format!("WH-{i:04}"), total).with_stock(stock)
        })
        .collect();
    let items = (0..items)
        .map(|i| Item::new(format!("ITEM-{i:06}"), rng.gen_range(0.1..20.0), rng.gen_range(1..=10)))
        .collect();
    Snapshot::new(warehouses, items)
}

#[derive(Debug, Serialize)]
pub struct BenchResult {
    pub packer: &'static str,
    pub elapsed_ms: f64,
    #[serde(flatten)]
    pub balance: BalanceReport,
}

pub fn run(snapshot: &Snapshot) -> anyhow::Result<Vec<BenchResult>> {
    let mut results = Vec::new();
    for kind in [PackerKind::Wfd, PackerKind::FirstFit] {
        let packer = packer_for(kind);
        let warehouses = snapshot.warehouses.clone();
        let items = snapshot.items.clone();

        let started = Instant::now();
        let plan = packer.distribute("bench", warehouses, items)?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        results.push(BenchResult {
            packer: packer.name(),
            elapsed_ms,
            balance: BalanceReport::from_plan(&snapshot.warehouses, &plan),
        });
    }
    Ok(results)
}

pub fn bench(warehouses: usize, items: usize, seed: Option<u64>, format: &str) -> anyhow::Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    info!(warehouses, items, seed, "generating scenario");

    let mut rng = StdRng::seed_from_u64(seed);
    let snapshot = scenario(&mut rng, warehouses, items);
    let results = run(&snapshot)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => {
            println!("seed {seed}: {warehouses} warehouses, {items} items");
            println!(
                "{:<10} {:>10} {:>8} {:>12} {:>8}",
                "packer", "time (ms)", "moves", "unallocated", "cv"
            );
            for r in &results {
                println!(
                    "{:<10} {:>10.3} {:>8} {:>12} {:>8.4}",
                    r.packer,
                    r.elapsed_ms,
                    r.balance.moves,
                    r.balance.unallocated,
                    r.balance.coefficient_of_variation
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_is_reproducible() {
        let a = scenario(&mut StdRng::seed_from_u64(7), 10, 100);
        let b = scenario(&mut StdRng::seed_from_u64(7), 10, 100);
        assert_eq!(a, b);
        assert!(a.validate().is_ok());
        assert!(a.warehouses.iter().all(|w| w.utilization() <= 0.6));
    }

    #[test]
    fn wfd_spreads_load_more_evenly() {
        let snapshot = scenario(&mut StdRng::seed_from_u64(42), 20, 400);
        let results = run(&snapshot).unwrap();

        let wfd = &results[0];
        let first_fit = &results[1];
        assert_eq!(wfd.packer, "wfd");
        assert_eq!(first_fit.packer, "first_fit");
        // Free space far exceeds demand.
        assert_eq!(wfd.balance.unallocated, 0);
        assert_eq!(first_fit.balance.unallocated, 0);
        assert_eq!(wfd.balance.moves, 400);
        assert!(wfd.balance.coefficient_of_variation < first_fit.balance.coefficient_of_variation);
    }
}
