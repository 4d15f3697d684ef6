use std::path::Path;

use serde::Serialize;
use tracing::info;

use stow_core::{PackerKind, Snapshot};
use stowgrid_placement::{BalanceReport, packer_for};

fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    Ok(Snapshot::from_json(&std::fs::read(path)?)?)
}

pub fn plan(path: &Path, kind: PackerKind, request_id: &str) -> anyhow::Result<()> {
    let snapshot = read_snapshot(path)?;
    let packer = packer_for(kind);

    let plan = packer.distribute(request_id, snapshot.warehouses, snapshot.items)?;
    info!(
        packer = packer.name(),
        moves = plan.moves().len(),
        unallocated = plan.unallocated().len(),
        "plan computed"
    );

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

#[derive(Serialize)]
pub struct StrategyReport {
    pub packer: &'static str,
    #[serde(flatten)]
    pub balance: BalanceReport,
}

/// Run every packer on `snapshot`.
pub fn run_all(snapshot: &Snapshot, request_id: &str) -> anyhow::Result<Vec<StrategyReport>> {
    [PackerKind::Wfd, PackerKind::FirstFit]
        .into_iter()
        .map(|kind| -> anyhow::Result<StrategyReport> {
            let packer = packer_for(kind);
            let plan = packer.distribute(
                request_id,
                snapshot.warehouses.clone(),
                snapshot.items.clone(),
            )?;
            Ok(StrategyReport {
                packer: packer.name(),
                balance: BalanceReport::from_plan(&snapshot.warehouses, &plan),
            })
        })
        .collect()
}

pub fn format_reports(reports: &[StrategyReport]) -> String {
    let mut out = format!(
        "{:<10} {:>8} {:>12} {:>10} {:>8}\n",
        "packer", "moves", "unallocated", "mean load", "cv"
    );
    for r in reports {
        out.push_str(&format!(
            "{:<10} {:>8} {:>12} {:>10.4} {:>8.4}\n",
            r.packer,
            r.balance.moves,
            r.balance.unallocated,
            r.balance.mean_load_ratio,
            r.balance.coefficient_of_variation,
        ));
    }
    out
}

pub fn compare(path: &Path, format: &str) -> anyhow::Result<()> {
    let snapshot = read_snapshot(path)?;
    let reports = run_all(&snapshot, "compare")?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&reports)?),
        _ => print!("{}", format_reports(&reports)),
    }
    Ok(())
}
