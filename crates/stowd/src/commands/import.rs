use std::path::Path;

use tracing::info;

use stow_core::StowConfig;
use stowgrid_state::{SeedData, StateStore};

pub fn import(config: &StowConfig, path: &Path) -> anyhow::Result<()> {
    let seed: SeedData = serde_json::from_slice(&std::fs::read(path)?)?;

    std::fs::create_dir_all(&config.data_dir)?;
    let db_path = config.database_path();
    let store = StateStore::open(&db_path)?;
    store.import_snapshot(&seed)?;

    info!(path = ?db_path, "seed data imported");
    println!(
        "✓ Imported {} warehouses, {} products, {} stock levels, {} shipments, {} supplies",
        seed.warehouses.len(),
        seed.products.len(),
        seed.stock_levels.len(),
        seed.shipments.len(),
        seed.supplies.len(),
    );
    Ok(())
}
