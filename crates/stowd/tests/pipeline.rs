//! Store → service → sink, end to end.

use std::path::PathBuf;

use stowgrid_dispatch::{
    ConsumerOptions, ConsumerStats, Delivery, DistributionService, INSUFFICIENT_CAPACITY,
    JsonLinesSink, MemorySink, OutboundPlan, QueueConsumer,
};
use stowgrid_placement::WfdPacker;
use stowgrid_state::{SeedData, StateStore};
use tokio::sync::{mpsc, watch};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn seeded_store(dir: &tempfile::TempDir) -> StateStore {
    let seed: SeedData = serde_json::from_slice(&std::fs::read(fixture("seed.json")).unwrap()).unwrap();
    let store = StateStore::open(&dir.path().join("stowgrid.redb")).unwrap();
    store.import_snapshot(&seed).unwrap();
    store
}

fn lines(plan: &OutboundPlan) -> Vec<(&str, &str, u32)> {
    plan.moves
        .iter()
        .map(|m| (m.warehouse_id.as_str(), m.product_id.as_str(), m.quantity))
        .collect()
}

#[tokio::test]
async fn seeded_supply_is_distributed() {
    let dir = tempfile::tempdir().unwrap();
    let sink = MemorySink::new();
    let service = DistributionService::new(seeded_store(&dir), Box::new(WfdPacker::new()), sink.clone());

    let plan = service.calculate("req-1", "sup-1").await.unwrap();

    // kyiv and lviv both start at 0.2 (lviv counts its in-transit pallet),
    // the hub at 0.9. The container fits nowhere.
    assert_eq!(
        lines(&plan),
        vec![("kyiv", "box", 3), ("kyiv", "pallet", 1), ("lviv", "pallet", 1)]
    );
    assert_eq!(plan.source_id, "hub");
    assert_eq!(plan.supply_id, "sup-1");
    assert_eq!(plan.unallocated.len(), 1);
    assert_eq!(plan.unallocated[0].product_id, "container");
    assert_eq!(plan.unallocated[0].reason, INSUFFICIENT_CAPACITY);
    assert_eq!(sink.plans(), vec![plan]);
}

#[tokio::test]
async fn consumer_writes_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("plans.jsonl");
    let service = DistributionService::new(
        seeded_store(&dir),
        Box::new(WfdPacker::new()),
        JsonLinesSink::file(&out),
    );
    let consumer = QueueConsumer::new("calculation.requests", service, ConsumerOptions::default());

    let (tx, rx) = mpsc::channel(8);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    tx.send(Delivery::new(r#"{"request_id":"req-1","supply_id":"sup-1","initiated_by_username":"olena"}"#))
        .await
        .unwrap();
    tx.send(Delivery::new("definitely not json")).await.unwrap();
    drop(tx);

    let stats = consumer.run(rx, shutdown_rx).await;
    assert_eq!(
        stats,
        ConsumerStats {
            acked: 1,
            requeued: 0,
            dropped: 1
        }
    );

    let written = std::fs::read_to_string(&out).unwrap();
    let plans: Vec<OutboundPlan> = written.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].request_id, "req-1");
    assert_eq!(plans[0].allocated_units(), 5);
}

#[tokio::test]
async fn repeated_requests_see_the_same_network() {
    let dir = tempfile::tempdir().unwrap();
    let service = DistributionService::new(
        seeded_store(&dir),
        Box::new(WfdPacker::new()),
        MemorySink::new(),
    );

    let first = service.calculate("req-1", "sup-1").await.unwrap();
    let second = service.calculate("req-2", "sup-1").await.unwrap();

    assert_eq!(first.moves, second.moves);
    assert_eq!(first.unallocated, second.unallocated);
}
