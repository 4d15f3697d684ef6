//! `stowd serve` — the request loop.
//!
//! Requests arrive as JSON lines on stdin, each becoming one delivery on
//! the consumer's channel. End of input drains the queue and exits;
//! Ctrl-C stops after the current delivery.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use stow_core::StowConfig;
use stowgrid_dispatch::{
    ConfiguredSink, ConsumerOptions, Delivery, DistributionService, QueueConsumer, ResultSink,
};
use stowgrid_placement::packer_for;
use stowgrid_state::StateStore;

const FEED_BUFFER: usize = 64;

pub async fn run(config: &StowConfig) -> anyhow::Result<()> {
    info!("stowgrid daemon starting");

    std::fs::create_dir_all(&config.data_dir)?;
    let db_path = config.database_path();
    let store = StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");

    let sink = ConfiguredSink::from_config(&config.sink);
    info!(sink = sink.name(), packer = ?config.packer, "result sink ready");
    if let ConfiguredSink::JsonLines(s) = &sink {
        match s.path() {
            Some(path) => info!(path = %path.display(), "appending plans to file"),
            None => info!("writing plans to stdout"),
        }
    }

    let service = DistributionService::new(store, packer_for(config.packer), sink);
    let consumer = QueueConsumer::new(
        config.queue.name.clone(),
        service,
        ConsumerOptions::from(&config.queue),
    );

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (tx, rx) = mpsc::channel(FEED_BUFFER);

    // ── Request feed ───────────────────────────────────────────

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(Delivery::new(line.to_string())).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed to read request feed");
                    break;
                }
            }
        }
        debug!("request feed closed");
    });

    let mut consumer_task = tokio::spawn(async move { consumer.run(rx, shutdown_rx).await });

    let stats = tokio::select! {
        joined = &mut consumer_task => joined?,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
            consumer_task.await?
        }
    };

    info!(
        acked = stats.acked,
        requeued = stats.requeued,
        dropped = stats.dropped,
        "stowgrid daemon stopped"
    );
    Ok(())
}
