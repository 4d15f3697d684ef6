//! Result sinks — where finished plans go.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use stow_core::{SinkConfig, SinkMode};

use crate::error::{DispatchError, DispatchResult};
use crate::outbound::OutboundPlan;

/// Receiver of finished plans.
pub trait ResultSink: Send + Sync {
    fn name(&self) -> &'static str;

    fn send_plan(&self, plan: &OutboundPlan) -> impl Future<Output = DispatchResult<()>> + Send;
}

/// Logs a plan summary instead of transmitting the plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ResultSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send_plan(&self, plan: &OutboundPlan) -> DispatchResult<()> {
        info!(
            request_id = %plan.request_id,
            supply_id = %plan.supply_id,
            source_id = %plan.source_id,
            lines = plan.moves.len(),
            units = plan.allocated_units(),
            unallocated = plan.unallocated.len(),
            "mock output: plan not transmitted"
        );
        Ok(())
    }
}

/// Appends one JSON document per plan to a file, or to stdout.
#[derive(Debug, Clone, Default)]
pub struct JsonLinesSink {
    path: Option<PathBuf>,
}

impl JsonLinesSink {
    pub fn stdout() -> Self {
        Self { path: None }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl ResultSink for JsonLinesSink {
    fn name(&self) -> &'static str {
        "json_lines"
    }

    async fn send_plan(&self, plan: &OutboundPlan) -> DispatchResult<()> {
        let mut line = serde_json::to_vec(plan).map_err(|e| DispatchError::Sink(e.to_string()))?;
        line.push(b'\n');

        let io = |e: std::io::Error| DispatchError::Sink(e.to_string());
        match &self.path {
            Some(path) => {
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .map_err(io)?;
                file.write_all(&line).await.map_err(io)?;
                file.flush().await.map_err(io)?;
            }
            None => {
                let mut out = tokio::io::stdout();
                out.write_all(&line).await.map_err(io)?;
                out.flush().await.map_err(io)?;
            }
        }
        debug!(request_id = %plan.request_id, bytes = line.len(), "plan written");
        Ok(())
    }
}

/// Keeps every plan in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    plans: Arc<Mutex<Vec<OutboundPlan>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans received so far, oldest first.
    pub fn plans(&self) -> Vec<OutboundPlan> {
        self.plans
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.plans
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send_plan(&self, plan: &OutboundPlan) -> DispatchResult<()> {
        self.plans
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(plan.clone());
        Ok(())
    }
}

/// The sink selected by `[sink]` configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredSink {
    Log(LogSink),
    JsonLines(JsonLinesSink),
}

impl ConfiguredSink {
    pub fn from_config(config: &SinkConfig) -> Self {
        match config.mode {
            SinkMode::Log => ConfiguredSink::Log(LogSink),
            SinkMode::JsonLines => ConfiguredSink::JsonLines(match &config.path {
                Some(path) => JsonLinesSink::file(path),
                None => JsonLinesSink::stdout(),
            }),
        }
    }
}

impl ResultSink for ConfiguredSink {
    fn name(&self) -> &'static str {
        match self {
            ConfiguredSink::Log(s) => s.name(),
            ConfiguredSink::JsonLines(s) => s.name(),
        }
    }

    async fn send_plan(&self, plan: &OutboundPlan) -> DispatchResult<()> {
        match self {
            ConfiguredSink::Log(s) => s.send_plan(plan).await,
            ConfiguredSink::JsonLines(s) => s.send_plan(plan).await,
        }
    }
}
