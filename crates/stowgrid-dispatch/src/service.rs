//! DistributionService — one calculation, fetch to send.

use tracing::{info, warn};

use stow_core::Snapshot;
use stowgrid_placement::Packer;

use crate::error::{DispatchError, DispatchResult};
use crate::outbound::OutboundPlan;
use crate::provider::StateProvider;
use crate::sink::ResultSink;

/// Connects the state provider, the packer and the result sink.
pub struct DistributionService<P, S> {
    provider: P,
    packer: Box<dyn Packer>,
    sink: S,
}

impl<P: StateProvider, S: ResultSink> DistributionService<P, S> {
    pub fn new(provider: P, packer: Box<dyn Packer>, sink: S) -> Self {
        Self {
            provider,
            packer,
            sink,
        }
    }

    pub fn packer_name(&self) -> &'static str {
        self.packer.name()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Compute and deliver the plan for `supply_id`.
    ///
    /// Every call works on a freshly fetched snapshot, so concurrent
    /// calculations never observe each other's reservations.
    pub async fn calculate(&self, request_id: &str, supply_id: &str) -> DispatchResult<OutboundPlan> {
        info!(%request_id, %supply_id, packer = self.packer.name(), "starting distribution calculation");

        let source_id = self
            .provider
            .source_warehouse(supply_id)
            .map_err(DispatchError::SourceLookup)?;
        info!(%request_id, %source_id, "identified source warehouse");

        let warehouses = self
            .provider
            .fetch_warehouses()
            .map_err(DispatchError::WorldState)?;
        let items = self
            .provider
            .fetch_pending_items(supply_id)
            .map_err(DispatchError::PendingItems)?;
        info!(
            %request_id,
            warehouses = warehouses.len(),
            items = items.len(),
            "data loaded"
        );

        let snapshot = Snapshot::new(warehouses, items);
        snapshot.validate()?;

        let plan = self
            .packer
            .distribute(request_id, snapshot.warehouses, snapshot.items)?;
        if !plan.is_complete() {
            warn!(
                %request_id,
                unallocated = plan.unallocated().len(),
                volume_m3 = plan.unallocated_volume_m3(),
                "not every item could be placed"
            );
        }

        let outbound = OutboundPlan::new(plan, supply_id, &source_id);
        self.sink.send_plan(&outbound).await?;

        info!(
            %request_id,
            sink = self.sink.name(),
            lines = outbound.moves.len(),
            units = outbound.allocated_units(),
            unallocated = outbound.unallocated.len(),
            "plan sent"
        );
        Ok(outbound)
    }
}
