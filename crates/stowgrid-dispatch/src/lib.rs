//! stowgrid dispatch — from a queued request to a delivered plan.
//!
//! The engine in `stowgrid-placement` is pure. This crate wires it to its
//! surroundings: it reads the network state through a [`StateProvider`],
//! runs the configured packer, aggregates the result into an
//! [`OutboundPlan`] and hands it to a [`ResultSink`]. The
//! [`QueueConsumer`] drives the service from a channel of deliveries with
//! acknowledge / requeue / drop semantics.

pub mod consumer;
pub mod error;
pub mod outbound;
pub mod provider;
pub mod request;
pub mod service;
pub mod sink;

pub use consumer::{ConsumerOptions, ConsumerStats, Delivery, QueueConsumer};
pub use error::{DispatchError, DispatchResult};
pub use outbound::{INSUFFICIENT_CAPACITY, OutboundMove, OutboundPlan, UnallocatedUnit};
pub use provider::StateProvider;
pub use request::CalculationRequest;
pub use service::DistributionService;
pub use sink::{ConfiguredSink, JsonLinesSink, LogSink, MemorySink, ResultSink};
