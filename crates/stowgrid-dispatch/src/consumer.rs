//! Queue consumer — drives the service from a stream of deliveries.
//!
//! Each delivery is processed to completion before the next one is taken.
//! Outcomes follow broker semantics:
//!
//! - malformed body → dropped
//! - success → acknowledged
//! - retryable failure → requeued after `requeue_delay`, up to
//!   `max_redeliveries` times, then dropped
//! - anything else → dropped

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use stow_core::QueueConfig;

use crate::error::DispatchError;
use crate::provider::StateProvider;
use crate::request::CalculationRequest;
use crate::service::DistributionService;
use crate::sink::ResultSink;

/// One message taken off the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub body: Vec<u8>,
    /// Set once the message has been put back at least once.
    pub redelivered: bool,
    /// 1 on first delivery.
    pub attempt: u32,
}

impl Delivery {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            redelivered: false,
            attempt: 1,
        }
    }

    fn requeued(self) -> Self {
        Self {
            body: self.body,
            redelivered: true,
            attempt: self.attempt.saturating_add(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerOptions {
    pub request_timeout: Duration,
    pub requeue_delay: Duration,
    pub max_redeliveries: u32,
}

impl From<&QueueConfig> for ConsumerOptions {
    fn from(config: &QueueConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            requeue_delay: Duration::from_secs(config.requeue_delay_secs),
            max_redeliveries: config.max_redeliveries,
        }
    }
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self::from(&QueueConfig::default())
    }
}

/// Delivery counts for one consumer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerStats {
    pub acked: u64,
    pub requeued: u64,
    pub dropped: u64,
}

enum Outcome {
    Ack,
    Requeue(Delivery),
    Drop,
}

pub struct QueueConsumer<P, S> {
    queue: String,
    service: DistributionService<P, S>,
    options: ConsumerOptions,
}

impl<P: StateProvider, S: ResultSink> QueueConsumer<P, S> {
    pub fn new(
        queue: impl Into<String>,
        service: DistributionService<P, S>,
        options: ConsumerOptions,
    ) -> Self {
        Self {
            queue: queue.into(),
            service,
            options,
        }
    }

    pub fn service(&self) -> &DistributionService<P, S> {
        &self.service
    }

    /// Consume until `shutdown` flips or the delivery channel closes.
    pub async fn run(
        &self,
        mut deliveries: mpsc::Receiver<Delivery>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ConsumerStats {
        info!(queue = %self.queue, "waiting for calculation requests");

        let mut stats = ConsumerStats::default();
        let mut requeued: VecDeque<Delivery> = VecDeque::new();

        loop {
            if *shutdown.borrow() {
                break;
            }

            let delivery = match requeued.pop_front() {
                Some(delivery) => delivery,
                None => tokio::select! {
                    next = deliveries.recv() => match next {
                        Some(delivery) => delivery,
                        None => {
                            info!(queue = %self.queue, "delivery channel closed");
                            break;
                        }
                    },
                    _ = shutdown.changed() => break,
                },
            };

            match self.handle(delivery).await {
                Outcome::Ack => stats.acked += 1,
                Outcome::Drop => stats.dropped += 1,
                Outcome::Requeue(delivery) => {
                    stats.requeued += 1;
                    tokio::select! {
                        _ = tokio::time::sleep(self.options.requeue_delay) => {
                            requeued.push_back(delivery.requeued());
                        }
                        _ = shutdown.changed() => {
                            warn!(
                                attempt = delivery.attempt,
                                "shutdown during requeue delay, dropping delivery"
                            );
                            stats.dropped += 1;
                            break;
                        }
                    }
                }
            }
        }

        for delivery in requeued.drain(..) {
            warn!(
                attempt = delivery.attempt,
                "shutdown with delivery pending redelivery, dropping"
            );
            stats.dropped += 1;
        }

        info!(
            queue = %self.queue,
            acked = stats.acked,
            requeued = stats.requeued,
            dropped = stats.dropped,
            "consumer stopped"
        );
        stats
    }

    async fn handle(&self, delivery: Delivery) -> Outcome {
        let request = match CalculationRequest::from_slice(&delivery.body) {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, "failed to parse calculation request, dropping");
                return Outcome::Drop;
            }
        };

        info!(
            request_id = %request.request_id,
            supply_id = %request.supply_id,
            source_warehouse_id = ?request.source_warehouse_id,
            user_id = ?request.initiated_by_user_id,
            username = ?request.initiated_by_username,
            attempt = delivery.attempt,
            redelivered = delivery.redelivered,
            "received calculation request"
        );

        let calculation = self
            .service
            .calculate(&request.request_id, &request.supply_id);
        let result = match tokio::time::timeout(self.options.request_timeout, calculation).await {
            Ok(result) => result.map(|_| ()),
            Err(_) => Err(DispatchError::Timeout(self.options.request_timeout)),
        };

        match result {
            Ok(()) => Outcome::Ack,
            Err(e) if e.is_retryable() && delivery.attempt <= self.options.max_redeliveries => {
                warn!(
                    request_id = %request.request_id,
                    attempt = delivery.attempt,
                    error = %e,
                    "calculation failed, requeueing"
                );
                Outcome::Requeue(delivery)
            }
            Err(e) => {
                error!(
                    request_id = %request.request_id,
                    attempt = delivery.attempt,
                    retryable = e.is_retryable(),
                    error = %e,
                    "calculation failed, dropping delivery"
                );
                Outcome::Drop
            }
        }
    }
}
