//! Dispatch error types.

use std::time::Duration;

use thiserror::Error;

use stow_core::{CapacityError, ModelError};
use stowgrid_state::StateError;

/// Errors that can occur while serving a calculation request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to determine source warehouse: {0}")]
    SourceLookup(#[source] StateError),

    #[error("failed to fetch warehouse state: {0}")]
    WorldState(#[source] StateError),

    #[error("failed to fetch pending items: {0}")]
    PendingItems(#[source] StateError),

    #[error("invalid snapshot: {0}")]
    Model(#[from] ModelError),

    #[error("capacity invariant violated: {0}")]
    Capacity(#[from] CapacityError),

    #[error("failed to send distribution plan: {0}")]
    Sink(String),

    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("calculation timed out after {0:?}")]
    Timeout(Duration),
}

impl DispatchError {
    /// Whether a delivery failing with this error should go back on the
    /// queue. Transient infrastructure failures retry; anything that
    /// would fail identically next time does not.
    pub fn is_retryable(&self) -> bool {
        match self {
            DispatchError::SourceLookup(_)
            | DispatchError::WorldState(_)
            | DispatchError::PendingItems(_)
            | DispatchError::Sink(_)
            | DispatchError::Timeout(_) => true,
            DispatchError::Model(_) | DispatchError::Capacity(_) | DispatchError::Malformed(_) => {
                false
            }
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_retryable_failures() {
        let missing = || StateError::NotFound("supply 7".to_string());

        assert!(DispatchError::SourceLookup(missing()).is_retryable());
        assert!(DispatchError::WorldState(missing()).is_retryable());
        assert!(DispatchError::PendingItems(missing()).is_retryable());
        assert!(DispatchError::Sink("connection refused".to_string()).is_retryable());
        assert!(DispatchError::Timeout(Duration::from_secs(30)).is_retryable());
    }

    #[test]
    fn classifies_permanent_failures() {
        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!DispatchError::Malformed(malformed).is_retryable());
        assert!(!DispatchError::Model(ModelError::EmptyId("warehouse")).is_retryable());
        assert!(
            !DispatchError::Capacity(CapacityError::Exceeded {
                warehouse_id: "wh".to_string(),
                item_id: "sku".to_string(),
                requested_m3: 5.0,
                available_m3: 1.0,
            })
            .is_retryable()
        );
    }

    #[test]
    fn messages_carry_context() {
        let err = DispatchError::WorldState(StateError::Read("disk gone".to_string()));
        assert_eq!(
            err.to_string(),
            "failed to fetch warehouse state: read error: disk gone"
        );
    }
}
