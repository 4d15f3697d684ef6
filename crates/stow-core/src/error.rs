//! Error types shared across stowgrid crates.

use thiserror::Error;

/// Raised by [`Warehouse::allocate`](crate::Warehouse::allocate) when asked
/// to reserve more than the warehouse has free.
///
/// The allocation engine always checks fit before allocating, so this
/// surfacing at runtime indicates a bug rather than a capacity shortage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapacityError {
    #[error(
        "capacity exceeded: item {item_id} needs {requested_m3} m3, warehouse {warehouse_id} has {available_m3} m3"
    )]
    Exceeded {
        warehouse_id: String,
        item_id: String,
        requested_m3: f64,
        available_m3: f64,
    },
}

/// Snapshot records that cannot enter an allocation run.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0} id must not be empty")]
    EmptyId(&'static str),

    #[error("{id}: {field} must be a finite, non-negative number (got {value})")]
    InvalidQuantity {
        id: String,
        field: &'static str,
        value: f64,
    },

    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
