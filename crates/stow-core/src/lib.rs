//! stow-core — capacity model, shared errors, and configuration.

pub mod config;
pub mod error;
pub mod model;

pub use config::{LogFormat, PackerKind, QueueConfig, SinkConfig, SinkMode, StowConfig};
pub use error::{CapacityError, ConfigError, ModelError};
pub use model::{Item, Snapshot, Warehouse};
