//! stow.toml configuration parser.
//!
//! Resolution order: built-in defaults, then the TOML file (if any), then
//! `STOW_*` environment variables. Command-line flags are applied last by
//! the binaries themselves.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StowConfig {
    /// Directory holding the state database.
    pub data_dir: PathBuf,
    /// Distribution strategy.
    pub packer: PackerKind,
    pub log_format: LogFormat,
    pub queue: QueueConfig,
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub name: String,
    /// Upper bound on one calculation, fetch to send.
    pub request_timeout_secs: u64,
    /// Pause before a failed delivery is put back on the queue.
    pub requeue_delay_secs: u64,
    /// Deliveries failing more often than this are dropped.
    pub max_redeliveries: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub mode: SinkMode,
    /// Output file for `json_lines`; stdout when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkMode {
    /// Log a plan summary instead of transmitting it.
    #[default]
    Log,
    JsonLines,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackerKind {
    /// Weighted worst-fit decreasing.
    #[default]
    Wfd,
    /// Input-order first fit, kept as a baseline.
    FirstFit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for StowConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/var/lib/stowgrid"),
            packer: PackerKind::default(),
            log_format: LogFormat::default(),
            queue: QueueConfig::default(),
            sink: SinkConfig::default(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: "calculation.requests".to_string(),
            request_timeout_secs: 30,
            requeue_delay_secs: 5,
            max_redeliveries: 15,
        }
    }
}

impl std::str::FromStr for PackerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wfd" => Ok(Self::Wfd),
            "first_fit" | "first-fit" => Ok(Self::FirstFit),
            other => Err(invalid("packer", other)),
        }
    }
}

impl std::str::FromStr for SinkMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(Self::Log),
            "json_lines" | "json-lines" => Ok(Self::JsonLines),
            other => Err(invalid("sink.mode", other)),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(invalid("log_format", other)),
        }
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

impl StowConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `STOW_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("STOW_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("STOW_PACKER") {
            self.packer = v.parse()?;
        }
        if let Some(v) = lookup("STOW_LOG_FORMAT") {
            self.log_format = v.parse()?;
        }
        if let Some(v) = lookup("STOW_QUEUE") {
            self.queue.name = v;
        }
        if let Some(v) = lookup("STOW_REQUEST_TIMEOUT_SECS") {
            self.queue.request_timeout_secs = parse_num("STOW_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("STOW_REQUEUE_DELAY_SECS") {
            self.queue.requeue_delay_secs = parse_num("STOW_REQUEUE_DELAY_SECS", &v)?;
        }
        if let Some(v) = lookup("STOW_MAX_REDELIVERIES") {
            self.queue.max_redeliveries = parse_num("STOW_MAX_REDELIVERIES", &v)?;
        }
        if let Some(v) = lookup("STOW_SINK") {
            self.sink.mode = v.parse()?;
        }
        if let Some(v) = lookup("STOW_SINK_PATH") {
            self.sink.path = Some(PathBuf::from(v));
        }
        // Legacy switch: mock output never transmits plans.
        if let Some(v) = lookup("MOCK_OUTPUT") {
            if parse_bool("MOCK_OUTPUT", &v)? {
                self.sink.mode = SinkMode::Log;
            }
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a stow.toml rooted at `data_dir`.
    pub fn scaffold(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            ..Self::default()
        }
    }

    /// Location of the state database inside `data_dir`.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("stowgrid.redb")
    }
}
