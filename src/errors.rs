use thiserror::Error;

use crate::bus::BusError;

/// Sensor-layer errors surfaced by the SHTC3 command cycle and device context.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("I2C communication failed: {0}")]
    Bus(#[from] BusError),

    #[error("wrong chip ID: expected pattern {expected:#06x}, got {actual:#06x}")]
    WrongChipId { expected: u16, actual: u16 },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration format: {0}")]
    Format(#[from] toml::de::Error),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Device-node registration errors, one variant per acquisition stage.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("failed to create node directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("node path '{path}' exists and is not a socket")]
    PathOccupied { path: String },

    #[error("failed to clear stale node at '{path}': {source}")]
    ClearStale {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind node at '{path}': {source}")]
    Bind {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to set permissions on '{path}': {source}")]
    Permissions {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type aliases for convenience
pub type SensorResult<T> = Result<T, SensorError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type NodeResult<T> = Result<T, NodeError>;
