// Error types for the gate pipeline

use thiserror::Error;

/// Errors surfaced by the token codec, the trusted-token store and config loading.
///
/// Probe failures are deliberately absent here: they are swallowed by the
/// collector and become absent fields (see [`ProbeError`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A single environment probe could not produce its signal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{0} is not available on this device")]
    Unavailable(&'static str),
    #[error("probe failed: {0}")]
    Failed(String),
}

/// Errors that can occur during config validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("storage key must not be empty")]
    EmptyStorageKey,
    #[error("canvas size must be > 0")]
    ZeroCanvasSize,
    #[error("audio bin count must be > 0")]
    ZeroAudioBins,
    #[error("allow-list policy requires at least one approved token")]
    EmptyAllowList,
}
