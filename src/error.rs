//! Error types for the autosplitter

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, AutosplitterError>;

/// Errors produced by the autosplitter
#[derive(Debug, Error)]
pub enum AutosplitterError {
    /// A process memory read did not return the requested bytes
    #[error("memory read failed at 0x{address:X}")]
    ReadFailed { address: usize },

    #[error("failed to open process {0}")]
    ProcessOpenFailed(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize TOML configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("autosplitter not initialized")]
    NotInitialized,
}
