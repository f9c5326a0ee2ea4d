//! Error types for the portpilot-core library.

use thiserror::Error;

/// Result type alias for portpilot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during port scanning, process termination and tunnel supervision.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to parse command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// No process with this PID exists.
    #[error("Process with PID {0} not found")]
    ProcessNotFound(u32),

    /// No tunnel definition with this name exists.
    #[error("Tunnel '{0}' not found")]
    TunnelNotFound(String),

    /// Permission denied for an operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A bounded wait ran out before the process exited.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The persisted tunnel store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A subprocess could not be created.
    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    /// A tunnel definition failed validation.
    #[error("Invalid tunnel definition: {0}")]
    InvalidTunnel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}
