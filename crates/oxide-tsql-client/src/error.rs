//! Error types for statement execution.

use thiserror::Error;

/// Errors surfaced by the execution layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Protocol or server error from the TDS driver.
    #[error("driver error: {0}")]
    Driver(#[from] tiberius::error::Error),

    /// Network error while connecting or talking to the server.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Statement compilation failed before anything was sent.
    #[error("compile error: {0}")]
    Compile(#[from] oxide_tsql_core::CompileError),
}

/// Result type alias for execution operations.
pub type Result<T> = std::result::Result<T, ClientError>;
