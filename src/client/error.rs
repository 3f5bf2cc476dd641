//! Error types for the probe client.

use thiserror::Error;

/// Errors that can occur while talking to the target server.
#[derive(Debug, Error)]
pub enum Error {
    /// The host name did not resolve to any address.
    #[error("Could not resolve host: {0}")]
    Resolve(String),

    /// The TCP connect did not complete within the connect timeout.
    #[error("Connect timed out")]
    ConnectTimeout,

    /// I/O error on the connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
