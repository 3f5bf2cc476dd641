//! Error types for the response parser.

use thiserror::Error;

/// Errors that can occur while parsing an HTTP response.
#[derive(Debug, Error)]
pub enum Error {
    /// The server sent no bytes at all.
    #[error("Empty response")]
    EmptyResponse,

    /// The response does not start with an HTTP version token.
    #[error("Not an HTTP response")]
    NotHttp,

    /// The status line is malformed (wrong format or missing components).
    #[error("Malformed status line: {0}")]
    MalformedStatusLine(String),

    /// The status code is not a valid three-digit number.
    #[error("Invalid status code: {0}")]
    InvalidStatusCode(String),
}
