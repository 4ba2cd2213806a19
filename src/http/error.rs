//! Request-scoped failures.
//!
//! Nothing here is process-fatal. The connection loop turns every variant into
//! a status code (see `connection::failure_status`) or, for I/O trouble on the
//! client socket, ends the connection.

use std::io;

use thiserror::Error;

/// The grammar unit that failed while reading a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed request start line")]
    StartLine,

    #[error("malformed request headers")]
    Headers,
}

/// Everything that can go wrong while reading a request off the wire.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Malformed(#[from] ParseError),

    #[error("I/O error while reading request: {0}")]
    Io(#[from] io::Error),
}

/// Failures raised by request validation and content handlers.
///
/// The message of each variant becomes the body of the error response.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotImplemented(String),

    #[error("{0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The response head already went out when this happened, so no error
    /// response can follow on the same connection.
    #[error("response interrupted: {0}")]
    Interrupted(#[source] io::Error),
}

/// Why an exchange did not end with a handler-written response.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Http(#[from] HttpError),
}
