//! Client error types.

use std::time::Duration;

use gdbmi_protocol::ProtocolError;
use thiserror::Error;

/// Errors from driving a debugger over MI.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The debugger closed its output stream.
    #[error("debugger is not responding (output stream closed)")]
    NotResponding,

    /// A bounded wait exceeded its deadline.
    #[error("debugger timed out after {0:?}")]
    Timeout(Duration),

    /// The output stream violated the MI grammar.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The transport was used after being closed.
    #[error("transport is closed")]
    Closed,

    /// The debugger child process was spawned without a piped handle.
    #[error("debugger child has no piped {0}")]
    MissingPipe(&'static str),

    /// I/O error from the underlying pipe or socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
