//! gdbmi-client — session and transports for the GDB/MI protocol.
//!
//! This crate drives a debugger's MI interpreter. A transport delivers
//! prompt-delimited batches of raw lines from the debugger's stdio pipes
//! or a TCP connection, and [`MiSession`] correlates commands with their
//! replies while queueing asynchronous notifications for filter-based
//! waits.
//!
//! One caller drives a session at a time; the API takes `&mut self` and
//! assumes the single-writer discipline the wire protocol requires.

pub mod error;
pub mod session;
pub mod transport;

// Re-export key types for convenience.
pub use error::ClientError;
pub use session::{MiSession, SessionConfig};
pub use transport::MiTransport;
