//! gdbmi-protocol — grammar and data model for the GDB/MI wire format.
//!
//! This crate parses the debugger's line-oriented output into typed
//! records and values: stream and async out-of-band records, result
//! records, and the nested const/tuple/list value tree. It knows nothing
//! about transports or sessions; it turns lines into structure and
//! structure back into lines.

pub mod error;
pub mod escape;
pub mod parser;
pub mod record;
pub mod value;

// Re-export key types for convenience.
pub use error::{EscapeError, ProtocolError};
pub use parser::{parse_out_of_band, parse_output, parse_result_record, END_MARKER};
pub use record::{
    AsyncClass, AsyncOutput, AsyncOutputClass, AsyncRecord, OutOfBandRecord, Output, ResultClass,
    ResultRecord, StreamClass, StreamRecord, Token,
};
pub use value::{Const, List, Tuple, Value};
