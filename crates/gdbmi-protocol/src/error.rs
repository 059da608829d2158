//! MI protocol error types.

use thiserror::Error;

/// Errors produced while parsing MI output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A line is neither a record nor the end marker.
    #[error("line {line} is not a valid MI record: {text:?}")]
    UnrecognizedLine {
        /// 1-based line number within the output unit.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// The output unit ended without the `(gdb)` prompt line.
    #[error("output unit is missing the \"(gdb)\" end marker")]
    MissingEndMarker,

    /// Lines followed the end marker.
    #[error("unexpected line {line} after the end marker")]
    TrailingLines {
        /// 1-based number of the first extra line.
        line: usize,
    },

    /// An output unit carried more than one result record.
    #[error("second result record on line {line}")]
    DuplicateResultRecord {
        /// 1-based line number of the second result record.
        line: usize,
    },

    /// A record token did not fit in 64 bits.
    #[error("record token at column {pos} does not fit in 64 bits")]
    TokenOverflow {
        /// Byte offset of the token within its line.
        pos: usize,
    },

    /// A result class keyword outside {done, running, connected, error, exit}.
    #[error("unknown result class {text:?}")]
    UnknownResultClass {
        /// The keyword as it appeared on the wire.
        text: String,
    },

    /// A specific character was required but not found.
    #[error("expected {expected} at column {pos}")]
    Expected {
        /// What the grammar required here.
        expected: &'static str,
        /// Byte offset within the line.
        pos: usize,
    },

    /// A result pair with an empty variable name.
    #[error("empty variable name at column {pos}")]
    EmptyVariableName {
        /// Byte offset within the line.
        pos: usize,
    },

    /// A result pair without an `=` separator.
    #[error("result pair at column {pos} has no '='")]
    MissingEquals {
        /// Byte offset where the pair started.
        pos: usize,
    },

    /// A quoted constant without a closing quote.
    #[error("unterminated constant starting at column {pos}")]
    UnterminatedConst {
        /// Byte offset of the opening quote.
        pos: usize,
    },

    /// A list element of a different kind than the list's first element.
    #[error("list element at column {pos} does not match the list's element kind")]
    MixedListElements {
        /// Byte offset of the offending element.
        pos: usize,
    },

    /// A record line with unconsumed characters after the record.
    #[error("trailing characters at column {pos}")]
    TrailingInput {
        /// Byte offset of the first unconsumed character.
        pos: usize,
    },

    /// A result record arrived while no command was outstanding.
    #[error("result record received while no command was outstanding")]
    UnexpectedResultRecord,
}

/// Errors produced while decoding the escaped form of a constant.
///
/// Raised only when the decoded view of a [`Const`](crate::value::Const)
/// is read; parsing never fails on a bad escape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    /// A backslash followed by an unsupported escape character.
    #[error("unknown escape sequence \\{0}")]
    UnknownEscape(char),

    /// The constant ended in the middle of an escape sequence.
    #[error("truncated escape sequence")]
    Truncated,

    /// A numeric escape with non-digit characters in its run.
    #[error("invalid {kind} digits {text:?} in escape sequence")]
    BadDigits {
        /// "octal" or "hex".
        kind: &'static str,
        /// The digit run as it appeared.
        text: String,
    },

    /// A numeric escape naming an invalid Unicode scalar value.
    #[error("escape value U+{0:04X} is not a valid character")]
    InvalidChar(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_unrecognized_line_display() {
        let err = ProtocolError::UnrecognizedLine {
            line: 3,
            text: "garbage".into(),
        };
        assert_eq!(err.to_string(), "line 3 is not a valid MI record: \"garbage\"");
    }

    #[test]
    fn error_missing_end_marker_display() {
        let err = ProtocolError::MissingEndMarker;
        assert!(err.to_string().contains("(gdb)"));
    }

    #[test]
    fn error_unknown_result_class_display() {
        let err = ProtocolError::UnknownResultClass {
            text: "finished".into(),
        };
        assert_eq!(err.to_string(), "unknown result class \"finished\"");
    }

    #[test]
    fn error_expected_display() {
        let err = ProtocolError::Expected {
            expected: "','",
            pos: 7,
        };
        assert_eq!(err.to_string(), "expected ',' at column 7");
    }

    #[test]
    fn escape_error_unknown_display() {
        let err = EscapeError::UnknownEscape('q');
        assert_eq!(err.to_string(), "unknown escape sequence \\q");
    }

    #[test]
    fn escape_error_invalid_char_display() {
        let err = EscapeError::InvalidChar(0xD800);
        assert_eq!(err.to_string(), "escape value U+D800 is not a valid character");
    }
}
