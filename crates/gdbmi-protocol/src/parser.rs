//! Recursive-descent parser for MI output units.
//!
//! Every production is chosen by a single lookahead character or a fixed
//! keyword set, and the cursor only moves forward, so parsing is linear
//! in the input length. No regular expressions, no backtracking.

use crate::error::ProtocolError;
use crate::record::{
    AsyncClass, AsyncOutput, AsyncOutputClass, AsyncRecord, OutOfBandRecord, Output, ResultClass,
    ResultRecord, StreamClass, StreamRecord, Token,
};
use crate::value::{Const, List, Tuple, Value};

/// The prompt line that terminates every output unit.
pub const END_MARKER: &str = "(gdb)";

/// Parse one output unit: zero or more out-of-band lines, at most one
/// result line, zero or more trailing out-of-band lines, and the end
/// marker as the final line.
pub fn parse_output<S: AsRef<str>>(lines: &[S]) -> Result<Output, ProtocolError> {
    let mut out_of_band = Vec::new();
    let mut result: Option<ResultRecord> = None;

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line == END_MARKER {
            if index + 1 != lines.len() {
                return Err(ProtocolError::TrailingLines { line: index + 2 });
            }
            return Ok(Output::new(out_of_band, result));
        }
        match classify(line) {
            Some(LineKind::Stream) | Some(LineKind::Async) => {
                out_of_band.push(parse_out_of_band(line)?);
            }
            Some(LineKind::Result) => {
                if result.is_some() {
                    return Err(ProtocolError::DuplicateResultRecord { line: index + 1 });
                }
                result = Some(parse_result_record(line)?);
            }
            None => {
                return Err(ProtocolError::UnrecognizedLine {
                    line: index + 1,
                    text: line.to_string(),
                });
            }
        }
    }

    Err(ProtocolError::MissingEndMarker)
}

/// Parse a single out-of-band line (stream or async record).
pub fn parse_out_of_band(line: &str) -> Result<OutOfBandRecord, ProtocolError> {
    let mut parser = LineParser::new(line);
    let record = match classify(line) {
        Some(LineKind::Stream) => OutOfBandRecord::Stream(parser.stream_record()?),
        Some(LineKind::Async) => OutOfBandRecord::Async(parser.async_record()?),
        _ => {
            return Err(ProtocolError::UnrecognizedLine {
                line: 1,
                text: line.to_string(),
            })
        }
    };
    parser.finish()?;
    Ok(record)
}

/// Parse a single result-record line.
pub fn parse_result_record(line: &str) -> Result<ResultRecord, ProtocolError> {
    let mut parser = LineParser::new(line);
    let record = parser.result_record()?;
    parser.finish()?;
    Ok(record)
}

/// Record kinds a raw line can classify to, decided by the first
/// character after any leading decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Stream,
    Async,
    Result,
}

fn classify(line: &str) -> Option<LineKind> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'~') | Some(b'@') | Some(b'&') => Some(LineKind::Stream),
        Some(b'*') | Some(b'+') | Some(b'=') => Some(LineKind::Async),
        Some(b'^') => Some(LineKind::Result),
        _ => None,
    }
}

/// The element kind a list is locked to by its first element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Tuple,
    List,
    Const,
}

impl ListKind {
    fn opening(self) -> u8 {
        match self {
            ListKind::Tuple => b'{',
            ListKind::List => b'[',
            ListKind::Const => b'"',
        }
    }
}

/// Cursor over one record line. Each grammar rule advances `pos` past
/// exactly what it consumed.
struct LineParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> LineParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos == self.input.len()
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), ProtocolError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ProtocolError::Expected {
                expected,
                pos: self.pos,
            })
        }
    }

    fn finish(&self) -> Result<(), ProtocolError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(ProtocolError::TrailingInput { pos: self.pos })
        }
    }

    /// Optional leading decimal token.
    fn token(&mut self) -> Result<Option<Token>, ProtocolError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == start {
            return Ok(None);
        }
        let number = self.input[start..self.pos]
            .parse::<u64>()
            .map_err(|_| ProtocolError::TokenOverflow { pos: start })?;
        Ok(Some(Token(number)))
    }

    /// Scan to the next `,` or the end of the line.
    fn class_tag(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte == b',' {
                break;
            }
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn result_record(&mut self) -> Result<ResultRecord, ProtocolError> {
        let token = self.token()?;
        self.expect(b'^', "'^'")?;
        let keyword = self.class_tag();
        let class = ResultClass::from_keyword(keyword).ok_or_else(|| {
            ProtocolError::UnknownResultClass {
                text: keyword.to_string(),
            }
        })?;
        let mut results = Vec::new();
        while !self.at_end() {
            self.expect(b',', "','")?;
            results.push(self.result_pair()?);
        }
        Ok(ResultRecord::new(token, class, results))
    }

    fn async_record(&mut self) -> Result<AsyncRecord, ProtocolError> {
        let token = self.token()?;
        let class = match self.peek() {
            Some(b'*') => AsyncClass::Exec,
            Some(b'+') => AsyncClass::Status,
            Some(b'=') => AsyncClass::Notify,
            _ => {
                return Err(ProtocolError::Expected {
                    expected: "async record class ('*', '+' or '=')",
                    pos: self.pos,
                })
            }
        };
        self.pos += 1;
        let output = self.async_output()?;
        Ok(AsyncRecord::new(token, class, output))
    }

    fn async_output(&mut self) -> Result<AsyncOutput, ProtocolError> {
        let class = AsyncOutputClass::from_tag(self.class_tag());
        let mut results = Vec::new();
        while !self.at_end() {
            self.expect(b',', "','")?;
            results.push(self.result_pair()?);
        }
        Ok(AsyncOutput::new(class, results))
    }

    fn stream_record(&mut self) -> Result<StreamRecord, ProtocolError> {
        // A token ahead of a stream record is legal on the wire but
        // carries no meaning; the record type does not keep one.
        let _ = self.token()?;
        let class = match self.peek() {
            Some(b'~') => StreamClass::Console,
            Some(b'@') => StreamClass::Target,
            Some(b'&') => StreamClass::Log,
            _ => {
                return Err(ProtocolError::Expected {
                    expected: "stream record class ('~', '@' or '&')",
                    pos: self.pos,
                })
            }
        };
        self.pos += 1;
        let content = self.constant()?;
        Ok(StreamRecord::new(class, content))
    }

    /// One `name=value` pair. The name runs to the first `=`.
    fn result_pair(&mut self) -> Result<(String, Value), ProtocolError> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte == b'=' {
                break;
            }
            self.pos += 1;
        }
        if self.at_end() {
            return Err(ProtocolError::MissingEquals { pos: start });
        }
        if self.pos == start {
            return Err(ProtocolError::EmptyVariableName { pos: start });
        }
        let name = self.input[start..self.pos].to_string();
        self.pos += 1; // eat '='
        let value = self.value()?;
        Ok((name, value))
    }

    /// Value dispatch on one lookahead character.
    fn value(&mut self) -> Result<Value, ProtocolError> {
        match self.peek() {
            Some(b'{') => Ok(Value::Tuple(self.tuple()?)),
            Some(b'[') => Ok(Value::List(self.list()?)),
            Some(b'"') => Ok(Value::Const(self.constant()?)),
            _ => Err(ProtocolError::Expected {
                expected: "a value ('{', '[' or '\"')",
                pos: self.pos,
            }),
        }
    }

    fn tuple(&mut self) -> Result<Tuple, ProtocolError> {
        self.expect(b'{', "'{'")?;
        let mut tuple = Tuple::new();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(tuple);
        }
        loop {
            let (name, value) = self.result_pair()?;
            tuple.push(name, value);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(tuple);
                }
                _ => {
                    return Err(ProtocolError::Expected {
                        expected: "',' or '}'",
                        pos: self.pos,
                    })
                }
            }
        }
    }

    fn list(&mut self) -> Result<List, ProtocolError> {
        self.expect(b'[', "'['")?;
        if self.peek() == Some(b']') {
            self.pos += 1;
            // An empty list's element kind is unconstrained.
            return Ok(List::empty());
        }
        match self.peek() {
            Some(b'{') => self.value_list(ListKind::Tuple),
            Some(b'[') => self.value_list(ListKind::List),
            Some(b'"') => self.value_list(ListKind::Const),
            _ => self.result_list(),
        }
    }

    /// A list of bare values, every element opening like the first.
    fn value_list(&mut self, kind: ListKind) -> Result<List, ProtocolError> {
        let mut values = Vec::new();
        loop {
            if self.peek() != Some(kind.opening()) {
                return Err(ProtocolError::MixedListElements { pos: self.pos });
            }
            values.push(self.value()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(List::Values(values));
                }
                _ => {
                    return Err(ProtocolError::Expected {
                        expected: "',' or ']'",
                        pos: self.pos,
                    })
                }
            }
        }
    }

    /// A list of named `name=value` pairs.
    fn result_list(&mut self) -> Result<List, ProtocolError> {
        let mut results = Vec::new();
        loop {
            // A named element cannot open like a bare value.
            if matches!(self.peek(), Some(b'{') | Some(b'[') | Some(b'"')) {
                return Err(ProtocolError::MixedListElements { pos: self.pos });
            }
            results.push(self.result_pair()?);
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(List::Results(results));
                }
                _ => {
                    return Err(ProtocolError::Expected {
                        expected: "',' or ']'",
                        pos: self.pos,
                    })
                }
            }
        }
    }

    /// A quoted constant. The raw text between the opening quote and the
    /// next quote not preceded by a backslash is stored verbatim.
    fn constant(&mut self) -> Result<Const, ProtocolError> {
        let start = self.pos;
        self.expect(b'"', "'\"'")?;
        let bytes = self.input.as_bytes();
        let mut i = self.pos;
        while i < bytes.len() {
            if bytes[i] == b'"' && bytes[i - 1] != b'\\' {
                break;
            }
            i += 1;
        }
        if i == bytes.len() {
            return Err(ProtocolError::UnterminatedConst { pos: start });
        }
        let raw = self.input[self.pos..i].to_string();
        self.pos = i + 1;
        Ok(Const::new(raw))
    }
}
