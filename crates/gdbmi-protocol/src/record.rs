//! MI record types: result records, out-of-band records, and the output
//! unit that groups them.

use std::fmt;

use crate::parser::END_MARKER;
use crate::value::{Const, Value};

/// The numeric token prefix of a record.
///
/// Display and debugging only — reply correlation is positional, because
/// exactly one command is outstanding at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token(pub u64);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The reply class of a result record. The keyword set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultClass {
    Done,
    Running,
    Connected,
    Error,
    Exit,
}

impl ResultClass {
    /// Match a wire keyword exactly.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "done" => Some(ResultClass::Done),
            "running" => Some(ResultClass::Running),
            "connected" => Some(ResultClass::Connected),
            "error" => Some(ResultClass::Error),
            "exit" => Some(ResultClass::Exit),
            _ => None,
        }
    }

    /// The wire keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultClass::Done => "done",
            ResultClass::Running => "running",
            ResultClass::Connected => "connected",
            ResultClass::Error => "error",
            ResultClass::Exit => "exit",
        }
    }
}

impl fmt::Display for ResultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Async record kinds, named for their wire sigils.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncClass {
    /// `*` — execution state changes.
    Exec,
    /// `+` — progress.
    Status,
    /// `=` — notifications.
    Notify,
}

impl AsyncClass {
    /// The wire sigil.
    pub fn sigil(&self) -> char {
        match self {
            AsyncClass::Exec => '*',
            AsyncClass::Status => '+',
            AsyncClass::Notify => '=',
        }
    }
}

/// Stream record kinds, named for their wire sigils.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamClass {
    /// `~` — console output.
    Console,
    /// `@` — target output.
    Target,
    /// `&` — debugger log.
    Log,
}

impl StreamClass {
    /// The wire sigil.
    pub fn sigil(&self) -> char {
        match self {
            StreamClass::Console => '~',
            StreamClass::Target => '@',
            StreamClass::Log => '&',
        }
    }
}

/// The class tag of an async output.
///
/// `stopped` is the one tag this client distinguishes; every other tag
/// is carried verbatim so unknown notification kinds survive intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncOutputClass {
    Stopped,
    Other(String),
}

impl AsyncOutputClass {
    /// Classify a wire tag.
    pub fn from_tag(tag: &str) -> Self {
        if tag == "stopped" {
            AsyncOutputClass::Stopped
        } else {
            AsyncOutputClass::Other(tag.to_string())
        }
    }

    /// The wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            AsyncOutputClass::Stopped => "stopped",
            AsyncOutputClass::Other(tag) => tag,
        }
    }
}

impl fmt::Display for AsyncOutputClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The synchronous reply to the most recently sent command.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Optional numeric token, cosmetic.
    pub token: Option<Token>,
    /// The reply class.
    pub class: ResultClass,
    results: Vec<(String, Value)>,
}

impl ResultRecord {
    pub fn new(token: Option<Token>, class: ResultClass, results: Vec<(String, Value)>) -> Self {
        Self {
            token,
            class,
            results,
        }
    }

    /// Look up a field by name, last write wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        lookup(&self.results, name)
    }

    /// The fields in arrival order.
    pub fn results(&self) -> &[(String, Value)] {
        &self.results
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(token) = self.token {
            write!(f, "{token}")?;
        }
        write!(f, "^{}", self.class)?;
        write_pairs(f, &self.results)
    }
}

/// The payload of an async record: a class tag plus named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncOutput {
    /// The class tag.
    pub class: AsyncOutputClass,
    results: Vec<(String, Value)>,
}

impl AsyncOutput {
    pub fn new(class: AsyncOutputClass, results: Vec<(String, Value)>) -> Self {
        Self { class, results }
    }

    /// Look up a field by name, last write wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        lookup(&self.results, name)
    }

    /// The fields in arrival order.
    pub fn results(&self) -> &[(String, Value)] {
        &self.results
    }
}

impl fmt::Display for AsyncOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)?;
        write_pairs(f, &self.results)
    }
}

/// An asynchronous state-change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncRecord {
    /// Optional numeric token, cosmetic.
    pub token: Option<Token>,
    /// Exec, status, or notify.
    pub class: AsyncClass,
    /// The class tag and fields.
    pub output: AsyncOutput,
}

impl AsyncRecord {
    pub fn new(token: Option<Token>, class: AsyncClass, output: AsyncOutput) -> Self {
        Self {
            token,
            class,
            output,
        }
    }
}

impl fmt::Display for AsyncRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(token) = self.token {
            write!(f, "{token}")?;
        }
        write!(f, "{}{}", self.class.sigil(), self.output)
    }
}

/// A line of stream text from the debugger.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRecord {
    /// Console, target, or log.
    pub class: StreamClass,
    /// The quoted text.
    pub content: Const,
}

impl StreamRecord {
    pub fn new(class: StreamClass, content: Const) -> Self {
        Self { class, content }
    }
}

impl fmt::Display for StreamRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class.sigil(), self.content)
    }
}

/// Any notification that is not itself the reply to the most recently
/// sent command.
#[derive(Debug, Clone, PartialEq)]
pub enum OutOfBandRecord {
    Async(AsyncRecord),
    Stream(StreamRecord),
}

impl OutOfBandRecord {
    pub fn as_async(&self) -> Option<&AsyncRecord> {
        match self {
            OutOfBandRecord::Async(record) => Some(record),
            OutOfBandRecord::Stream(_) => None,
        }
    }

    pub fn as_stream(&self) -> Option<&StreamRecord> {
        match self {
            OutOfBandRecord::Async(_) => None,
            OutOfBandRecord::Stream(record) => Some(record),
        }
    }
}

impl fmt::Display for OutOfBandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutOfBandRecord::Async(record) => record.fmt(f),
            OutOfBandRecord::Stream(record) => record.fmt(f),
        }
    }
}

/// One parsed output unit: the out-of-band records and the optional
/// result record carried between two prompt sentinels.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    out_of_band: Vec<OutOfBandRecord>,
    result: Option<ResultRecord>,
}

impl Output {
    pub fn new(out_of_band: Vec<OutOfBandRecord>, result: Option<ResultRecord>) -> Self {
        Self {
            out_of_band,
            result,
        }
    }

    /// The out-of-band records in arrival order.
    pub fn out_of_band(&self) -> &[OutOfBandRecord] {
        &self.out_of_band
    }

    /// The result record, if the unit carried one.
    pub fn result(&self) -> Option<&ResultRecord> {
        self.result.as_ref()
    }

    /// Decompose into out-of-band records and the optional result.
    pub fn into_parts(self) -> (Vec<OutOfBandRecord>, Option<ResultRecord>) {
        (self.out_of_band, self.result)
    }

    /// Render the unit back to wire lines, end marker included.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.out_of_band.iter().map(ToString::to_string).collect();
        if let Some(result) = &self.result {
            lines.push(result.to_string());
        }
        lines.push(END_MARKER.to_string());
        lines
    }
}

/// Last-write-wins lookup over insertion-ordered pairs.
fn lookup<'a>(entries: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    entries.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
}

fn write_pairs(f: &mut fmt::Formatter<'_>, entries: &[(String, Value)]) -> fmt::Result {
    for (name, value) in entries {
        write!(f, ",{name}={value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn const_value(text: &str) -> Value {
        Value::Const(Const::new(text))
    }

    #[test]
    fn result_class_keywords() {
        assert_eq!(ResultClass::from_keyword("done"), Some(ResultClass::Done));
        assert_eq!(ResultClass::from_keyword("exit"), Some(ResultClass::Exit));
        assert_eq!(ResultClass::from_keyword("don"), None);
        assert_eq!(ResultClass::from_keyword("done2"), None);
        assert_eq!(ResultClass::Connected.as_str(), "connected");
    }

    #[test]
    fn async_output_class_tags() {
        assert_eq!(AsyncOutputClass::from_tag("stopped"), AsyncOutputClass::Stopped);
        assert_eq!(
            AsyncOutputClass::from_tag("library-loaded"),
            AsyncOutputClass::Other("library-loaded".into())
        );
        assert_eq!(AsyncOutputClass::from_tag("library-loaded").as_str(), "library-loaded");
    }

    #[test]
    fn result_record_display() {
        let record = ResultRecord::new(
            Some(Token(42)),
            ResultClass::Done,
            vec![("value".into(), const_value("5"))],
        );
        assert_eq!(record.to_string(), "42^done,value=\"5\"");

        let bare = ResultRecord::new(None, ResultClass::Running, Vec::new());
        assert_eq!(bare.to_string(), "^running");
    }

    #[test]
    fn result_record_get_last_write_wins() {
        let record = ResultRecord::new(
            None,
            ResultClass::Done,
            vec![
                ("x".into(), const_value("1")),
                ("x".into(), const_value("2")),
            ],
        );
        assert_eq!(record.get("x").unwrap().as_const().unwrap().raw(), "2");
        assert!(record.get("y").is_none());
    }

    #[test]
    fn async_record_display() {
        let record = AsyncRecord::new(
            None,
            AsyncClass::Exec,
            AsyncOutput::new(
                AsyncOutputClass::Stopped,
                vec![("reason".into(), const_value("breakpoint-hit"))],
            ),
        );
        assert_eq!(record.to_string(), "*stopped,reason=\"breakpoint-hit\"");

        let record = AsyncRecord::new(
            Some(Token(7)),
            AsyncClass::Notify,
            AsyncOutput::new(AsyncOutputClass::Other("library-loaded".into()), Vec::new()),
        );
        assert_eq!(record.to_string(), "7=library-loaded");
    }

    #[test]
    fn stream_record_display() {
        let record = StreamRecord::new(StreamClass::Console, Const::new("hello\\n"));
        assert_eq!(record.to_string(), "~\"hello\\n\"");

        let record = StreamRecord::new(StreamClass::Log, Const::new("log"));
        assert_eq!(record.to_string(), "&\"log\"");
    }

    #[test]
    fn out_of_band_accessors() {
        let stream = OutOfBandRecord::Stream(StreamRecord::new(
            StreamClass::Target,
            Const::new("x"),
        ));
        assert!(stream.as_stream().is_some());
        assert!(stream.as_async().is_none());
    }

    #[test]
    fn output_to_lines() {
        let output = Output::new(
            vec![OutOfBandRecord::Stream(StreamRecord::new(
                StreamClass::Console,
                Const::new("hi"),
            ))],
            Some(ResultRecord::new(None, ResultClass::Done, Vec::new())),
        );
        assert_eq!(output.to_lines(), vec!["~\"hi\"", "^done", "(gdb)"]);
    }

    #[test]
    fn output_without_result_to_lines() {
        let output = Output::new(Vec::new(), None);
        assert_eq!(output.to_lines(), vec!["(gdb)"]);
        assert!(output.result().is_none());
    }

    #[test]
    fn token_display() {
        assert_eq!(Token(1234).to_string(), "1234");
    }
}
