//! Error types produced while parsing MW markup.

use thiserror::Error;

/// Errors that can occur while parsing MW or embedded JSON.
///
/// Every variant that points at a specific place in the input carries a
/// 1-based `line` and a 0-based `position`, matching the diagnostic format
/// `Line L, position P: <description>`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A structural or grammar violation detected by the block reader or
    /// value parser (bad indentation, missing closing quote, unexpected
    /// character, recursion limit exceeded, and so on).
    #[error("Line {line}, position {position}: {message}")]
    Syntax {
        line: u32,
        position: u32,
        message: String,
    },

    /// The input contained no value at all (only comments/blank lines, or
    /// nothing): `parse` reached end of input before finding a top-level
    /// value.
    #[error("unexpected end of input")]
    Eof,

    /// The line source refused to accept a pushed-back line. This indicates
    /// a bug in a `LineSource` implementation, not malformed input.
    #[error("line source failed to accept an unread line")]
    UnreadFailed,

    #[error("Line {line}, position {position}: bad number")]
    BadNumber { line: u32, position: u32 },

    #[error("Line {line}, position {position}: numeric overflow")]
    NumericOverflow { line: u32, position: u32 },

    #[error("Line {line}, position {position}: bad date/time")]
    BadDateTime { line: u32, position: u32 },

    #[error("Line {line}, position {position}: bad timestamp")]
    BadTimestamp { line: u32, position: u32 },

    /// The underlying `LineSource` failed (e.g. file I/O error).
    #[error("I/O error: {0}")]
    Io(String),
}

impl ParseError {
    pub fn syntax(line: u32, position: u32, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line,
            position,
            message: message.into(),
        }
    }

    /// Line number of the error, if this variant carries one.
    pub fn line(&self) -> Option<u32> {
        match self {
            ParseError::Syntax { line, .. }
            | ParseError::BadNumber { line, .. }
            | ParseError::NumericOverflow { line, .. }
            | ParseError::BadDateTime { line, .. }
            | ParseError::BadTimestamp { line, .. } => Some(*line),
            ParseError::Eof | ParseError::UnreadFailed | ParseError::Io(_) => None,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::Io(e.to_string())
    }
}

/// Convenience alias used throughout mw-core.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Internal control-flow signal used by the block reader and its callers.
///
/// `EndOfBlock` must never escape a public API; every public entry point
/// either consumes it internally or converts it into [`ParseError::Eof`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    EndOfBlock,
    Eof,
    Err(ParseError),
}

impl From<ParseError> for Flow {
    fn from(e: ParseError) -> Self {
        Flow::Err(e)
    }
}

impl From<Flow> for ParseError {
    /// Converts a `Flow` signal into a public error.
    ///
    /// `EndOfBlock` has no sensible public representation; reaching this
    /// conversion for it means a caller failed to handle it explicitly, so
    /// it is reported as an (internal) syntax error rather than panicking.
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::Err(e) => e,
            Flow::Eof => ParseError::Eof,
            Flow::EndOfBlock => ParseError::syntax(0, 0, "unexpected end of block"),
        }
    }
}

pub(crate) type FlowResult<T> = std::result::Result<T, Flow>;
