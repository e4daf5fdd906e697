use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 1-based line, 0-based column position within a text buffer.
///
/// Matches the cursor's own semantics: the origin is `(1, 0)`, and a
/// newline increments the line and resets the column.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// 1-based line number.
    pub line: u32,
    /// 0-based column within the line.
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of structural or lexical rejection a dialect parser produced.
///
/// This is intentionally a flat, `Copy` tag rather than a carrier of borrowed
/// data, so it can be compared and logged cheaply; the human-readable detail
/// lives in [`ParseError::message`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Input ended where a token was required.
    UnexpectedEof,
    /// A required literal or keyword was not found.
    InvalidToken,
    /// A numeric literal did not fit its target width.
    IntegerOverflow,
    /// A build-id string was not valid lowercase hex of even length.
    InvalidBuildId,
    /// A dialect-specific structural record was malformed.
    MalformedRecord,
    /// The input did not contain any recognizable dialect content at all.
    NoContent,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnexpectedEof => "unexpected end of input",
            Self::InvalidToken => "invalid token",
            Self::IntegerOverflow => "integer literal out of range",
            Self::InvalidBuildId => "invalid build id",
            Self::MalformedRecord => "malformed record",
            Self::NoContent => "no recognizable content",
        };
        f.write_str(text)
    }
}

/// A location-bearing parse error.
///
/// Propagated to the caller and never logged internally; parsers never
/// retry and surface only the first error they encounter.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{location}: {kind}: {message}")]
pub struct ParseError {
    /// Location at which the error was first recorded.
    pub location: Location,
    /// The structural category of the failure.
    pub kind: ErrorKind,
    /// A human-readable description, not meant to be parsed.
    pub message: String,
}

/// Convenience alias for the result of a dialect parse entry point.
pub type ParseResult<T> = Result<T, ParseError>;
