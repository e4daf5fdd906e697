//! Shared primitives used by every dialect parser in `crash-analytics`.
//!
//! This crate has no knowledge of any particular stack trace dialect. It
//! provides:
//!
//! - [`Cursor`] and the scanning primitives built on top of it: a
//!   line/column-aware cursor over a text buffer, with typed parsers for
//!   decimal/hex integers, identifiers and delimited runs.
//! - [`ParseError`] and [`Location`], the location-bearing error type that
//!   every dialect parser in `crash-analytics-stacktrace` returns.
//! - [`anonymize_home_dir`], the path anonymization helper used by the
//!   normalizer.

#![warn(missing_docs)]

mod cursor;
mod error;
mod path;

pub use cursor::{CharClass, Cursor};
pub use error::{ErrorKind, Location, ParseError, ParseResult};
pub use path::anonymize_home_dir;
