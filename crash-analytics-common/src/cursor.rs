use crate::error::{ErrorKind, Location, ParseError};

/// A predicate over a single character, used by [`Cursor::skip_run`] and
/// friends.
///
/// This is implemented for any `Fn(char) -> bool`, so callers typically pass
/// a closure or one of the small helpers in this module (e.g.
/// [`is_hex_digit`]).
pub trait CharClass {
    /// Returns `true` if `c` belongs to this class.
    fn matches(&self, c: char) -> bool;
}

impl<F: Fn(char) -> bool> CharClass for F {
    fn matches(&self, c: char) -> bool {
        self(c)
    }
}

/// A fixed set of characters, usable wherever a [`CharClass`] is expected.
impl CharClass for &[char] {
    fn matches(&self, c: char) -> bool {
        self.contains(&c)
    }
}

/// Returns `true` for ASCII hex digits (`0-9a-fA-F`).
pub fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Returns `true` for ASCII decimal digits.
pub fn is_dec_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// A location/column-aware cursor over a text buffer.
///
/// The cursor starts at line 1, column 0. Advancing over a `\n` increments
/// the line and resets the column to 0; any other character advances the
/// column by one grapheme-oblivious `char`.
///
/// Every scanning primitive follows one rule: on structural mismatch the
/// cursor position is left unchanged ("did not consume"), so callers can
/// freely try alternatives; on a malformed token it consumes the partial
/// match and records the first error via [`Cursor::fail_with`]. Parsers
/// never rewind past a recorded failure.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a str,
    /// Byte offset of the remaining slice within the original input.
    offset: usize,
    line: u32,
    column: u32,
    error: Option<ParseError>,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Cursor {
            input,
            offset: 0,
            line: 1,
            column: 0,
            error: None,
        }
    }

    /// The current, not yet consumed, location.
    pub fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
        }
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// `true` once the entire input has been consumed.
    pub fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// The first recorded parse error, if any.
    ///
    /// Once an error has been recorded, later calls to [`Cursor::fail_with`]
    /// are no-ops: the cursor only ever reports the *first* error, matching
    /// the "parsers never rewind past a `fail_with`" rule.
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Converts the recorded error (if any) into a `Result`.
    pub fn into_result<T>(self, value: T) -> Result<T, ParseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }

    /// Records a parse error at the cursor's current location.
    ///
    /// Returns the recorded error kind regardless of whether this call was
    /// the one that set it, so callers can bubble it up uniformly.
    pub fn fail_with(&mut self, kind: ErrorKind, message: impl Into<String>) -> &ParseError {
        if self.error.is_none() {
            self.error = Some(ParseError {
                location: self.location(),
                kind,
                message: message.into(),
            });
        }
        self.error.as_ref().expect("just set")
    }

    fn advance_one(&mut self) -> char {
        let c = self.rest().chars().next().expect("advance_one on EOF");
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        c
    }

    /// Consumes exactly one occurrence of `c`.
    ///
    /// Returns `true` and advances on a match; otherwise the cursor is left
    /// unchanged and `false` is returned.
    pub fn skip_char(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.advance_one();
            true
        } else {
            false
        }
    }

    /// Consumes exactly one character belonging to `class`.
    ///
    /// Returns the consumed character, or `None` (cursor unchanged) if the
    /// next character (or EOF) does not belong to the class.
    pub fn skip_one_of(&mut self, class: impl CharClass) -> Option<char> {
        let c = self.rest().chars().next()?;
        if class.matches(c) {
            self.advance_one();
            Some(c)
        } else {
            None
        }
    }

    /// Consumes the longest run of characters belonging to `class`, which
    /// may be empty.
    ///
    /// Returns the number of characters consumed; the cursor is only
    /// updated for the characters actually consumed (a run of zero leaves
    /// the cursor unchanged).
    pub fn skip_run(&mut self, class: impl CharClass) -> usize {
        let mut count = 0;
        while let Some(c) = self.rest().chars().next() {
            if !class.matches(c) {
                break;
            }
            self.advance_one();
            count += 1;
        }
        count
    }

    /// Parses an unsigned decimal integer into `out`.
    ///
    /// Returns `true` on success. On overflow, records a
    /// [`ErrorKind::IntegerOverflow`] error and still returns `true`
    /// (partial consumption, per the "consumed partial, error recorded"
    /// rule) so callers terminate rather than backtrack.
    pub fn parse_unsigned_dec(&mut self, out: &mut u64) -> bool {
        let start = self.offset;
        let digits = self.skip_run(is_dec_digit as fn(char) -> bool);
        if digits == 0 {
            debug_assert_eq!(self.offset, start);
            return false;
        }
        let text = &self.input[start..self.offset];
        match text.parse::<u64>() {
            Ok(value) => {
                *out = value;
                true
            }
            Err(_) => {
                self.fail_with(
                    ErrorKind::IntegerOverflow,
                    format!("decimal literal '{text}' does not fit in u64"),
                );
                true
            }
        }
    }

    /// Parses an unsigned hexadecimal integer into `out`.
    ///
    /// If `require_prefix` is set, a leading `0x`/`0X` must be present and
    /// is consumed but not included in the digit count; otherwise a prefix
    /// is consumed opportunistically if present.
    pub fn parse_unsigned_hex(&mut self, out: &mut u64, require_prefix: bool) -> bool {
        let start = self.offset;
        let had_prefix = self.rest().starts_with("0x") || self.rest().starts_with("0X");
        if had_prefix {
            self.advance_one();
            self.advance_one();
        } else if require_prefix {
            return false;
        }

        let digits_start = self.offset;
        let digits = self.skip_run(is_hex_digit as fn(char) -> bool);
        if digits == 0 {
            self.offset = start;
            self.column = self.column.saturating_sub(if had_prefix { 2 } else { 0 });
            return false;
        }
        let text = &self.input[digits_start..self.offset];
        match u64::from_str_radix(text, 16) {
            Ok(value) => {
                *out = value;
                true
            }
            Err(_) => {
                self.fail_with(
                    ErrorKind::IntegerOverflow,
                    format!("hex literal '{text}' does not fit in u64"),
                );
                true
            }
        }
    }

    /// Consumes exactly the literal `expected`, or leaves the cursor
    /// unchanged and returns `false`.
    pub fn parse_string_literal(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            for c in expected.chars() {
                self.advance_one();
            }
            true
        } else {
            false
        }
    }

    /// Captures characters up to (but not including) the first character in
    /// `delim`, or to EOF, into `out`.
    ///
    /// Always succeeds (the captured run may be empty) and always advances.
    pub fn parse_until(&mut self, delim: impl CharClass, out: &mut String) {
        out.clear();
        while let Some(c) = self.rest().chars().next() {
            if delim.matches(c) {
                break;
            }
            out.push(c);
            self.advance_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_line_and_column() {
        let mut cursor = Cursor::new("ab\ncd");
        assert_eq!(cursor.location(), Location { line: 1, column: 0 });
        cursor.skip_char('a');
        cursor.skip_char('b');
        assert_eq!(cursor.location(), Location { line: 1, column: 2 });
        cursor.skip_char('\n');
        assert_eq!(cursor.location(), Location { line: 2, column: 0 });
    }

    #[test]
    fn skip_char_does_not_consume_on_mismatch() {
        let mut cursor = Cursor::new("xyz");
        assert!(!cursor.skip_char('a'));
        assert_eq!(cursor.rest(), "xyz");
    }

    #[test]
    fn parse_unsigned_dec_roundtrip() {
        let mut cursor = Cursor::new("12345 rest");
        let mut out = 0;
        assert!(cursor.parse_unsigned_dec(&mut out));
        assert_eq!(out, 12345);
        assert_eq!(cursor.rest(), " rest");
        assert!(cursor.error().is_none());
    }

    #[test]
    fn parse_unsigned_dec_overflow_is_recorded() {
        let mut cursor = Cursor::new("99999999999999999999999");
        let mut out = 0;
        assert!(cursor.parse_unsigned_dec(&mut out));
        assert_eq!(cursor.error().unwrap().kind, ErrorKind::IntegerOverflow);
    }

    #[test]
    fn parse_unsigned_hex_with_and_without_prefix() {
        let mut cursor = Cursor::new("0xABCDef");
        let mut out = 0;
        assert!(cursor.parse_unsigned_hex(&mut out, true));
        assert_eq!(out, 0x00ab_cdef);

        let mut cursor = Cursor::new("ABCDef");
        let mut out = 0;
        assert!(cursor.parse_unsigned_hex(&mut out, false));
        assert_eq!(out, 0x00ab_cdef);

        let mut cursor = Cursor::new("zz");
        let mut out = 0;
        assert!(!cursor.parse_unsigned_hex(&mut out, true));
    }

    #[test]
    fn parse_until_captures_delimited_run() {
        let mut cursor = Cursor::new("name=value");
        let mut out = String::new();
        cursor.parse_until(|c: char| c == '=', &mut out);
        assert_eq!(out, "name");
        assert!(cursor.skip_char('='));
    }

    #[test]
    fn fail_with_only_records_first_error() {
        let mut cursor = Cursor::new("");
        cursor.fail_with(ErrorKind::UnexpectedEof, "first");
        cursor.fail_with(ErrorKind::InvalidToken, "second");
        assert_eq!(cursor.error().unwrap().message, "first");
    }
}
