//! Parses `eu-unstrip`-style module tables and resolves addresses against
//! them.
//!
//! Each input line has the shape:
//!
//! ```text
//! 0xSTART+0xLEN BUILDID@0xNOTEOFF FILE DEBUGFILE MODULE
//! ```
//!
//! `FILE`/`DEBUGFILE`/`MODULE` may be `-` when eu-unstrip could not resolve
//! them; those fields are then left unset rather than recorded literally.

#![warn(missing_docs)]

use crash_analytics_common::{Cursor, ErrorKind, ParseError, ParseResult};

/// One resolved address range.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SymCacheEntry {
    /// Start of the mapped range.
    pub start: u64,
    /// Length of the mapped range, in bytes.
    pub length: u64,
    /// Lowercase hex build id, if eu-unstrip resolved one.
    pub build_id: Option<String>,
    /// Path to the binary, if known.
    pub file_name: Option<String>,
    /// Path to the separate debug file, if known.
    pub debug_file_name: Option<String>,
    /// Module name eu-unstrip assigned this range.
    pub mod_name: Option<String>,
}

impl SymCacheEntry {
    /// `true` if `address` falls within `[start, start + length)`.
    pub fn contains(&self, address: u64) -> bool {
        self.start <= address && address < self.start + self.length
    }
}

/// A parsed module/address table, supporting address-range lookups.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SymCache {
    entries: Vec<SymCacheEntry>,
}

impl SymCache {
    /// Parses a multi-line `eu-unstrip -n` style table.
    pub fn parse(input: &str) -> ParseResult<SymCache> {
        let mut entries = Vec::new();
        for line in input.lines() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_line(line)?);
        }
        Ok(SymCache { entries })
    }

    /// All parsed entries, in input order.
    pub fn entries(&self) -> &[SymCacheEntry] {
        &self.entries
    }

    /// The entry containing `address`, if any; when ranges overlap, the
    /// first matching entry in input order wins.
    pub fn lookup(&self, address: u64) -> Option<&SymCacheEntry> {
        self.entries.iter().find(|e| e.contains(address))
    }
}

fn opt(token: &str) -> Option<String> {
    if token == "-" {
        None
    } else {
        Some(token.to_owned())
    }
}

fn parse_line(line: &str) -> ParseResult<SymCacheEntry> {
    let mut cursor = Cursor::new(line);

    let mut start = 0u64;
    if !cursor.parse_unsigned_hex(&mut start, true) {
        return Err(ParseError {
            location: cursor.location(),
            kind: ErrorKind::InvalidToken,
            message: "expected '0xSTART'".into(),
        });
    }
    if !cursor.skip_char('+') {
        return Err(ParseError {
            location: cursor.location(),
            kind: ErrorKind::InvalidToken,
            message: "expected '+' between start and length".into(),
        });
    }
    let mut length = 0u64;
    if !cursor.parse_unsigned_hex(&mut length, true) {
        return Err(ParseError {
            location: cursor.location(),
            kind: ErrorKind::InvalidToken,
            message: "expected '0xLEN'".into(),
        });
    }

    let rest = cursor.rest().trim();
    let mut tokens = rest.split_whitespace();

    let build_id = tokens
        .next()
        .and_then(|tok| tok.split('@').next())
        .and_then(opt);
    let file_name = tokens.next().and_then(opt);
    let debug_file_name = tokens.next().and_then(opt);
    let mod_name = tokens.next().and_then(opt);

    Ok(SymCacheEntry {
        start,
        length,
        build_id,
        file_name,
        debug_file_name,
        mod_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0x400000+0x1000 abcdef12@0x400128 /usr/bin/crashy /usr/lib/debug/crashy.debug crashy\n\
                           0x600000+0x2000 - - - -\n";

    #[test]
    fn parses_resolved_and_unresolved_entries() {
        let cache = SymCache::parse(SAMPLE).unwrap();
        assert_eq!(cache.entries().len(), 2);

        let first = &cache.entries()[0];
        assert_eq!(first.start, 0x400000);
        assert_eq!(first.length, 0x1000);
        assert_eq!(first.build_id.as_deref(), Some("abcdef12"));
        assert_eq!(first.file_name.as_deref(), Some("/usr/bin/crashy"));
        assert_eq!(first.mod_name.as_deref(), Some("crashy"));

        let second = &cache.entries()[1];
        assert!(second.build_id.is_none());
        assert!(second.file_name.is_none());
    }

    #[test]
    fn looks_up_containing_range() {
        let cache = SymCache::parse(SAMPLE).unwrap();
        let entry = cache.lookup(0x400500).unwrap();
        assert_eq!(entry.mod_name.as_deref(), Some("crashy"));
        assert!(cache.lookup(0x999999).is_none());
    }
}
