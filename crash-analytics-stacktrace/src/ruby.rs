//! Ruby backtrace parsing and serialization.
//!
//! Frame grammar:
//! `path:line:in \`[rescue in ][block [(N levels) ]in ][<]funcname[>]'`

use serde::{Deserialize, Serialize};

use crash_analytics_common::{Cursor, ErrorKind, ParseResult};

use crate::frame::RubyFrame;
use crate::{Dialect, Frame, Thread};

/// A parsed Ruby backtrace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RubyStacktrace {
    /// Frames, topmost first.
    pub frames: Vec<RubyFrame>,
    /// Exception class name, if the backtrace carried one.
    pub exception_name: Option<String>,
}

impl RubyStacktrace {
    /// Parses a Ruby backtrace, one frame per non-empty line.
    pub fn parse(input: &str) -> ParseResult<RubyStacktrace> {
        let mut frames = Vec::new();
        let mut exception_name = None;

        for line in input.lines() {
            if line.is_empty() {
                continue;
            }
            match parse_frame_line(line) {
                Some(frame) => frames.push(frame),
                None if exception_name.is_none() && line.contains(':') => {
                    exception_name = Some(line.split(':').next().unwrap_or(line).to_owned());
                }
                None => {}
            }
        }

        if frames.is_empty() {
            return Err(crash_analytics_common::ParseError {
                location: Default::default(),
                kind: ErrorKind::NoContent,
                message: "no ruby frame lines found".into(),
            });
        }

        Ok(RubyStacktrace {
            frames,
            exception_name,
        })
    }

    /// A generic [`Thread`] view for dialect-agnostic code.
    pub fn thread(&self) -> Thread {
        Thread {
            dialect: Dialect::Ruby,
            frames: self.frames.iter().cloned().map(Frame::Ruby).collect(),
            name: None,
            is_crash: true,
        }
    }

    /// Short textual rendering.
    pub fn append_to_str(&self, buf: &mut String) {
        self.thread().append_to_str(buf);
    }
}

fn parse_frame_line(line: &str) -> Option<RubyFrame> {
    let mut cursor = Cursor::new(line);
    let mut file_name = String::new();
    cursor.parse_until(|c: char| c == ':', &mut file_name);
    if file_name.is_empty() || !cursor.skip_char(':') {
        return None;
    }

    let mut line_number = 0u64;
    if !cursor.parse_unsigned_dec(&mut line_number) {
        return None;
    }
    if !cursor.parse_string_literal(":in `") {
        return None;
    }

    let mut remainder = String::new();
    cursor.parse_until(|_: char| false, &mut remainder);
    let remainder = remainder.strip_suffix('\'').unwrap_or(&remainder);

    let mut rest = remainder;
    let mut rescue_level = 0u32;
    while let Some(stripped) = rest.strip_prefix("rescue in ") {
        rescue_level += 1;
        rest = stripped;
    }

    let mut block_level = 0u32;
    if let Some(stripped) = rest.strip_prefix("block ") {
        if let Some(after_levels) = stripped.strip_prefix('(') {
            if let Some((count_str, after_paren)) = after_levels.split_once(" levels) in ") {
                block_level = count_str.parse().unwrap_or(1);
                rest = after_paren;
            } else {
                block_level = 1;
                rest = stripped;
            }
        } else if let Some(after_in) = stripped.strip_prefix("in ") {
            block_level = 1;
            rest = after_in;
        } else {
            rest = stripped;
        }
    }

    let special_function = rest.starts_with('<') && rest.ends_with('>');
    let function_name = if special_function {
        rest.trim_start_matches('<').trim_end_matches('>').to_owned()
    } else {
        rest.to_owned()
    };

    Some(RubyFrame {
        file_name,
        line: line_number as u32,
        function_name,
        special_function,
        block_level,
        rescue_level,
    })
}
