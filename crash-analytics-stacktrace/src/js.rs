//! JavaScript (V8/Node) stack trace parsing and serialization.
//!
//! Frame grammar:
//! `    at <funcname> (<file>:<line>:<column>)` or
//! `    at <file>:<line>:<column>` when anonymous.

use serde::{Deserialize, Serialize};

use crash_analytics_common::{Cursor, ErrorKind, ParseResult};

use crate::frame::JsFrame;
use crate::{Dialect, Frame, Thread};

/// A parsed JavaScript stack trace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsStacktrace {
    /// Frames, topmost first.
    pub frames: Vec<JsFrame>,
    /// The exception/error name from the header line (`Error: message` or
    /// `TypeError: message`), if present.
    pub exception_name: Option<String>,
}

impl JsStacktrace {
    /// Parses a JavaScript stack trace.
    pub fn parse(input: &str) -> ParseResult<JsStacktrace> {
        let mut frames = Vec::new();
        let mut exception_name = None;

        for line in input.lines() {
            let trimmed = line.trim_start();
            if let Some(frame) = parse_frame_line(trimmed) {
                frames.push(frame);
                continue;
            }
            if exception_name.is_none() && !trimmed.is_empty() {
                exception_name = Some(
                    trimmed
                        .split(':')
                        .next()
                        .unwrap_or(trimmed)
                        .trim()
                        .to_owned(),
                );
            }
        }

        if frames.is_empty() {
            return Err(crash_analytics_common::ParseError {
                location: Default::default(),
                kind: ErrorKind::NoContent,
                message: "no javascript 'at ...' frame lines found".into(),
            });
        }

        Ok(JsStacktrace {
            frames,
            exception_name,
        })
    }

    /// A generic [`Thread`] view for dialect-agnostic code.
    pub fn thread(&self) -> Thread {
        Thread {
            dialect: Dialect::Js,
            frames: self.frames.iter().cloned().map(Frame::Js).collect(),
            name: None,
            is_crash: true,
        }
    }

    /// Short textual rendering.
    pub fn append_to_str(&self, buf: &mut String) {
        self.thread().append_to_str(buf);
    }
}

fn parse_frame_line(line: &str) -> Option<JsFrame> {
    let mut cursor = Cursor::new(line);
    if !cursor.parse_string_literal("at ") {
        return None;
    }

    let rest = cursor.rest();
    let (function_name, location) = if let Some(open) = rest.find(" (") {
        if rest.ends_with(')') {
            (
                Some(rest[..open].to_owned()),
                &rest[open + 2..rest.len() - 1],
            )
        } else {
            (None, rest)
        }
    } else {
        (None, rest)
    };

    let mut parts = location.rsplitn(3, ':');
    let column: u32 = parts.next()?.parse().ok()?;
    let line_no: u32 = parts.next()?.parse().ok()?;
    let file_name = parts.next()?.to_owned();

    Some(JsFrame {
        file_name,
        line: line_no,
        column,
        function_name,
    })
}
