//! CPython traceback parsing and serialization.

use serde::{Deserialize, Serialize};

use crash_analytics_common::{Cursor, ErrorKind, ParseResult};

use crate::frame::PythonFrame;
use crate::{Dialect, Frame, Thread};

const TRACEBACK_HEADER: &str = "Traceback (most recent call last):";

/// A parsed CPython traceback.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PythonStacktrace {
    /// Frames, topmost (most recently called) first. Note that CPython
    /// itself prints frames oldest-first; the parser reverses them so the
    /// in-memory representation matches the "topmost first" convention
    /// shared by every other dialect.
    pub frames: Vec<PythonFrame>,
    /// `file_name` of the innermost (most recently called) frame, promoted
    /// to stacktrace level. Empty if the traceback carried no frames.
    pub file_name: String,
    /// `file_line` of the innermost frame, promoted alongside `file_name`.
    pub file_line: u32,
    /// The exception name from the final `<ExceptionName>: <message>` line.
    pub exception_name: Option<String>,
    /// The exception message, if any text followed the `:`.
    pub exception_message: Option<String>,
}

impl PythonStacktrace {
    /// Parses a CPython traceback, skipping any preamble before the
    /// `Traceback (most recent call last):` header.
    pub fn parse(input: &str) -> ParseResult<PythonStacktrace> {
        let mut lines = input.lines();
        let found_header = lines.by_ref().any(|line| line == TRACEBACK_HEADER);
        if !found_header {
            return Err(crash_analytics_common::ParseError {
                location: Default::default(),
                kind: ErrorKind::NoContent,
                message: "missing 'Traceback (most recent call last):' header".into(),
            });
        }

        let mut frames_oldest_first = Vec::new();
        let mut exception_name = None;
        let mut exception_message = None;

        for line in lines {
            if let Some(frame) = parse_frame_line(line) {
                frames_oldest_first.push(frame);
                continue;
            }

            if !line.is_empty() && !line.starts_with(' ') && !line.starts_with('\t') {
                let (name, message) = match line.split_once(": ") {
                    Some((name, message)) => (name.to_owned(), Some(message.to_owned())),
                    None => (line.trim_end_matches(':').to_owned(), None),
                };
                exception_name = Some(name);
                exception_message = message;
                continue;
            }

            if let Some(last) = frames_oldest_first.last_mut() {
                last.line_contents = Some(line.trim().to_owned());
            }
        }

        let (file_name, file_line) = match frames_oldest_first.last() {
            Some(innermost) => (innermost.file_name.clone(), innermost.file_line),
            None => (String::new(), 0),
        };

        frames_oldest_first.reverse();

        Ok(PythonStacktrace {
            frames: frames_oldest_first,
            file_name,
            file_line,
            exception_name,
            exception_message,
        })
    }

    /// A generic [`Thread`] view for dialect-agnostic code.
    pub fn thread(&self) -> Thread {
        Thread {
            dialect: Dialect::Python,
            frames: self.frames.iter().cloned().map(Frame::Python).collect(),
            name: None,
            is_crash: true,
        }
    }

    /// Short textual rendering.
    pub fn append_to_str(&self, buf: &mut String) {
        use std::fmt::Write as _;
        self.thread().append_to_str(buf);
        if let Some(name) = &self.exception_name {
            let _ = writeln!(buf, "{name}");
        }
    }
}

fn parse_frame_line(line: &str) -> Option<PythonFrame> {
    let mut cursor = Cursor::new(line);
    cursor.skip_run(|c: char| c == ' ');
    if !cursor.parse_string_literal("File \"") {
        return None;
    }
    let mut file_name = String::new();
    cursor.parse_until(|c: char| c == '"', &mut file_name);
    if !cursor.skip_char('"') {
        return None;
    }
    if !cursor.parse_string_literal(", line ") {
        return None;
    }
    let mut file_line = 0u64;
    if !cursor.parse_unsigned_dec(&mut file_line) {
        return None;
    }
    if !cursor.parse_string_literal(", in ") {
        return None;
    }
    let mut function_name = String::new();
    cursor.parse_until(|_: char| false, &mut function_name);

    let is_module = function_name == "<module>";

    Some(PythonFrame {
        file_name,
        file_line: file_line as u32,
        function_name,
        is_module,
        line_contents: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Traceback (most recent call last):\n\
                           \x20 File \"will_crash.py\", line 9, in <module>\n\
                           \x20   main()\n\
                           \x20 File \"will_crash.py\", line 5, in main\n\
                           \x20   raise ValueError(\"oops\")\n\
                           ValueError: oops\n";

    #[test]
    fn parses_sample_traceback() {
        let stacktrace = PythonStacktrace::parse(SAMPLE).unwrap();
        assert_eq!(stacktrace.frames.len(), 2);
        // topmost-first: `main` (the innermost, most recently entered frame)
        assert_eq!(stacktrace.frames[0].function_name, "main");
        assert_eq!(stacktrace.frames[0].file_line, 5);
        assert!(!stacktrace.frames[0].is_module);
        assert_eq!(stacktrace.frames[1].function_name, "<module>");
        assert!(stacktrace.frames[1].is_module);
        // the last frame's file/line are promoted to the stacktrace
        assert_eq!(stacktrace.file_name, "will_crash.py");
        assert_eq!(stacktrace.file_line, 5);
        assert_eq!(stacktrace.exception_name.as_deref(), Some("ValueError"));
        assert_eq!(stacktrace.exception_message.as_deref(), Some("oops"));
    }

    #[test]
    fn rejects_input_without_header() {
        assert!(PythonStacktrace::parse("no traceback here").is_err());
    }

    #[test]
    fn json_round_trip() {
        let stacktrace = PythonStacktrace::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&stacktrace).unwrap();
        let back: PythonStacktrace = serde_json::from_str(&json).unwrap();
        assert_eq!(stacktrace, back);
    }
}
