//! GDB textual backtrace parsing.
//!
//! Recognizes blocks starting with `Thread N (...)` or
//! `#idx 0xADDR in function (args) at file:line`.

use crash_analytics_common::{Cursor, ErrorKind, ParseResult};

use crate::frame::{GdbFrame, NameValue};
use crate::sharedlib::{SharedLib, SharedLibMap};
use crate::{Dialect, Frame, Thread};

/// A parsed GDB backtrace, possibly covering several threads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GdbStacktrace {
    /// One thread per `Thread N (...)` block, or a single synthetic thread
    /// if the input had no thread headers at all.
    pub threads: Vec<Thread>,
    /// Index into `threads` of the thread GDB had selected when the
    /// backtrace was taken, if recorded.
    pub crash_thread: Option<usize>,
    /// The `info sharedlibrary` table, if present.
    pub sharedlibs: SharedLibMap,
}

impl GdbStacktrace {
    /// The crash (currently selected) thread, if recorded.
    pub fn crash_thread(&self) -> Option<&Thread> {
        self.crash_thread.and_then(|i| self.threads.get(i))
    }

    /// Parses a GDB `bt`/`thread apply all bt` transcript.
    pub fn parse(input: &str) -> ParseResult<GdbStacktrace> {
        let mut threads: Vec<Thread> = Vec::new();
        let mut sharedlibs = SharedLibMap::new();
        let mut current: Option<Thread> = None;
        let mut pending_frame: Option<GdbFrame> = None;

        macro_rules! flush_frame {
            () => {
                if let Some(frame) = pending_frame.take() {
                    if let Some(thread) = current.as_mut() {
                        thread.frames.push(Frame::Gdb(frame));
                    }
                }
            };
        }

        for raw_line in input.lines() {
            if let Some(lib) = parse_sharedlib_line(raw_line) {
                sharedlibs.push(lib);
                continue;
            }

            if let Some(name) = parse_thread_header(raw_line) {
                flush_frame!();
                if let Some(thread) = current.take() {
                    threads.push(thread);
                }
                let mut thread = Thread::new(Dialect::Gdb);
                thread.name = Some(name);
                current = Some(thread);
                continue;
            }

            if let Some(frame) = parse_frame_line(raw_line) {
                flush_frame!();
                pending_frame = Some(frame);
                continue;
            }

            if raw_line.trim() == "No locals." {
                continue;
            }

            if let Some((name, value)) = parse_local_line(raw_line) {
                if let Some(frame) = pending_frame.as_mut() {
                    frame.locals.push(NameValue { name, value });
                }
            }
        }

        flush_frame!();
        if let Some(thread) = current.take() {
            threads.push(thread);
        }

        if threads.is_empty() {
            return Err(crash_analytics_common::ParseError {
                location: Default::default(),
                kind: ErrorKind::NoContent,
                message: "no gdb frames found".into(),
            });
        }

        Ok(GdbStacktrace {
            threads,
            crash_thread: Some(0),
            sharedlibs,
        })
    }

    /// Short textual rendering: one line per frame of the crash thread (or
    /// the first thread, if none is marked).
    pub fn append_to_str(&self, buf: &mut String) {
        if let Some(thread) = self.crash_thread().or_else(|| self.threads.first()) {
            thread.append_to_str(buf);
        }
    }
}

fn parse_thread_header(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix("Thread ")?;
    Some(format!("Thread {rest}"))
}

fn parse_frame_line(line: &str) -> Option<GdbFrame> {
    let trimmed = line.trim_start();
    let mut cursor = Cursor::new(trimmed);
    if !cursor.skip_char('#') {
        return None;
    }
    let mut index = 0u64;
    if !cursor.parse_unsigned_dec(&mut index) {
        return None;
    }
    cursor.skip_run(|c: char| c == ' ');

    let address = if cursor.rest().starts_with("0x") {
        let mut addr = 0u64;
        cursor.parse_unsigned_hex(&mut addr, true);
        cursor.skip_run(|c: char| c == ' ');
        cursor.parse_string_literal("in ");
        cursor.skip_run(|c: char| c == ' ');
        Some(addr)
    } else {
        None
    };

    // Function name runs up to " (" (start of arg list), " at " or " from ".
    let rest = cursor.rest();
    let func_end = rest.find(" (").unwrap_or(rest.len());
    let function_name = rest[..func_end].trim().to_owned();
    let mut remainder = &rest[func_end..];

    let mut arguments = Vec::new();
    if let Some(stripped) = remainder.strip_prefix(" (") {
        if let Some(close) = find_matching_paren(stripped) {
            let arg_text = &stripped[..close];
            arguments = parse_arg_list(arg_text);
            remainder = &stripped[close + 1..];
        }
    }

    let mut source_file = None;
    let mut source_line = None;
    let mut library_name = None;

    if let Some(at_pos) = remainder.find(" at ") {
        let loc = &remainder[at_pos + 4..];
        if let Some((file, line_str)) = loc.rsplit_once(':') {
            source_file = Some(file.trim().to_owned());
            source_line = line_str.trim().parse().ok();
        }
    } else if let Some(from_pos) = remainder.find(" from ") {
        library_name = Some(remainder[from_pos + 6..].trim().to_owned());
    }

    let function_name = if function_name.is_empty() || function_name == "??" {
        None
    } else {
        Some(function_name)
    };

    Some(GdbFrame {
        frame_index: index as u32,
        function_name,
        function_type: None,
        address,
        library_name,
        source_file,
        source_line,
        arguments,
        locals: Vec::new(),
    })
}

fn find_matching_paren(s: &str) -> Option<usize> {
    let mut depth = 1i32;
    for (idx, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_arg_list(text: &str) -> Vec<NameValue> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '{' | '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            '}' | ')' | ']' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                push_arg(&mut out, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        push_arg(&mut out, &current);
    }
    out
}

fn push_arg(out: &mut Vec<NameValue>, text: &str) {
    let text = text.trim();
    if let Some((name, value)) = text.split_once('=') {
        out.push(NameValue {
            name: name.trim().to_owned(),
            value: value.trim().to_owned(),
        });
    } else if !text.is_empty() {
        out.push(NameValue {
            name: String::new(),
            value: text.to_owned(),
        });
    }
}

fn parse_local_line(line: &str) -> Option<(String, String)> {
    if !line.starts_with("        ") && !line.starts_with('\t') {
        return None;
    }
    let trimmed = line.trim();
    trimmed
        .split_once(" = ")
        .map(|(n, v)| (n.trim().to_owned(), v.trim().to_owned()))
}

fn parse_sharedlib_line(line: &str) -> Option<SharedLib> {
    let mut cursor = Cursor::new(line.trim_start());
    if !cursor.parse_string_literal("0x") {
        return None;
    }
    let mut from = 0u64;
    if !cursor.parse_unsigned_hex(&mut from, false) {
        return None;
    }
    cursor.skip_run(|c: char| c == ' ');
    if !cursor.parse_string_literal("0x") {
        return None;
    }
    let mut to = 0u64;
    if !cursor.parse_unsigned_hex(&mut to, false) {
        return None;
    }
    cursor.skip_run(|c: char| c == ' ');

    let rest = cursor.rest().trim_start();
    let symbols_read = if let Some(r) = rest.strip_prefix("Yes") {
        cursor_advance(&mut cursor, rest.len() - r.len());
        true
    } else if let Some(r) = rest.strip_prefix("No") {
        cursor_advance(&mut cursor, rest.len() - r.len());
        false
    } else {
        return None;
    };

    let path = cursor.rest().trim().trim_start_matches('*').trim().to_owned();
    if path.is_empty() {
        return None;
    }

    Some(SharedLib {
        from,
        to,
        symbols_read,
        path,
    })
}

fn cursor_advance(cursor: &mut Cursor<'_>, n: usize) {
    for _ in 0..n {
        cursor.skip_one_of(|_: char| true);
    }
}
