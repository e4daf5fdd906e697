//! Java exception and `Caused by:` chain parsing.
//!
//! A Java stack trace is a chain of exceptions, each with its own class
//! name, optional message and frame list:
//!
//! ```text
//! java.lang.RuntimeException: boom
//!     at com.example.Main.run(Main.java:42)
//!     at com.example.Main.main(Main.java:10)
//! Caused by: java.lang.NullPointerException
//!     at com.example.Helper.get(Helper.java:7)
//!     ... 3 more
//! ```
//!
//! Each exception in the chain becomes one [`Thread`], ordered outermost
//! (the original exception) first.

use crash_analytics_common::ErrorKind;

use crate::frame::JavaFrame;
use crate::{Dialect, Frame, Thread};

/// A parsed Java exception, possibly with a `Caused by:` chain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JavaStacktrace {
    /// One thread per exception in the chain, outermost first.
    pub threads: Vec<Thread>,
    /// The fully qualified exception class name for each chain entry, in
    /// the same order as `threads`.
    pub exception_classes: Vec<String>,
    /// The exception message for each chain entry (`None` when the header
    /// line had no `: message` suffix).
    pub exception_messages: Vec<Option<String>>,
}

impl JavaStacktrace {
    /// The thread whose exception caused the crash — the deepest entry in
    /// the `Caused by:` chain.
    pub fn crash_thread(&self) -> Option<&Thread> {
        self.threads.last()
    }

    /// Parses a Java exception dump.
    pub fn parse(input: &str) -> crash_analytics_common::ParseResult<JavaStacktrace> {
        let mut threads = Vec::new();
        let mut exception_classes = Vec::new();
        let mut exception_messages = Vec::new();
        let mut current: Option<Thread> = None;

        for line in input.lines() {
            let trimmed = line.trim_start();

            if let Some(rest) = trimmed.strip_prefix("Caused by: ") {
                if let Some(thread) = current.take() {
                    threads.push(thread);
                }
                let (class, message) = split_header(rest);
                exception_classes.push(class);
                exception_messages.push(message);
                let mut thread = Thread::new(Dialect::Java);
                thread.is_crash = true;
                current = Some(thread);
                continue;
            }

            if let Some(frame) = parse_frame_line(trimmed) {
                if let Some(thread) = current.as_mut() {
                    thread.frames.push(Frame::Java(frame));
                }
                continue;
            }

            if trimmed.starts_with("... ") && trimmed.ends_with(" more") {
                // Elided frames shared with the enclosing exception; nothing
                // further to record.
                continue;
            }

            if current.is_none() && !trimmed.is_empty() {
                let (thread_name, rest) = strip_thread_prefix(trimmed);
                let (class, message) = split_header(rest);
                exception_classes.push(class);
                exception_messages.push(message);
                let mut thread = Thread::new(Dialect::Java);
                thread.name = thread_name;
                current = Some(thread);
            }
        }

        if let Some(thread) = current.take() {
            threads.push(thread);
        }

        if threads.is_empty() {
            return Err(crash_analytics_common::ParseError {
                location: Default::default(),
                kind: ErrorKind::NoContent,
                message: "no java exception header found".into(),
            });
        }

        if let Some(last) = threads.last_mut() {
            last.is_crash = true;
        }
        for thread in threads.iter_mut().rev().skip(1) {
            thread.is_crash = false;
        }

        Ok(JavaStacktrace {
            threads,
            exception_classes,
            exception_messages,
        })
    }

    /// Short textual rendering of the deepest (crash) exception's frames.
    pub fn append_to_str(&self, buf: &mut String) {
        if let Some(thread) = self.crash_thread() {
            thread.append_to_str(buf);
        }
    }
}

fn split_header(line: &str) -> (String, Option<String>) {
    match line.split_once(": ") {
        Some((class, message)) => (class.to_owned(), Some(message.to_owned())),
        None => (line.to_owned(), None),
    }
}

/// Strips a `Exception in thread "<name>" ` prefix from the uncaught-exception
/// header line, if present, returning the thread name and the remainder to
/// hand to [`split_header`].
fn strip_thread_prefix(line: &str) -> (Option<String>, &str) {
    if let Some(rest) = line.strip_prefix("Exception in thread \"") {
        if let Some(end) = rest.find('"') {
            let name = rest[..end].to_owned();
            let remainder = rest[end + 1..].trim_start();
            return (Some(name), remainder);
        }
    }
    (None, line)
}

fn parse_frame_line(line: &str) -> Option<JavaFrame> {
    let rest = line.strip_prefix("at ")?;
    let open = rest.find('(')?;
    if !rest.ends_with(')') {
        return None;
    }
    let name = rest[..open].to_owned();
    let location = &rest[open + 1..rest.len() - 1];

    if location == "Native Method" {
        return Some(JavaFrame {
            name,
            file_name: None,
            line: None,
            class_path: None,
            is_native: true,
        });
    }

    let (location, class_path) = match location.split_once(" ~[") {
        Some((loc, tail)) => (loc, tail.strip_suffix(']').map(str::to_owned)),
        None => match location.split_once(" [") {
            Some((loc, tail)) => (loc, tail.strip_suffix(']').map(str::to_owned)),
            None => (location, None),
        },
    };

    if location == "Unknown Source" {
        return Some(JavaFrame {
            name,
            file_name: None,
            line: None,
            class_path,
            is_native: false,
        });
    }

    let (file_name, line_no) = match location.rsplit_once(':') {
        Some((file, line_str)) => (Some(file.to_owned()), line_str.parse().ok()),
        None => (Some(location.to_owned()), None),
    };

    Some(JavaFrame {
        name,
        file_name,
        line: line_no,
        class_path,
        is_native: false,
    })
}
