//! Native coredump stack traces, either reconstructed by the unwinder or
//! reparsed from the Core JSON wire format:
//!
//! ```json
//! {
//!   "signal": 11,
//!   "executable": "/usr/bin/crashy",
//!   "stacktrace": [
//!     { "crash_thread": true,
//!       "frames": [
//!         { "address": 4321, "build_id": "ab12...", "build_id_offset": 16,
//!           "function_name": "main", "file_name": "main.c",
//!           "fingerprint": "...", "fingerprint_hashed": false }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crash_analytics_common::ErrorKind;

use crate::frame::CoreFrame;
use crate::{Dialect, Frame, Thread};

fn is_false(b: &bool) -> bool {
    !*b
}

/// A single native thread as it appears in Core JSON: a frame list plus a
/// marker for whether this was the thread executing at the moment of the
/// signal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreThread {
    /// `true` if this thread raised the fatal signal.
    #[serde(default, skip_serializing_if = "is_false")]
    pub crash_thread: bool,
    /// Frames, topmost first.
    pub frames: Vec<CoreFrame>,
}

/// A parsed or reconstructed native coredump.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreStacktrace {
    /// Fatal signal number (e.g. 11 for `SIGSEGV`).
    pub signal: u16,
    /// Path to the crashing executable.
    pub executable: String,
    /// `true` when the unwinder reconstructed only the faulting thread
    /// instead of every thread in the process.
    #[serde(default, skip_serializing_if = "is_false")]
    pub only_crash_thread: bool,
    /// One entry per thread captured. When the unwinder only reconstructed
    /// the crash thread, this has length 1.
    pub stacktrace: Vec<CoreThread>,
}

impl CoreStacktrace {
    /// Parses a Core JSON document.
    pub fn parse(input: &str) -> Result<CoreStacktrace, crash_analytics_common::ParseError> {
        serde_json::from_str(input).map_err(|e| crash_analytics_common::ParseError {
            location: Default::default(),
            kind: ErrorKind::MalformedRecord,
            message: e.to_string(),
        })
    }

    /// This dump's threads, as generic [`Thread`] values.
    pub fn threads(&self) -> Vec<Thread> {
        self.stacktrace
            .iter()
            .map(|t| Thread {
                dialect: Dialect::Core,
                frames: t.frames.iter().cloned().map(Frame::Core).collect(),
                name: None,
                is_crash: t.crash_thread,
            })
            .collect()
    }

    /// The thread marked `crash_thread: true`, if recorded; otherwise the
    /// lone thread when exactly one is present.
    pub fn crash_thread(&self) -> Option<Thread> {
        let threads = self.threads();
        threads
            .iter()
            .find(|t| t.is_crash)
            .cloned()
            .or_else(|| if threads.len() == 1 { threads.into_iter().next() } else { None })
    }

    /// Short textual rendering of the crash thread (or the first thread).
    pub fn append_to_str(&self, buf: &mut String) {
        if let Some(thread) = self.crash_thread().or_else(|| self.threads().into_iter().next()) {
            thread.append_to_str(buf);
        }
    }
}
