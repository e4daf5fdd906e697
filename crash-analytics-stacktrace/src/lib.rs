//! The polymorphic stack-trace data model and per-dialect parsers, JSON
//! (de)serializers and short-text renderers.
//!
//! Seven dialects are supported: GDB, Core (native coredump JSON), Python,
//! kernel oops ("Koops"), Java, Ruby and JavaScript. Each is represented as
//! a sum type rather than a virtual base plus subclasses. Generic code that
//! needs to treat any dialect uniformly — the normalizer, the distance
//! metrics, the report envelope — works against [`Frame`], [`Thread`] and
//! [`Stacktrace`].

#![warn(missing_docs)]

mod dialect;
mod error;
mod frame;
mod sharedlib;
mod thread;

pub mod gdb;
pub mod core;
pub mod java;
pub mod js;
pub mod koops;
pub mod python;
pub mod ruby;

pub use dialect::Dialect;
pub use error::DialectMismatch;
pub use frame::{CoreFrame, Frame, GdbFrame, JavaFrame, JsFrame, KoopsFrame, PythonFrame, RubyFrame};
pub use sharedlib::{SharedLib, SharedLibMap, SymbolStatus};
pub use thread::Thread;

use core::CoreStacktrace;
use gdb::GdbStacktrace;
use java::JavaStacktrace;
use js::JsStacktrace;
use koops::KoopsStacktrace;
use python::PythonStacktrace;
use ruby::RubyStacktrace;

/// A parsed stack trace in one of the seven supported dialects.
///
/// Owns its threads (and, transitively, its frames); duplication is
/// explicit via `Clone` and always deep.
#[derive(Clone, Debug, PartialEq)]
pub enum Stacktrace {
    /// A GDB `bt`/`thread apply all bt` transcript.
    Gdb(GdbStacktrace),
    /// A native coredump, reconstructed or reparsed from Core JSON.
    Core(CoreStacktrace),
    /// A CPython traceback.
    Python(PythonStacktrace),
    /// A Linux kernel oops.
    Koops(KoopsStacktrace),
    /// A Java exception with its `Caused by:` chain.
    Java(JavaStacktrace),
    /// A Ruby backtrace.
    Ruby(RubyStacktrace),
    /// A JavaScript (V8/Node) stack trace.
    Js(JsStacktrace),
}

impl Stacktrace {
    /// The dialect this stacktrace was parsed as.
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Gdb(_) => Dialect::Gdb,
            Self::Core(_) => Dialect::Core,
            Self::Python(_) => Dialect::Python,
            Self::Koops(_) => Dialect::Koops,
            Self::Java(_) => Dialect::Java,
            Self::Ruby(_) => Dialect::Ruby,
            Self::Js(_) => Dialect::Js,
        }
    }

    /// All threads in this stacktrace, topmost-frame-first within each
    /// thread.
    ///
    /// Single-thread dialects (Python, Koops, Ruby, JS) yield exactly one
    /// thread — for those, the stacktrace object *is* the thread. Those are
    /// synthesized on demand from the dialect's native frame list, since
    /// only the multi-thread dialects (GDB, Core, Java) store a generic
    /// [`Thread`] directly.
    pub fn threads(&self) -> Vec<Thread> {
        match self {
            Self::Gdb(s) => s.threads.clone(),
            Self::Core(s) => s.threads.clone(),
            Self::Python(s) => vec![s.thread()],
            Self::Koops(s) => vec![s.thread()],
            Self::Java(s) => s.threads.clone(),
            Self::Ruby(s) => vec![s.thread()],
            Self::Js(s) => vec![s.thread()],
        }
    }

    /// The thread that was executing at the moment of the crash, if the
    /// dialect records one (this may be absent).
    pub fn crash_thread(&self) -> Option<Thread> {
        match self {
            Self::Gdb(s) => s.crash_thread().cloned(),
            Self::Core(s) => s.crash_thread().cloned(),
            Self::Python(s) => Some(s.thread()),
            Self::Koops(s) => Some(s.thread()),
            Self::Java(s) => s.crash_thread().cloned(),
            Self::Ruby(s) => Some(s.thread()),
            Self::Js(s) => Some(s.thread()),
        }
    }

    /// Renders a short, human-readable summary (one or two lines), the
    /// dialect-specific analogue of a one-line exception summary.
    pub fn to_short_text(&self) -> String {
        let mut buf = String::new();
        match self {
            Self::Gdb(s) => s.append_to_str(&mut buf),
            Self::Core(s) => s.append_to_str(&mut buf),
            Self::Python(s) => s.append_to_str(&mut buf),
            Self::Koops(s) => s.append_to_str(&mut buf),
            Self::Java(s) => s.append_to_str(&mut buf),
            Self::Ruby(s) => s.append_to_str(&mut buf),
            Self::Js(s) => s.append_to_str(&mut buf),
        }
        buf
    }
}
