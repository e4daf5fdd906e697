//! `crash-analytics` ingests crash artifacts produced on a Linux host —
//! native coredumps, kernel oopses, and Python, Java, Ruby and JavaScript
//! tracebacks — and turns them into a compact, anonymized, clusterable
//! Report.
//!
//! It is a thin umbrella over several independent crates, each usable on
//! its own:
//!
//! - [`common`] — location-aware text scanning primitives and the shared
//!   `ParseError` type every dialect parser returns.
//! - **`stacktrace`** (default): the polymorphic frame/thread data model and
//!   the seven dialect parsers ([`stacktrace`]).
//! - **`normalize`** (default): the normalization pipeline that collapses
//!   incidental variation between two occurrences of the same bug
//!   ([`normalize`]).
//! - **`cfi`**: call-graph construction and machine-code fingerprinting for
//!   frames whose symbols have been stripped ([`cfi`]).
//! - **`symcache`**: resolves addresses against an `eu-unstrip`-style module
//!   table ([`symcache`]).
//! - **`minidump`**: drives native-thread reconstruction from a coredump
//!   ([`minidump`]).
//! - **`cluster`**: thread-distance metrics and hierarchical clustering over
//!   a crash corpus ([`cluster`]).
//! - **`report`**: the Report envelope joining a stacktrace with OS and
//!   package context, serialized to JSON ([`report`]).

#![warn(missing_docs)]

#[doc(inline)]
pub use crash_analytics_common as common;

#[doc(inline)]
#[cfg(feature = "cfi")]
pub use crash_analytics_cfi as cfi;
#[doc(inline)]
#[cfg(feature = "cluster")]
pub use crash_analytics_cluster as cluster;
#[doc(inline)]
#[cfg(feature = "minidump")]
pub use crash_analytics_minidump as minidump;
#[doc(inline)]
#[cfg(feature = "normalize")]
pub use crash_analytics_normalize as normalize;
#[doc(inline)]
#[cfg(feature = "report")]
pub use crash_analytics_report as report;
#[doc(inline)]
#[cfg(feature = "stacktrace")]
pub use crash_analytics_stacktrace as stacktrace;
#[doc(inline)]
#[cfg(feature = "symcache")]
pub use crash_analytics_symcache as symcache;
