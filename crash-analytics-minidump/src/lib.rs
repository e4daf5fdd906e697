//! Drives native-thread reconstruction from a coredump and its executable
//! into a symbolicated [`crash_analytics_stacktrace::core::CoreStacktrace`].
//!
//! This crate does not parse ELF or link an unwind library itself — per the
//! driver contract, it consumes already-resolved [`segment::Segment`]s and
//! an externally-supplied [`cursor::UnwindCursor`] per thread, the same way
//! the rest of this workspace treats the object-file/unwind binding layer
//! as an assumed collaborator rather than something to reimplement.

#![warn(missing_docs)]

mod cursor;
mod driver;
mod segment;

pub use cursor::{ProcedureInfo, ProcedureResolver, StepOutcome, UnwindCursor};
pub use driver::{unwind, CoreHeader, FrameExtent, UnwindConfig, UnwindError, UnwindInput, UnwindOutcome};
pub use segment::{AddressInfo, Segment, SegmentTable};
