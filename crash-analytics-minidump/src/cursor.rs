//! Abstractions over the unwind library itself.
//!
//! This crate never links an unwinder directly — it drives whatever cursor
//! the binding layer hands it, one step at a time, and resolves each
//! instruction pointer through the [`crate::segment::SegmentTable`] and a
//! [`ProcedureResolver`].

/// What stepping a cursor one frame produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// The cursor moved to a new frame with this instruction pointer.
    Frame(u64),
    /// Unwinding reached the end of the call stack.
    Done,
}

/// A single thread's unwind cursor, stepped one frame at a time.
///
/// Implementations wrap whatever native unwind library the binding layer
/// links (e.g. libunwind's `_UCD_*`/`unw_step` family); this trait only
/// names the two operations the driver needs.
pub trait UnwindCursor {
    /// Advances to the next (caller) frame.
    ///
    /// Returns `Err` if the underlying library reports a step failure; the
    /// driver treats this as "no more frames", not necessarily fatal.
    fn step(&mut self) -> Result<StepOutcome, String>;
}

/// What is known about the function containing a given address.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcedureInfo {
    /// The function's symbol name, if resolvable.
    pub function_name: Option<String>,
    /// Address the function begins at.
    pub initial_loc: u64,
    /// Length of the function body, in bytes.
    pub length: u64,
}

/// Resolves an instruction pointer to the procedure (function) containing
/// it.
///
/// Backed by whatever symbol table or debug info the binding layer has
/// loaded; this crate only consumes the result.
pub trait ProcedureResolver {
    /// Looks up the procedure containing `ip`, if any is known.
    fn resolve(&self, ip: u64) -> Option<ProcedureInfo>;
}
