use crate::error::DialectMismatch;
use crate::{Dialect, Frame};

/// An ordered sequence of frames belonging to one execution thread,
/// topmost (innermost) frame first.
///
/// For single-threaded dialects (Python, Koops, Ruby, JS) the enclosing
/// [`crate::Stacktrace`] wraps exactly one `Thread`; for GDB, Core and Java
/// it owns a `Vec<Thread>`. This type is the one generic code (normalizer,
/// distance metrics, clusterer) actually operates on — every variant stores
/// the same shape (a dialect tag plus a frame list), so it dispatches as an
/// ordinary struct rather than needing a vtable or set of function
/// pointers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Thread {
    /// The dialect every frame in `frames` belongs to.
    pub dialect: Dialect,
    /// Frames, topmost first. Never empty once parsed from a non-skeletal
    /// report; may be empty transiently during normalization.
    pub frames: Vec<Frame>,
    /// Thread name or number, when the dialect prints one (e.g. GDB's
    /// `Thread 3 (LWP 1234)`, Java's `"main"`).
    pub name: Option<String>,
    /// `true` if this is the thread that was executing when the program
    /// crashed.
    pub is_crash: bool,
}

impl Thread {
    /// Creates an empty thread for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Thread {
            dialect,
            frames: Vec::new(),
            name: None,
            is_crash: false,
        }
    }

    /// This thread's frames, topmost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Compares two threads for equality, requiring a matching dialect.
    ///
    /// Returns [`DialectMismatch`] rather than silently returning `false`
    /// when dialects differ.
    pub fn cmp_dialect(&self, other: &Thread) -> Result<bool, DialectMismatch> {
        if self.dialect != other.dialect {
            return Err(DialectMismatch {
                left: self.dialect,
                right: other.dialect,
            });
        }
        Ok(self == other)
    }

    /// Appends a short, single-line-per-frame rendering of this thread to
    /// `buf`.
    pub fn append_to_str(&self, buf: &mut String) {
        use std::fmt::Write as _;
        if let Some(name) = &self.name {
            let _ = writeln!(buf, "Thread {name}");
        }
        for frame in &self.frames {
            let _ = writeln!(buf, "  {}", frame.function_name());
        }
    }

    /// A deep copy of this thread. `Clone` already does this; `dup` exists
    /// as an explicitly named alias for callers that want to make the copy
    /// visible at the call site.
    pub fn dup(&self) -> Thread {
        self.clone()
    }

    /// The multiset of function names in this thread, used by the Jaccard
    /// distance metric.
    pub fn function_name_multiset(&self) -> Vec<&str> {
        self.frames.iter().map(Frame::function_name).collect()
    }
}
