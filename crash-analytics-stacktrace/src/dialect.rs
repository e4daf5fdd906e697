/// The stack-trace dialect a [`crate::Frame`], [`crate::Thread`] or
/// [`crate::Stacktrace`] belongs to.
///
/// Every frame-typed object carries its dialect tag. Cross-dialect
/// comparisons compare this tag first and fail loudly on mismatch via
/// [`crate::DialectMismatch`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Dialect {
    /// GDB textual backtrace.
    #[default]
    Gdb,
    /// Native coredump.
    Core,
    /// CPython traceback.
    Python,
    /// Linux kernel oops.
    Koops,
    /// Java exception.
    Java,
    /// Ruby backtrace.
    Ruby,
    /// JavaScript stack trace.
    Js,
}

impl Dialect {
    /// The lowercase wire name used in Report JSON's `type` field and by
    /// the `report_*`/stacktrace-kind discriminants.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Gdb => "gdb",
            Self::Core => "core",
            Self::Python => "python",
            Self::Koops => "kerneloops",
            Self::Java => "java",
            Self::Ruby => "ruby",
            Self::Js => "javascript",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}
