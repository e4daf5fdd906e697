use serde::{Deserialize, Serialize};

use crate::Dialect;

/// A single name/value pair, used for GDB function arguments and locals.
///
/// Values are kept as opaque text: GDB prints bracketed structures (e.g.
/// `{a = 1, b = 2}`) which the parser preserves verbatim rather than
/// attempting to further structure.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NameValue {
    /// Argument or local variable name.
    pub name: String,
    /// Its printed value, opaque text.
    pub value: String,
}

/// A single frame of a GDB backtrace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GdbFrame {
    /// `#<index>` as printed by GDB.
    pub frame_index: u32,
    /// Function name; `None` is rendered as GDB's own `??`.
    pub function_name: Option<String>,
    /// Declared return/argument type string, when GDB prints one.
    pub function_type: Option<String>,
    /// Instruction address, absent when GDB printed `??`.
    pub address: Option<u64>,
    /// Shared library or executable the address falls within.
    pub library_name: Option<String>,
    /// Source file, if debug info was available.
    pub source_file: Option<String>,
    /// Source line, if debug info was available.
    pub source_line: Option<u32>,
    /// Argument name/value pairs, in source order.
    pub arguments: Vec<NameValue>,
    /// Local variable name/value pairs, absent for `No locals.` frames.
    pub locals: Vec<NameValue>,
}

/// A single frame of a reconstructed or reparsed native coredump.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreFrame {
    /// Absolute instruction address.
    pub address: u64,
    /// Lowercase hex build-id of the owning module, if resolved.
    pub build_id: Option<String>,
    /// `address` minus the module's load address.
    pub build_id_offset: Option<u64>,
    /// Resolved function name, `None` renders as `??`.
    pub function_name: Option<String>,
    /// Source file or, when no debug info exists, the module path.
    pub file_name: Option<String>,
    /// Short textual fingerprint of the function's machine code.
    pub fingerprint: Option<String>,
    /// `true` once `fingerprint` has been replaced by its SHA-1 digest.
    pub fingerprint_hashed: bool,
}

/// A single frame of a CPython traceback.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PythonFrame {
    /// Source file path, as printed after `File "..."`
    pub file_name: String,
    /// Line number within `file_name`.
    pub file_line: u32,
    /// Enclosing function or `<module>` for top-level code.
    pub function_name: String,
    /// `true` when this frame is the top-level module body (`<module>`).
    pub is_module: bool,
    /// The source line's text, if Python printed one beneath the frame.
    pub line_contents: Option<String>,
}

/// A single frame of a Linux kernel oops.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KoopsFrame {
    /// Instruction address as printed in `[<...>]`.
    pub address: u64,
    /// `false` when the oops printed a `?` marker before the function.
    pub reliable: bool,
    /// Function name.
    pub function_name: String,
    /// Offset within the function, in bytes.
    pub function_offset: u64,
    /// Total length of the function, in bytes.
    pub function_length: u64,
    /// Owning kernel module, or `"kernel"` for the base image.
    pub module_name: String,
    /// The same 4-tuple for the `from [<addr>] (func+off/len)` caller, when
    /// the oops printed one.
    pub from: Option<KoopsCaller>,
}

/// The caller-side tuple printed by a kernel oops's `from` annotation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KoopsCaller {
    /// Caller instruction address.
    pub address: u64,
    /// Caller function name.
    pub function_name: String,
    /// Offset within the caller function.
    pub function_offset: u64,
    /// Total length of the caller function.
    pub function_length: u64,
}

/// A single frame of a Java stack trace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JavaFrame {
    /// Fully qualified `class.method` name.
    pub name: String,
    /// Source file, absent for `(Unknown Source)` frames.
    pub file_name: Option<String>,
    /// Source line, absent for `(Unknown Source)`/`(Native Method)` frames.
    pub line: Option<u32>,
    /// Classpath entry from a trailing `~[...]` annotation.
    pub class_path: Option<String>,
    /// `true` for `(Native Method)` frames.
    pub is_native: bool,
}

/// A single frame of a Ruby backtrace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RubyFrame {
    /// Source file path.
    pub file_name: String,
    /// Line within `file_name`.
    pub line: u32,
    /// Function name, with any `rescue in`/`block in`/`<...>` decoration
    /// stripped into the fields below.
    pub function_name: String,
    /// `true` when `funcname` was surrounded by angle brackets (e.g.
    /// `<main>`, `<class:Foo>`).
    pub special_function: bool,
    /// Nesting depth of `block ... in` prefixes (0 if none were present).
    pub block_level: u32,
    /// Number of `rescue in` prefixes.
    pub rescue_level: u32,
}

/// A single frame of a JavaScript stack trace.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsFrame {
    /// Source file or URL.
    pub file_name: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    /// Enclosing function name, `None` for anonymous frames (`at file:l:c`
    /// without a leading `funcname (`).
    pub function_name: Option<String>,
}

/// A frame in one of the seven supported stack-trace dialects.
///
/// See the module docs for why this is a sum type rather than a trait
/// object: dispatch happens through a `match`, not a vtable, and every
/// variant carries exactly the fields its dialect expresses.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// See [`GdbFrame`].
    Gdb(GdbFrame),
    /// See [`CoreFrame`].
    Core(CoreFrame),
    /// See [`PythonFrame`].
    Python(PythonFrame),
    /// See [`KoopsFrame`].
    Koops(KoopsFrame),
    /// See [`JavaFrame`].
    Java(JavaFrame),
    /// See [`RubyFrame`].
    Ruby(RubyFrame),
    /// See [`JsFrame`].
    Js(JsFrame),
}

impl Frame {
    /// The dialect this frame belongs to.
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

    /// The function name used for normalization, fingerprint matching, and
    /// distance metrics.
    ///
    /// Dialects that may lack a resolved name (GDB's `??`, an unresolved
    /// `CoreFrame`) return `"??"`, the canonical unknown-function marker
    /// used by normalization and the distance metrics.
    pub fn function_name(&self) -> &str {
        const UNKNOWN: &str = "??";
        match self {
            Self::Gdb(f) => f.function_name.as_deref().unwrap_or(UNKNOWN),
            Self::Core(f) => f.function_name.as_deref().unwrap_or(UNKNOWN),
            Self::Python(f) => &f.function_name,
            Self::Koops(f) => &f.function_name,
            Self::Java(f) => &f.name,
            Self::Ruby(f) => &f.function_name,
            Self::Js(f) => f.function_name.as_deref().unwrap_or(UNKNOWN),
        }
    }

    /// Sets the function name in place, used by the normalizer's prefix
    /// stripping and renaming passes.
    ///
    /// For dialects where the function is optional, passing `"??"` clears
    /// it back to `None` so round-tripping through [`Frame::function_name`]
    /// stays consistent.
    pub fn set_function_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        let unknown = name == "??";
        match self {
            Self::Gdb(f) => f.function_name = if unknown { None } else { Some(name) },
            Self::Core(f) => f.function_name = if unknown { None } else { Some(name) },
            Self::Python(f) => f.function_name = name,
            Self::Koops(f) => f.function_name = name,
            Self::Java(f) => f.name = name,
            Self::Ruby(f) => f.function_name = name,
            Self::Js(f) => f.function_name = if unknown { None } else { Some(name) },
        }
    }

    /// The file or library name, when this dialect carries one, used by
    /// normalization rules keyed off the owning file (glibc sysdeps
    /// unification, `clone.S`, `malloc.c`, …).
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Gdb(f) => f.source_file.as_deref().or(f.library_name.as_deref()),
            Self::Core(f) => f.file_name.as_deref(),
            Self::Python(f) => Some(&f.file_name),
            Self::Koops(f) => Some(&f.module_name),
            Self::Java(f) => f.file_name.as_deref(),
            Self::Ruby(f) => Some(&f.file_name),
            Self::Js(f) => Some(&f.file_name),
        }
    }

    /// `true` for a frame whose address is 0 and function name is unknown
    /// — the "null dereference" shape removed by the normalizer at the
    /// edges of a thread.
    pub fn is_null_unknown(&self) -> bool {
        match self {
            Self::Gdb(f) => f.address == Some(0) && f.function_name.is_none(),
            Self::Core(f) => f.address == 0 && f.function_name.is_none(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_core_frame_reports_unknown_function() {
        let frame = Frame::Core(CoreFrame::default());
        assert_eq!(frame.function_name(), "??");
        assert!(frame.is_null_unknown());
    }

    #[test]
    fn set_function_name_round_trips() {
        let mut frame = Frame::Gdb(GdbFrame::default());
        frame.set_function_name("crashy");
        assert_eq!(frame.function_name(), "crashy");
        frame.set_function_name("??");
        assert_eq!(frame.function_name(), "??");
        assert!(matches!(frame, Frame::Gdb(GdbFrame { function_name: None, .. })));
    }
}
