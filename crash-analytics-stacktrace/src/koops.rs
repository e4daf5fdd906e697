//! Linux kernel oops parsing and serialization.

use crash_analytics_common::{Cursor, ErrorKind, ParseResult};
use serde::{Deserialize, Serialize};

use crate::frame::{KoopsCaller, KoopsFrame};
use crate::{Dialect, Frame, Thread};

/// One-letter kernel taint codes, mapped to named booleans.
const TAINT_CODES: [(char, &str); 16] = [
    ('P', "proprietary"),
    ('O', "out_of_tree"),
    ('F', "forced_load"),
    ('R', "forced_removal"),
    ('E', "unsigned"),
    ('M', "machine_check"),
    ('B', "bad_page"),
    ('U', "userspace_taint"),
    ('D', "die_recently"),
    ('A', "acpi_overridden"),
    ('W', "warning"),
    ('C', "staging"),
    ('I', "firmware_workaround"),
    ('K', "oot_module"),
    ('S', "unsigned_module"),
    ('L', "soft_lockup"),
];

/// The sixteen named kernel taint booleans.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TaintFlags {
    /// `G`/`P` — a proprietary module was loaded.
    pub proprietary: bool,
    /// `O` — an out-of-tree module was loaded.
    pub out_of_tree: bool,
    /// `F` — a module was force-loaded.
    pub forced_load: bool,
    /// `R` — a module was force-unloaded.
    pub forced_removal: bool,
    /// `E` — an unsigned module was loaded.
    pub unsigned: bool,
    /// `M` — a machine check exception occurred.
    pub machine_check: bool,
    /// `B` — a bad page was referenced.
    pub bad_page: bool,
    /// `U` — taint requested by a userspace application.
    pub userspace_taint: bool,
    /// `D` — the kernel has died recently (panic/oops before this one).
    pub die_recently: bool,
    /// `A` — an ACPI table was overridden.
    pub acpi_overridden: bool,
    /// `W` — a `WARN_ON` was hit previously.
    pub warning: bool,
    /// `C` — a staging driver was loaded.
    pub staging: bool,
    /// `I` — a platform firmware bug workaround was applied.
    pub firmware_workaround: bool,
    /// `K` — an out-of-tree module was loaded (distinct module marker).
    pub oot_module: bool,
    /// `S` — an unsigned module was loaded (distinct from `unsigned`).
    pub unsigned_module: bool,
    /// `L` — a soft lockup occurred.
    pub soft_lockup: bool,
}

impl TaintFlags {
    fn set(&mut self, name: &str, value: bool) {
        match name {
            "proprietary" => self.proprietary = value,
            "out_of_tree" => self.out_of_tree = value,
            "forced_load" => self.forced_load = value,
            "forced_removal" => self.forced_removal = value,
            "unsigned" => self.unsigned = value,
            "machine_check" => self.machine_check = value,
            "bad_page" => self.bad_page = value,
            "userspace_taint" => self.userspace_taint = value,
            "die_recently" => self.die_recently = value,
            "acpi_overridden" => self.acpi_overridden = value,
            "warning" => self.warning = value,
            "staging" => self.staging = value,
            "firmware_workaround" => self.firmware_workaround = value,
            "oot_module" => self.oot_module = value,
            "unsigned_module" => self.unsigned_module = value,
            "soft_lockup" => self.soft_lockup = value,
            _ => unreachable!("exhaustive over TAINT_CODES"),
        }
    }

    /// Parses a `Tainted: ...` value (the text after the colon, e.g.
    /// `G        W  O    4.18.0 #1`), reading only the leading run of
    /// taint letters/dashes.
    fn parse(text: &str) -> TaintFlags {
        let mut flags = TaintFlags::default();
        for c in text.chars() {
            if c.is_whitespace() {
                break;
            }
            if let Some((_, name)) = TAINT_CODES.iter().find(|(code, _)| *code == c) {
                flags.set(name, true);
            }
        }
        flags
    }
}

/// A parsed Linux kernel oops.
///
/// A Koops stacktrace *is* its (single) thread; the frame list lives here
/// directly rather than behind a generic [`Thread`] wrapper.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KoopsStacktrace {
    /// Frames, topmost first.
    pub frames: Vec<KoopsFrame>,
    /// Kernel version string, if a version line was present.
    pub kernel_version: Option<String>,
    /// Taint flags read from a `Tainted:` line.
    pub taint: TaintFlags,
    /// Whitespace-separated modules from `Modules linked in:`.
    pub loaded_modules: Vec<String>,
}

impl KoopsStacktrace {
    /// Parses a kernel oops dump.
    pub fn parse(input: &str) -> ParseResult<KoopsStacktrace> {
        let mut stacktrace = KoopsStacktrace::default();

        for line in input.lines() {
            let line = strip_leading_timestamp(line);

            if let Some(rest) = line.strip_prefix("Tainted:") {
                stacktrace.taint = TaintFlags::parse(rest.trim_start());
                continue;
            }
            if let Some(rest) = line.strip_prefix("Modules linked in:") {
                stacktrace.loaded_modules = rest.split_whitespace().map(str::to_owned).collect();
                continue;
            }
            if looks_like_version_line(line) {
                stacktrace.kernel_version = Some(line.trim().to_owned());
                continue;
            }
            if let Some(frame) = parse_frame_line(line) {
                stacktrace.frames.push(frame);
            }
        }

        if stacktrace.frames.is_empty() {
            return Err(crash_analytics_common::ParseError {
                location: Default::default(),
                kind: ErrorKind::NoContent,
                message: "no koops frame lines found".into(),
            });
        }

        Ok(stacktrace)
    }

    /// A generic [`Thread`] view of this stacktrace's frames, for use by
    /// dialect-agnostic code (the normalizer, distance metrics).
    pub fn thread(&self) -> Thread {
        Thread {
            dialect: Dialect::Koops,
            frames: self.frames.iter().cloned().map(Frame::Koops).collect(),
            name: None,
            is_crash: true,
        }
    }

    /// Short textual rendering: one line per frame.
    pub fn append_to_str(&self, buf: &mut String) {
        self.thread().append_to_str(buf);
    }
}

fn strip_leading_timestamp(line: &str) -> &str {
    let trimmed = line.trim_start();
    let mut cursor = Cursor::new(trimmed);
    if !cursor.skip_char('[') {
        return line;
    }
    cursor.skip_run(|c: char| c.is_whitespace());
    let mut whole = 0u64;
    if !cursor.parse_unsigned_dec(&mut whole) {
        return line;
    }
    if cursor.error().is_some() {
        return line;
    }
    // optional fractional part
    if cursor.skip_char('.') {
        let mut frac = 0u64;
        cursor.parse_unsigned_dec(&mut frac);
    }
    cursor.skip_run(|c: char| c.is_whitespace());
    if !cursor.skip_char(']') {
        return line;
    }
    cursor.rest().trim_start()
}

fn looks_like_version_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("Linux version")
}

fn parse_frame_line(line: &str) -> Option<KoopsFrame> {
    let mut cursor = Cursor::new(line.trim_start());
    if !cursor.skip_char('[') || !cursor.skip_char('<') {
        return None;
    }
    let mut address = 0u64;
    if !cursor.parse_unsigned_hex(&mut address, false) {
        return None;
    }
    if !cursor.skip_char('>') || !cursor.skip_char(']') {
        return None;
    }
    cursor.skip_run(|c: char| c == ' ');

    let reliable = !cursor.skip_char('?');
    cursor.skip_run(|c: char| c == ' ');

    let (function_name, function_offset, function_length) = parse_func_off_len(&mut cursor)?;

    cursor.skip_run(|c: char| c == ' ');
    let module_name = if cursor.skip_char('[') {
        let mut name = String::new();
        cursor.parse_until(|c: char| c == ']', &mut name);
        cursor.skip_char(']');
        name
    } else {
        "kernel".to_owned()
    };

    cursor.skip_run(|c: char| c == ' ');
    let from = if cursor.parse_string_literal("from [<") {
        let mut caller_addr = 0u64;
        cursor.parse_unsigned_hex(&mut caller_addr, false);
        cursor.skip_char('>');
        cursor.skip_char(']');
        cursor.skip_run(|c: char| c == ' ');
        cursor.skip_char('(');
        let (name, off, len) = parse_func_off_len(&mut cursor)?;
        cursor.skip_char(')');
        Some(KoopsCaller {
            address: caller_addr,
            function_name: name,
            function_offset: off,
            function_length: len,
        })
    } else {
        None
    };

    Some(KoopsFrame {
        address,
        reliable,
        function_name,
        function_offset,
        function_length,
        module_name,
        from,
    })
}

/// Parses `funcname+0xOFF/0xLEN`.
fn parse_func_off_len(cursor: &mut Cursor<'_>) -> Option<(String, u64, u64)> {
    let mut name = String::new();
    cursor.parse_until(|c: char| c == '+', &mut name);
    if name.is_empty() || !cursor.skip_char('+') {
        return None;
    }
    let mut offset = 0u64;
    if !cursor.parse_unsigned_hex(&mut offset, true) {
        return None;
    }
    if !cursor.skip_char('/') {
        return None;
    }
    let mut length = 0u64;
    if !cursor.parse_unsigned_hex(&mut length, true) {
        return None;
    }
    Some((name, offset, length))
}
