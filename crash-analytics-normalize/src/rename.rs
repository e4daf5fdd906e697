use crash_analytics_stacktrace::{Frame, Thread};

const PREFIXES: &[&str] = &["IA__gdk", "IA__gtk", "IA__g", "__GI_"];

/// Strips any of [`PREFIXES`] from the start of each frame's function name.
/// Order matters: the GNOME-specific prefixes are checked before the
/// shorter generic `IA__g`, so `IA__gdk_foo` becomes `foo`, not `dk_foo`.
pub fn strip_known_prefixes(thread: &mut Thread) {
    for frame in &mut thread.frames {
        let name = frame.function_name();
        if let Some(prefix) = PREFIXES.iter().find(|p| name.starts_with(*p)) {
            let stripped = name[prefix.len()..].to_owned();
            frame.set_function_name(stripped);
        }
    }
}

const ARCH_SUFFIXES: &[&str] = &["_sse2_bsf", "_sse2", "_ssse3_rep", "_ssse3_back", "_ssse3", "_sse42", "_ia32"];

const WHITELISTED_FUNCTIONS: &[&str] = &[
    "memchr", "memcmp", "memcpy", "memmove", "memset", "rawmemchr", "strcasecmp", "strcasecmp_l",
    "strcat", "strchr", "strchrnul", "strcmp", "strcpy", "strcspn", "strlen", "strncmp", "strncpy",
    "strpbrk", "strrchr", "strspn", "strstr", "strtok",
];

/// Renames `__FN_sse2`-style glibc multi-arch ifunc resolutions back to
/// their plain `FN` name, when the frame's file is under `/sysdeps/` and
/// its owning library is glibc.
pub fn unify_arch_suffixes(thread: &mut Thread) {
    for frame in &mut thread.frames {
        if !looks_like_glibc_sysdeps(frame) {
            continue;
        }
        let name = frame.function_name().to_owned();
        for base in WHITELISTED_FUNCTIONS {
            for suffix in ARCH_SUFFIXES {
                if name == format!("__{base}{suffix}") {
                    frame.set_function_name(base.to_string());
                }
            }
        }
    }
}

fn looks_like_glibc_sysdeps(frame: &Frame) -> bool {
    let file_looks_right = frame.file_name().map(|f| f.contains("/sysdeps/")).unwrap_or(false);
    let library_looks_right = match frame {
        Frame::Gdb(f) => f
            .library_name
            .as_deref()
            .or(f.source_file.as_deref())
            .map(|s| s.contains("libc"))
            .unwrap_or(false),
        Frame::Core(f) => f.file_name.as_deref().map(|s| s.contains("libc")).unwrap_or(false),
        _ => false,
    };
    file_looks_right && library_looks_right
}
