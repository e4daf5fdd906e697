use crash_analytics_stacktrace::{Frame, Thread};

/// Library/file hints treated as "present" when the frame carries no such
/// information at all — absence is not evidence against a match.
fn file_or_library_contains(frame: &Frame, needle: &str) -> bool {
    let hint = match frame {
        Frame::Gdb(f) => f.library_name.as_deref().or(f.source_file.as_deref()),
        Frame::Core(f) => f.file_name.as_deref(),
        _ => return true,
    };
    match hint {
        Some(s) => s.contains(needle),
        None => true,
    }
}

fn is_always_removable(frame: &Frame) -> bool {
    match frame.function_name() {
        "_start" | "main" => true,
        "__libc_start_main" => file_or_library_contains(frame, "libc"),
        "clone" => file_or_library_contains(frame, "clone.S") || file_or_library_contains(frame, "libc"),
        "start_thread" => {
            file_or_library_contains(frame, "pthread_create.c") || file_or_library_contains(frame, "libpthread")
        }
        _ => false,
    }
}

/// Drops frames matching the fixed set of always-noise function names:
/// `_start`, `__libc_start_main`, `clone`, `start_thread`, `main`.
pub fn remove_always_removable(thread: &mut Thread) {
    thread.frames.retain(|frame| !is_always_removable(frame));
}

const NOISE_WITH_ABOVE: &[&str] = &[
    "_int_malloc",
    "_int_free",
    "malloc_consolidate",
    "sysmalloc",
    "g_log",
    "g_logv",
    "g_logv_valist",
    "g_assertion_message",
    "g_assertion_message_expr",
    "g_assertion_message_cmpnum",
    "g_closure_invoke",
    "g_signal_emit",
    "g_signal_emit_valist",
    "g_main_dispatch",
    "g_main_context_dispatch",
];

/// Drops the deepest frame matching one of [`NOISE_WITH_ABOVE`], along with
/// every frame above it (allocator internals and GLib dispatch helpers are
/// never themselves the crash site, and the frames calling into them are
/// uninteresting library plumbing too).
pub fn remove_noise_with_above(thread: &mut Thread) {
    let deepest_match = thread
        .frames
        .iter()
        .enumerate()
        .filter(|(_, frame)| NOISE_WITH_ABOVE.contains(&frame.function_name()))
        .map(|(idx, _)| idx)
        .max();

    if let Some(idx) = deepest_match {
        thread.frames.drain(..=idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_analytics_stacktrace::{Dialect, GdbFrame};

    fn frame(name: &str) -> Frame {
        Frame::Gdb(GdbFrame {
            function_name: Some(name.to_owned()),
            ..Default::default()
        })
    }

    #[test]
    fn removes_start_and_main() {
        let mut thread = Thread {
            dialect: Dialect::Gdb,
            frames: vec![frame("crashy"), frame("main"), frame("__libc_start_main"), frame("_start")],
            name: None,
            is_crash: true,
        };
        remove_always_removable(&mut thread);
        let names: Vec<&str> = thread.frames.iter().map(Frame::function_name).collect();
        assert_eq!(names, vec!["crashy"]);
    }

    #[test]
    fn noise_helper_discards_everything_above_it() {
        let mut thread = Thread {
            dialect: Dialect::Gdb,
            frames: vec![frame("warn_helper"), frame("g_log"), frame("crashy")],
            name: None,
            is_crash: true,
        };
        remove_noise_with_above(&mut thread);
        let names: Vec<&str> = thread.frames.iter().map(Frame::function_name).collect();
        assert_eq!(names, vec!["crashy"]);
    }
}
