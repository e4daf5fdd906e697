use crash_analytics_stacktrace::{Dialect, Thread};

const EXIT_FUNCTIONS: &[&str] = &[
    "__run_exit_handlers",
    "raise",
    "__GI_raise",
    "exit",
    "abort",
    "__GI_abort",
    "__chk_fail",
    "__stack_chk_fail",
    "do_exit",
    "kill",
];

/// Removes the deepest frame whose function is one of the known
/// exit/signal-raising helpers, along with every frame above it (the
/// shallower frames that led into it). Only applies to GDB and Core
/// threads, the two dialects where this noise actually shows up.
pub fn trim_exit_frames(thread: &mut Thread) {
    if !matches!(thread.dialect, Dialect::Gdb | Dialect::Core) {
        return;
    }

    let deepest_match = thread
        .frames
        .iter()
        .enumerate()
        .filter(|(_, frame)| EXIT_FUNCTIONS.contains(&frame.function_name()))
        .map(|(idx, _)| idx)
        .max();

    if let Some(idx) = deepest_match {
        thread.frames.drain(..=idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_analytics_stacktrace::{Frame, GdbFrame};

    fn frame(name: &str) -> Frame {
        Frame::Gdb(GdbFrame {
            function_name: Some(name.to_owned()),
            ..Default::default()
        })
    }

    #[test]
    fn keeps_deepest_match_as_boundary() {
        let mut thread = Thread {
            dialect: Dialect::Gdb,
            frames: vec![frame("raise"), frame("abort"), frame("crashy"), frame("main")],
            name: None,
            is_crash: true,
        };
        trim_exit_frames(&mut thread);
        let names: Vec<&str> = thread.frames.iter().map(Frame::function_name).collect();
        assert_eq!(names, vec!["crashy", "main"]);
    }

    #[test]
    fn no_match_leaves_thread_untouched() {
        let mut thread = Thread {
            dialect: Dialect::Gdb,
            frames: vec![frame("crashy")],
            name: None,
            is_crash: true,
        };
        trim_exit_frames(&mut thread);
        assert_eq!(thread.frames.len(), 1);
    }

    #[test]
    fn skips_dialects_without_exit_noise() {
        let mut thread = Thread {
            dialect: Dialect::Python,
            frames: vec![frame("raise")],
            name: None,
            is_crash: true,
        };
        trim_exit_frames(&mut thread);
        assert_eq!(thread.frames.len(), 1);
    }
}
