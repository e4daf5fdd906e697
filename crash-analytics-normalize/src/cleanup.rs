use crash_analytics_stacktrace::Thread;

/// Removes a topmost or bottommost frame whose address is 0 and function
/// name is unknown — the shape left behind by jumping through a null
/// function pointer.
pub fn remove_null_deref_edges(thread: &mut Thread) {
    if thread.frames.first().is_some_and(|f| f.is_null_unknown()) {
        thread.frames.remove(0);
    }
    if thread.frames.last().is_some_and(|f| f.is_null_unknown()) {
        thread.frames.pop();
    }
}

/// Walks the thread collapsing adjacent frames with identical, resolved
/// function names, keeping the shallower (topmost) of each pair. Repeats
/// until no more collapses are possible.
pub fn collapse_recursion(thread: &mut Thread) {
    loop {
        let mut collapsed = false;
        let mut i = 0;
        while i + 1 < thread.frames.len() {
            let name = thread.frames[i].function_name().to_owned();
            if name != "??" && name == thread.frames[i + 1].function_name() {
                thread.frames.remove(i + 1);
                collapsed = true;
            } else {
                i += 1;
            }
        }
        if !collapsed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_analytics_stacktrace::{Dialect, Frame, GdbFrame};

    fn frame(name: Option<&str>, address: u64) -> Frame {
        Frame::Gdb(GdbFrame {
            function_name: name.map(str::to_owned),
            address: Some(address),
            ..Default::default()
        })
    }

    #[test]
    fn strips_null_deref_edges_only() {
        let mut thread = Thread {
            dialect: Dialect::Gdb,
            frames: vec![frame(None, 0), frame(Some("crashy"), 0x1000), frame(None, 0)],
            name: None,
            is_crash: true,
        };
        remove_null_deref_edges(&mut thread);
        assert_eq!(thread.frames.len(), 1);
        assert_eq!(thread.frames[0].function_name(), "crashy");
    }

    #[test]
    fn collapses_recursive_run_to_one_frame() {
        let mut thread = Thread {
            dialect: Dialect::Gdb,
            frames: vec![
                frame(Some("recurse"), 1),
                frame(Some("recurse"), 2),
                frame(Some("recurse"), 3),
                frame(Some("main"), 4),
            ],
            name: None,
            is_crash: true,
        };
        collapse_recursion(&mut thread);
        let names: Vec<&str> = thread.frames.iter().map(Frame::function_name).collect();
        assert_eq!(names, vec!["recurse", "main"]);
    }

    #[test]
    fn never_collapses_unknown_frames() {
        let mut thread = Thread {
            dialect: Dialect::Gdb,
            frames: vec![frame(None, 1), frame(None, 2)],
            name: None,
            is_crash: true,
        };
        collapse_recursion(&mut thread);
        assert_eq!(thread.frames.len(), 2);
    }
}
