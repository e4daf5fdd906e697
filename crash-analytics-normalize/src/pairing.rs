use crash_analytics_stacktrace::{DialectMismatch, Thread};

/// Renames frames with unknown function names (`"??"`) to a synthetic
/// `__unknown_function_<k>` label when the same position in both threads
/// is unknown and its immediate neighbors already agree by name.
///
/// This only makes sense once both threads are the same length and the
/// same dialect — call it right before a distance metric, after both
/// threads have already been through [`crate::normalize`].
pub fn pair_unknowns(a: &mut Thread, b: &mut Thread) -> Result<(), DialectMismatch> {
    if a.dialect != b.dialect {
        return Err(DialectMismatch { left: a.dialect, right: b.dialect });
    }
    if a.frames.len() != b.frames.len() {
        return Ok(());
    }

    let len = a.frames.len();
    for k in 0..len {
        let both_unknown = a.frames[k].function_name() == "??" && b.frames[k].function_name() == "??";
        if !both_unknown {
            continue;
        }

        let prev_matches = k == 0 || a.frames[k - 1].function_name() == b.frames[k - 1].function_name();
        let next_matches =
            k + 1 == len || a.frames[k + 1].function_name() == b.frames[k + 1].function_name();

        if prev_matches && next_matches {
            let label = format!("__unknown_function_{k}");
            a.frames[k].set_function_name(label.clone());
            b.frames[k].set_function_name(label);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_analytics_stacktrace::{Dialect, Frame, GdbFrame};

    fn frame(name: Option<&str>) -> Frame {
        Frame::Gdb(GdbFrame { function_name: name.map(str::to_owned), ..Default::default() })
    }

    fn thread(names: &[Option<&str>]) -> Thread {
        Thread {
            dialect: Dialect::Gdb,
            frames: names.iter().map(|n| frame(*n)).collect(),
            name: None,
            is_crash: true,
        }
    }

    #[test]
    fn renames_matching_unknown_gap() {
        let mut a = thread(&[Some("foo"), None, Some("bar")]);
        let mut b = thread(&[Some("foo"), None, Some("bar")]);
        pair_unknowns(&mut a, &mut b).unwrap();
        assert_eq!(a.frames[1].function_name(), "__unknown_function_1");
        assert_eq!(b.frames[1].function_name(), "__unknown_function_1");
    }

    #[test]
    fn leaves_unknowns_alone_without_matching_context() {
        let mut a = thread(&[Some("foo"), None, Some("bar")]);
        let mut b = thread(&[Some("foo"), None, Some("baz")]);
        pair_unknowns(&mut a, &mut b).unwrap();
        assert_eq!(a.frames[1].function_name(), "??");
    }

    #[test]
    fn rejects_dialect_mismatch() {
        let mut a = thread(&[Some("foo")]);
        let mut b = Thread { dialect: Dialect::Python, frames: vec![], name: None, is_crash: true };
        assert!(pair_unknowns(&mut a, &mut b).is_err());
    }
}
