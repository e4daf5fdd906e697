//! Dialect-dispatched stacktrace normalization.
//!
//! [`normalize`] runs the full pipeline against one [`Thread`] in place:
//! exit-frame trimming, prefix stripping, glibc architecture-suffix
//! unification, always-removable and noise-frame pruning, null-dereference
//! cleanup at the thread's edges, and recursion collapsing. [`pair_unknowns`]
//! is a separate, comparison-time step that runs across two threads right
//! before a distance metric is computed.

#![warn(missing_docs)]

mod cleanup;
mod exit;
mod pairing;
mod prune;
mod rename;

pub use pairing::pair_unknowns;

use crash_analytics_stacktrace::Thread;

/// Runs every normalization pass against `thread`, in the fixed order the
/// passes are meant to compose in: trimming first (it discards the most
/// frames), then renaming, then pruning, then the cleanup passes that
/// depend on frame adjacency.
pub fn normalize(thread: &mut Thread) {
    exit::trim_exit_frames(thread);
    rename::strip_known_prefixes(thread);
    rename::unify_arch_suffixes(thread);
    prune::remove_always_removable(thread);
    prune::remove_noise_with_above(thread);
    cleanup::remove_null_deref_edges(thread);
    cleanup::collapse_recursion(thread);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_analytics_stacktrace::{Dialect, Frame, GdbFrame};

    fn gdb_frame(name: &str) -> Frame {
        Frame::Gdb(GdbFrame {
            function_name: Some(name.to_owned()),
            ..Default::default()
        })
    }

    #[test]
    fn full_pipeline_trims_and_collapses() {
        let mut thread = Thread {
            dialect: Dialect::Gdb,
            frames: vec![
                gdb_frame("raise"),
                gdb_frame("abort"),
                gdb_frame("crashy"),
                gdb_frame("crashy"),
                gdb_frame("__libc_start_main"),
                gdb_frame("_start"),
            ],
            name: None,
            is_crash: true,
        };
        normalize(&mut thread);
        let names: Vec<&str> = thread.frames.iter().map(Frame::function_name).collect();
        assert_eq!(names, vec!["crashy"]);
    }
}
