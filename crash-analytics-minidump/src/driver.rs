//! Drives native-thread reconstruction from a coredump into a
//! [`CoreStacktrace`].

use std::time::SystemTime;

use thiserror::Error;

use crash_analytics_stacktrace::core::{CoreStacktrace, CoreThread};
use crash_analytics_stacktrace::CoreFrame;

use crate::cursor::{ProcedureResolver, StepOutcome, UnwindCursor};
use crate::segment::{Segment, SegmentTable};

/// Minimal coredump ELF identity the driver needs before it will attempt to
/// unwind anything.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CoreHeader {
    /// `true` if the ELF `e_type` is `ET_CORE`.
    pub is_core_type: bool,
    /// The coredump file's modification time.
    pub mtime: SystemTime,
}

/// Behavior knobs for [`unwind`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UnwindConfig {
    /// When set, per-thread unwind failures are logged at `warn` level
    /// instead of passing silently.
    pub debug_parser: bool,
}

/// The extent of the function an unwound frame's address fell in, handed
/// off to the function fingerprinter. `None` when procedure info was not
/// available or did not actually contain the address.
pub type FrameExtent = Option<(u64, u64)>;

/// Everything [`unwind`] needs to reconstruct one coredump's threads.
pub struct UnwindInput<'a> {
    /// The coredump's own ELF header facts.
    pub core: CoreHeader,
    /// The crashing executable's modification time.
    pub executable_mtime: SystemTime,
    /// Path to the crashing executable, recorded in the resulting
    /// [`CoreStacktrace`].
    pub executable_path: String,
    /// Fatal signal number, read from the core's `NT_PRSTATUS`.
    pub signal: u16,
    /// Executable PT_LOAD segments, already resolved to their backing
    /// files and build ids.
    pub segments: Vec<Segment>,
    /// One already-initialized unwind cursor per thread.
    pub cursors: Vec<Box<dyn UnwindCursor + 'a>>,
    /// Index into `cursors` of the thread that raised `signal`.
    pub crash_thread_index: usize,
    /// Resolves unwound addresses to their containing function.
    pub resolver: &'a dyn ProcedureResolver,
    /// Behavior knobs for this unwind.
    pub config: UnwindConfig,
}

/// Result of a successful unwind: the stacktrace plus, per thread and
/// frame, the extent of the function the frame's address fell in (for
/// callers that go on to fingerprint it).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnwindOutcome {
    /// The reconstructed, symbolicated stacktrace.
    pub stacktrace: CoreStacktrace,
    /// `extents[thread][frame]`, parallel to `stacktrace.stacktrace`.
    pub extents: Vec<Vec<FrameExtent>>,
}

/// Errors that abort the whole unwind before any threads are processed.
#[derive(Debug, Error)]
pub enum UnwindError {
    /// The coredump's ELF header was not `ET_CORE`.
    #[error("not a coredump (ELF type is not ET_CORE)")]
    NotACore,
    /// The executable is newer than the coredump, so its code cannot be
    /// trusted to match what actually crashed.
    #[error("binary newer than core")]
    BinaryNewerThanCore,
    /// Every thread's cursor failed before producing a single frame.
    #[error("no thread produced any frames")]
    NoFramesProduced,
}

/// Reconstructs every thread's stack from a coredump, per the unwinder
/// driver contract: validate the core header, resolve each stepped frame
/// against the segment table and procedure resolver, and assemble the
/// result. Per-thread step failures are recoverable; the whole operation
/// only fails if no thread yields any frame at all.
pub fn unwind(input: UnwindInput<'_>) -> Result<UnwindOutcome, UnwindError> {
    if !input.core.is_core_type {
        return Err(UnwindError::NotACore);
    }
    if input.executable_mtime > input.core.mtime {
        return Err(UnwindError::BinaryNewerThanCore);
    }

    let only_crash_thread = input.cursors.len() == 1;
    let table = SegmentTable::new(input.segments);
    let mut threads = Vec::with_capacity(input.cursors.len());
    let mut extents = Vec::with_capacity(input.cursors.len());

    for (index, mut cursor) in input.cursors.into_iter().enumerate() {
        let mut frames = Vec::new();
        let mut thread_extents = Vec::new();

        loop {
            match cursor.step() {
                Ok(StepOutcome::Done) => break,
                Ok(StepOutcome::Frame(ip)) if ip == 0 => break,
                Ok(StepOutcome::Frame(ip)) => {
                    let address_info = table.resolve(ip).unwrap_or_default();
                    let proc_info = input.resolver.resolve(ip);

                    let function_name = proc_info.as_ref().and_then(|p| p.function_name.clone());
                    let extent = proc_info
                        .as_ref()
                        .filter(|p| p.length > 0 && p.initial_loc <= ip && ip < p.initial_loc + p.length)
                        .map(|p| (p.initial_loc, p.length));

                    frames.push(CoreFrame {
                        address: ip,
                        build_id: address_info.build_id,
                        build_id_offset: address_info.build_id_offset,
                        function_name,
                        file_name: address_info.file_name,
                        fingerprint: None,
                        fingerprint_hashed: false,
                    });
                    thread_extents.push(extent);
                }
                Err(message) => {
                    if input.config.debug_parser {
                        tracing::warn!(thread = index, error = %message, "unwind step failed");
                    }
                    break;
                }
            }
        }

        threads.push(CoreThread { crash_thread: index == input.crash_thread_index, frames });
        extents.push(thread_extents);
    }

    if !threads.iter().any(|t| !t.frames.is_empty()) {
        return Err(UnwindError::NoFramesProduced);
    }

    Ok(UnwindOutcome {
        stacktrace: CoreStacktrace {
            signal: input.signal,
            executable: input.executable_path,
            only_crash_thread,
            stacktrace: threads,
        },
        extents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ProcedureInfo;
    use std::time::Duration;

    struct ScriptedCursor {
        steps: std::vec::IntoIter<Result<StepOutcome, String>>,
    }

    impl ScriptedCursor {
        fn new(steps: Vec<Result<StepOutcome, String>>) -> Self {
            ScriptedCursor { steps: steps.into_iter() }
        }
    }

    impl UnwindCursor for ScriptedCursor {
        fn step(&mut self) -> Result<StepOutcome, String> {
            self.steps.next().unwrap_or(Ok(StepOutcome::Done))
        }
    }

    struct FixedResolver;

    impl ProcedureResolver for FixedResolver {
        fn resolve(&self, ip: u64) -> Option<ProcedureInfo> {
            if ip == 0x4010 {
                Some(ProcedureInfo { function_name: Some("main".into()), initial_loc: 0x4000, length: 0x100 })
            } else {
                None
            }
        }
    }

    fn base_header(older: bool) -> (CoreHeader, SystemTime) {
        let core_mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let exe_mtime = if older { core_mtime - Duration::from_secs(10) } else { core_mtime + Duration::from_secs(10) };
        (CoreHeader { is_core_type: true, mtime: core_mtime }, exe_mtime)
    }

    #[test]
    fn rejects_non_core_elf() {
        let (mut core, exe_mtime) = base_header(true);
        core.is_core_type = false;
        let result = unwind(UnwindInput {
            core,
            executable_mtime: exe_mtime,
            executable_path: "/bin/x".into(),
            signal: 11,
            segments: vec![],
            cursors: vec![],
            crash_thread_index: 0,
            resolver: &FixedResolver,
            config: UnwindConfig::default(),
        });
        assert!(matches!(result, Err(UnwindError::NotACore)));
    }

    #[test]
    fn rejects_executable_newer_than_core() {
        let (core, exe_mtime) = base_header(false);
        let result = unwind(UnwindInput {
            core,
            executable_mtime: exe_mtime,
            executable_path: "/bin/x".into(),
            signal: 11,
            segments: vec![],
            cursors: vec![],
            crash_thread_index: 0,
            resolver: &FixedResolver,
            config: UnwindConfig::default(),
        });
        assert!(matches!(result, Err(UnwindError::BinaryNewerThanCore)));
    }

    #[test]
    fn reconstructs_a_symbolicated_frame() {
        let (core, exe_mtime) = base_header(true);
        let segments = vec![Segment {
            offset: 0,
            vaddr: 0x4000,
            filesz: 0x1000,
            memsz: 0x1000,
            file_name: Some("/usr/bin/crashy".into()),
            build_id: Some("deadbeef".into()),
        }];
        let cursor = ScriptedCursor::new(vec![Ok(StepOutcome::Frame(0x4010)), Ok(StepOutcome::Done)]);
        let outcome = unwind(UnwindInput {
            core,
            executable_mtime: exe_mtime,
            executable_path: "/usr/bin/crashy".into(),
            signal: 11,
            segments,
            cursors: vec![Box::new(cursor)],
            crash_thread_index: 0,
            resolver: &FixedResolver,
            config: UnwindConfig::default(),
        })
        .unwrap();

        assert_eq!(outcome.stacktrace.signal, 11);
        assert_eq!(outcome.stacktrace.stacktrace.len(), 1);
        let frame = &outcome.stacktrace.stacktrace[0].frames[0];
        assert_eq!(frame.address, 0x4010);
        assert_eq!(frame.build_id.as_deref(), Some("deadbeef"));
        assert_eq!(frame.build_id_offset, Some(0x10));
        assert_eq!(frame.function_name.as_deref(), Some("main"));
        assert_eq!(outcome.extents[0][0], Some((0x4000, 0x100)));
        assert!(outcome.stacktrace.stacktrace[0].crash_thread);
        assert!(outcome.stacktrace.only_crash_thread);
    }

    #[test]
    fn only_crash_thread_is_false_when_every_thread_was_given() {
        let (core, exe_mtime) = base_header(true);
        let good = ScriptedCursor::new(vec![Ok(StepOutcome::Frame(0x4010)), Ok(StepOutcome::Done)]);
        let other = ScriptedCursor::new(vec![Ok(StepOutcome::Done)]);
        let outcome = unwind(UnwindInput {
            core,
            executable_mtime: exe_mtime,
            executable_path: "/usr/bin/crashy".into(),
            signal: 11,
            segments: vec![],
            cursors: vec![Box::new(good), Box::new(other)],
            crash_thread_index: 0,
            resolver: &FixedResolver,
            config: UnwindConfig::default(),
        })
        .unwrap();

        assert!(!outcome.stacktrace.only_crash_thread);
    }

    #[test]
    fn a_failing_thread_does_not_abort_the_whole_unwind() {
        let (core, exe_mtime) = base_header(true);
        let good = ScriptedCursor::new(vec![Ok(StepOutcome::Frame(0x4010)), Ok(StepOutcome::Done)]);
        let bad = ScriptedCursor::new(vec![Err("bad frame pointer".into())]);
        let outcome = unwind(UnwindInput {
            core,
            executable_mtime: exe_mtime,
            executable_path: "/usr/bin/crashy".into(),
            signal: 6,
            segments: vec![],
            cursors: vec![Box::new(bad), Box::new(good)],
            crash_thread_index: 1,
            resolver: &FixedResolver,
            config: UnwindConfig { debug_parser: true },
        })
        .unwrap();

        assert!(outcome.stacktrace.stacktrace[0].frames.is_empty());
        assert_eq!(outcome.stacktrace.stacktrace[1].frames.len(), 1);
    }

    #[test]
    fn fails_when_every_thread_yields_no_frames() {
        let (core, exe_mtime) = base_header(true);
        let cursor = ScriptedCursor::new(vec![Err("immediate failure".into())]);
        let result = unwind(UnwindInput {
            core,
            executable_mtime: exe_mtime,
            executable_path: "/usr/bin/crashy".into(),
            signal: 11,
            segments: vec![],
            cursors: vec![Box::new(cursor)],
            crash_thread_index: 0,
            resolver: &FixedResolver,
            config: UnwindConfig::default(),
        });
        assert!(matches!(result, Err(UnwindError::NoFramesProduced)));
    }
}
