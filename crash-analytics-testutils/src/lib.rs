//! Test helpers shared across the crash-analytics workspace.
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

/// Returns the full path to the specified fixture.
///
/// Fixtures are stored in the `fixtures` directory relative to this crate's
/// manifest; paths should be given relative to that location.
///
/// # Example
///
/// ```no_run
/// use crash_analytics_testutils::fixture;
///
/// let path = fixture("gdb/simple.txt");
/// assert!(path.ends_with("gdb/simple.txt"));
/// ```
pub fn fixture<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut full_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    full_path.push("fixtures");
    full_path.push(path.as_ref());

    assert!(full_path.exists(), "fixture does not exist: {}", full_path.display());

    full_path
}

/// Reads the specified fixture to a `String`.
pub fn read_fixture<P: AsRef<Path>>(path: P) -> String {
    let full_path = fixture(path);
    std::fs::read_to_string(&full_path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", full_path.display()))
}
