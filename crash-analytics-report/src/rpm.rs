//! RPM package inventory: the affected package and its verify-consistency
//! records, plus NEVRA sort/dedup.

use serde::{Deserialize, Serialize};

/// Whether a package is believed to be involved in the crash.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageRole {
    /// No relation to the crash has been established.
    #[default]
    Unknown,
    /// `rpm --verify` or a build-id match implicated this package.
    Affected,
}

/// A single `rpm --verify` mismatch record for one file belonging to a
/// package.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyConsistency {
    /// Path of the file the verification ran against.
    pub path: String,
    /// Owner differs from the package's recorded owner.
    #[serde(default)]
    pub owner_mismatch: bool,
    /// Group differs from the package's recorded group.
    #[serde(default)]
    pub group_mismatch: bool,
    /// File mode differs.
    #[serde(default)]
    pub mode_mismatch: bool,
    /// MD5 digest differs.
    #[serde(default)]
    pub md5_mismatch: bool,
    /// File size differs.
    #[serde(default)]
    pub size_mismatch: bool,
    /// Device major number differs (device-special files only).
    #[serde(default)]
    pub major_mismatch: bool,
    /// Device minor number differs (device-special files only).
    #[serde(default)]
    pub minor_mismatch: bool,
    /// Symlink target differs.
    #[serde(default)]
    pub symlink_mismatch: bool,
    /// Modification time is newer than the package's recorded mtime.
    #[serde(default)]
    pub mtime_mismatch: bool,
}

impl VerifyConsistency {
    /// `true` when none of the mismatch flags are set.
    pub fn is_consistent(&self) -> bool {
        !(self.owner_mismatch
            || self.group_mismatch
            || self.mode_mismatch
            || self.md5_mismatch
            || self.size_mismatch
            || self.major_mismatch
            || self.minor_mismatch
            || self.symlink_mismatch
            || self.mtime_mismatch)
    }
}

/// An RPM package identified by NEVRA (name, epoch, version, release,
/// architecture), with its install time, crash role and any recorded
/// `rpm --verify` mismatches.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Package name, e.g. `"glibc"`.
    pub name: String,
    /// Epoch; `0` when the spec file has none.
    #[serde(default)]
    pub epoch: u32,
    /// Upstream version, e.g. `"2.38"`.
    pub version: String,
    /// Distribution release, e.g. `"3.fc39"`.
    pub release: String,
    /// Package architecture, e.g. `"x86_64"`.
    pub architecture: String,
    /// Seconds since the epoch at install time.
    #[serde(default)]
    pub install_time: u64,
    /// Crash-relevance role.
    #[serde(default)]
    pub role: PackageRole,
    /// `rpm --verify` mismatches found for this package's files, if any
    /// verification was run.
    #[serde(default)]
    pub consistency: Vec<VerifyConsistency>,
}

type Nevra<'a> = (&'a str, u32, &'a str, &'a str, &'a str);
type Nvr<'a> = (&'a str, &'a str, &'a str);

impl Package {
    /// The (name, epoch, version, release, architecture) tuple, compared
    /// lexicographically field by field.
    pub fn nevra_key(&self) -> Nevra<'_> {
        (&self.name, self.epoch, &self.version, &self.release, &self.architecture)
    }

    /// The (name, version, release) tuple, ignoring epoch and architecture.
    pub fn nvr_key(&self) -> Nvr<'_> {
        (&self.name, &self.version, &self.release)
    }

    /// Full NEVRA comparison.
    pub fn cmp_nevra(&self, other: &Package) -> std::cmp::Ordering {
        self.nevra_key().cmp(&other.nevra_key())
    }

    /// Name/version/release comparison, ignoring epoch and architecture.
    pub fn cmp_nvr(&self, other: &Package) -> std::cmp::Ordering {
        self.nvr_key().cmp(&other.nvr_key())
    }
}

/// Sorts `packages` by NEVRA and removes adjacent duplicates, keeping the
/// first occurrence of each NEVRA (and, with it, whichever role that
/// occurrence carried).
pub fn sort_and_dedup(mut packages: Vec<Package>) -> Vec<Package> {
    packages.sort_by(Package::cmp_nevra);
    packages.dedup_by(|b, a| a.cmp_nevra(b) == std::cmp::Ordering::Equal);
    packages
}
