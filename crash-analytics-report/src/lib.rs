//! The Report envelope joining a stacktrace with the operating-system and
//! package context it was observed under, serialized to the ureport JSON v2
//! wire format.
//!
//! [`Report`] owns exactly one [`stacktrace::ReportStacktrace`] payload, an
//! [`os::Os`] identity and an RPM [`rpm::Package`] inventory. [`rpm`] also
//! provides NEVRA-based sorting and deduplication for package lists.

#![warn(missing_docs)]

pub mod os;
pub mod report;
pub mod rpm;
pub mod stacktrace;

pub use os::Os;
pub use report::{Report, ReportError, Reporter, REPORT_VERSION};
pub use rpm::{sort_and_dedup, Package, PackageRole, VerifyConsistency};
pub use stacktrace::{JavaReportException, JavaReportStacktrace, ReportStacktrace, ReportType};
