//! The Report envelope: reporter identity, OS, package inventory and
//! exactly one dialect-specific stacktrace, serialized to JSON v2.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crash_analytics_stacktrace::{core::CoreStacktrace, koops::KoopsStacktrace};
use crash_analytics_stacktrace::{js::JsStacktrace, python::PythonStacktrace, ruby::RubyStacktrace};

use crate::os::Os;
use crate::rpm::Package;
use crate::stacktrace::{JavaReportStacktrace, ReportStacktrace, ReportType};

/// The current report-version this crate emits and expects on parse.
pub const REPORT_VERSION: u32 = 2;

/// `{name, version}` identifying the client that produced a report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reporter {
    /// Reporting tool name, e.g. `"crash-analytics"`.
    pub name: String,
    /// Reporting tool version string.
    pub version: String,
}

/// Errors constructing or parsing a [`Report`].
#[derive(Debug, Error)]
pub enum ReportError {
    /// The JSON carried none of the seven recognized stacktrace keys.
    #[error("report has no populated stacktrace payload")]
    MissingStacktrace,
    /// The JSON carried more than one of the seven recognized stacktrace
    /// keys; exactly one must be populated.
    #[error("report has {0} populated stacktrace payloads, expected exactly 1")]
    MultipleStacktraces(usize),
    /// The JSON was not valid per its own syntax, or a field had the wrong
    /// shape.
    #[error("malformed report JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A complete crash report: reporter identity, the operating system and
/// package inventory at crash time, and exactly one dialect-specific
/// stacktrace.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Client identity that produced this report.
    pub reporter: Reporter,
    /// Free-text one-line crash summary.
    pub reason: String,
    /// Operating system the crash was observed on.
    pub os: Os,
    /// Target architecture, e.g. `"x86_64"`. Usually matches `os.architecture`
    /// but is recorded independently since a report can describe a crash in
    /// a foreign-architecture binary (e.g. under emulation).
    pub architecture: String,
    /// Packages directly implicated in the crash.
    pub packages: Vec<Package>,
    /// Packages related to, but not directly implicated in, the crash.
    pub related_packages: Vec<Package>,
    /// The stacktrace payload.
    pub stacktrace: ReportStacktrace,
    /// ABRT component name, e.g. `"glibc"`. Empty when not recorded.
    pub component_name: String,
    /// Monotonically increasing identifier assigned by the reporting client.
    pub serial: u32,
    /// Whether the reporting user had root privileges.
    pub user_root: bool,
    /// Whether the reporting user was a local (non-remote) session.
    pub user_local: bool,
    /// Insertion-ordered auth token key/value pairs.
    pub auth_entries: Vec<(String, String)>,
}

impl Report {
    /// The `type` string this report would serialize with.
    pub fn report_type(&self) -> ReportType {
        self.stacktrace.report_type()
    }

    /// Parses a Report from its JSON v2 wire representation.
    pub fn from_json(input: &str) -> Result<Report, ReportError> {
        let wire: ReportWire = serde_json::from_str(input)?;
        Report::try_from(wire)
    }

    /// Serializes this report to its JSON v2 wire representation, with keys
    /// in the fixed order the envelope specifies.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&ReportWire::from(self)).expect("Report fields are always representable as JSON")
    }
}

#[derive(Serialize, Deserialize)]
struct StacktracePayloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stacktrace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    core_backtrace: Option<CoreStacktrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    python: Option<PythonStacktrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    koops: Option<KoopsStacktrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    java: Option<JavaReportStacktrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ruby: Option<RubyStacktrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    javascript: Option<JsStacktrace>,
}

impl StacktracePayloads {
    fn populated_count(&self) -> usize {
        [
            self.stacktrace.is_some(),
            self.core_backtrace.is_some(),
            self.python.is_some(),
            self.koops.is_some(),
            self.java.is_some(),
            self.ruby.is_some(),
            self.javascript.is_some(),
        ]
        .into_iter()
        .filter(|p| *p)
        .count()
    }
}

impl From<&ReportStacktrace> for StacktracePayloads {
    fn from(s: &ReportStacktrace) -> Self {
        let mut payloads = StacktracePayloads {
            stacktrace: None,
            core_backtrace: None,
            python: None,
            koops: None,
            java: None,
            ruby: None,
            javascript: None,
        };
        match s {
            ReportStacktrace::RawText(text) => payloads.stacktrace = Some(text.clone()),
            ReportStacktrace::Core(s) => payloads.core_backtrace = Some(s.clone()),
            ReportStacktrace::Python(s) => payloads.python = Some(s.clone()),
            ReportStacktrace::Kerneloops(s) => payloads.koops = Some(s.clone()),
            ReportStacktrace::Java(s) => payloads.java = Some(s.clone()),
            ReportStacktrace::Ruby(s) => payloads.ruby = Some(s.clone()),
            ReportStacktrace::Javascript(s) => payloads.javascript = Some(s.clone()),
        }
        payloads
    }
}

impl TryFrom<StacktracePayloads> for ReportStacktrace {
    type Error = ReportError;

    fn try_from(p: StacktracePayloads) -> Result<Self, Self::Error> {
        let count = p.populated_count();
        if count == 0 {
            return Err(ReportError::MissingStacktrace);
        }
        if count > 1 {
            return Err(ReportError::MultipleStacktraces(count));
        }
        Ok(if let Some(text) = p.stacktrace {
            ReportStacktrace::RawText(text)
        } else if let Some(s) = p.core_backtrace {
            ReportStacktrace::Core(s)
        } else if let Some(s) = p.python {
            ReportStacktrace::Python(s)
        } else if let Some(s) = p.koops {
            ReportStacktrace::Kerneloops(s)
        } else if let Some(s) = p.java {
            ReportStacktrace::Java(s)
        } else if let Some(s) = p.ruby {
            ReportStacktrace::Ruby(s)
        } else {
            ReportStacktrace::Javascript(p.javascript.expect("count == 1 and all other variants checked"))
        })
    }
}

/// The flat on-wire shape of a [`Report`], used only for (de)serialization.
///
/// Key order here is the order `#[derive(Serialize)]` emits struct fields
/// in, which matches the fixed order the envelope specifies.
#[derive(Serialize, Deserialize)]
struct ReportWire {
    #[serde(rename = "ureport_version", alias = "report_version")]
    report_version: u32,
    reporter: Reporter,
    #[serde(default)]
    reason: String,
    os: Os,
    #[serde(default)]
    architecture: String,
    #[serde(default)]
    packages: Vec<Package>,
    #[serde(default)]
    related_packages: Vec<Package>,
    #[serde(rename = "type")]
    report_type: ReportType,
    #[serde(flatten)]
    stacktrace: StacktracePayloads,
    #[serde(default)]
    component_name: String,
    #[serde(default)]
    serial: u32,
    #[serde(default)]
    user_root: bool,
    #[serde(default)]
    user_local: bool,
    #[serde(default)]
    auth_entries: Vec<(String, String)>,
}

impl From<&Report> for ReportWire {
    fn from(r: &Report) -> Self {
        ReportWire {
            report_version: REPORT_VERSION,
            reporter: r.reporter.clone(),
            reason: r.reason.clone(),
            os: r.os.clone(),
            architecture: r.architecture.clone(),
            packages: r.packages.clone(),
            related_packages: r.related_packages.clone(),
            report_type: r.report_type(),
            stacktrace: StacktracePayloads::from(&r.stacktrace),
            component_name: r.component_name.clone(),
            serial: r.serial,
            user_root: r.user_root,
            user_local: r.user_local,
            auth_entries: r.auth_entries.clone(),
        }
    }
}

impl TryFrom<ReportWire> for Report {
    type Error = ReportError;

    fn try_from(w: ReportWire) -> Result<Self, Self::Error> {
        let stacktrace = ReportStacktrace::try_from(w.stacktrace)?;
        tracing::debug!(report_type = ?stacktrace.report_type(), version = w.report_version, "parsed report");
        Ok(Report {
            reporter: w.reporter,
            reason: w.reason,
            os: w.os,
            architecture: w.architecture,
            packages: w.packages,
            related_packages: w.related_packages,
            stacktrace,
            component_name: w.component_name,
            serial: w.serial,
            user_root: w.user_root,
            user_local: w.user_local,
            auth_entries: w.auth_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_core_report() -> Report {
        Report {
            reporter: Reporter { name: "crash-analytics".into(), version: "0.1.0".into() },
            reason: "main crashed with SIGSEGV".into(),
            os: Os {
                name: "fedora".into(),
                version: "39".into(),
                variant: "workstation".into(),
                architecture: "x86_64".into(),
                cpe: "cpe:/o:fedoraproject:fedora:39".into(),
                uptime: 4200,
            },
            architecture: "x86_64".into(),
            packages: vec![Package {
                name: "glibc".into(),
                epoch: 0,
                version: "2.38".into(),
                release: "3.fc39".into(),
                architecture: "x86_64".into(),
                install_time: 1_700_000_000,
                role: crate::rpm::PackageRole::Affected,
                consistency: Vec::new(),
            }],
            related_packages: Vec::new(),
            stacktrace: ReportStacktrace::Core(CoreStacktrace {
                signal: 11,
                executable: "/usr/bin/crashy".into(),
                stacktrace: Vec::new(),
            }),
            component_name: "glibc".into(),
            serial: 1,
            user_root: false,
            user_local: true,
            auth_entries: vec![("token".into(), "abc123".into())],
        }
    }

    #[test]
    fn round_trips_a_core_report() {
        let report = sample_core_report();
        let json = report.to_json();
        let back = Report::from_json(&json).unwrap();
        assert_eq!(report, back);
    }

    #[test]
    fn key_order_matches_the_envelope_contract() {
        let report = sample_core_report();
        let json = report.to_json();
        let expected_prefix =
            ["ureport_version", "reporter", "reason", "os", "architecture", "packages", "related_packages", "type"];
        let mut last_pos = 0;
        for key in expected_prefix {
            let needle = format!("\"{key}\":");
            let pos = json.find(&needle).unwrap_or_else(|| panic!("missing key {key}"));
            assert!(pos >= last_pos, "key {key} out of order");
            last_pos = pos;
        }
    }

    #[test]
    fn accepts_legacy_report_version_key() {
        let report = sample_core_report();
        let json = report.to_json().replacen("ureport_version", "report_version", 1);
        let back = Report::from_json(&json).unwrap();
        assert_eq!(report, back);
    }

    #[test]
    fn rejects_a_report_with_no_stacktrace_payload() {
        let json = r#"{
            "ureport_version": 2, "reporter": {"name": "x", "version": "1"},
            "reason": "", "os": {"name": "fedora", "version": "39", "architecture": "x86_64"},
            "architecture": "x86_64", "packages": [], "related_packages": [], "type": "core"
        }"#;
        assert!(matches!(Report::from_json(json), Err(ReportError::MissingStacktrace)));
    }

    #[test]
    fn rejects_a_report_with_two_stacktrace_payloads() {
        let json = r#"{
            "ureport_version": 2, "reporter": {"name": "x", "version": "1"},
            "reason": "", "os": {"name": "fedora", "version": "39", "architecture": "x86_64"},
            "architecture": "x86_64", "packages": [], "related_packages": [], "type": "core",
            "stacktrace": "#0 main", "core_backtrace": {"signal": 11, "executable": "/bin/x", "stacktrace": []}
        }"#;
        assert!(matches!(Report::from_json(json), Err(ReportError::MultipleStacktraces(2))));
    }

    #[test]
    fn fixture_report_matches_expected_values() {
        let json = crash_analytics_testutils::read_fixture("report/core.json");
        let report = Report::from_json(&json).unwrap();
        assert_eq!(report.report_type(), ReportType::Core);
        assert_eq!(report.os.name, "fedora");
        assert_eq!(report.packages[0].role, crate::rpm::PackageRole::Affected);
    }
}
