//! The dialect-specific stacktrace payload embedded in a [`crate::Report`].

use serde::{Deserialize, Serialize};

use crash_analytics_stacktrace::java::JavaStacktrace;
use crash_analytics_stacktrace::{core::CoreStacktrace, koops::KoopsStacktrace};
use crash_analytics_stacktrace::{js::JsStacktrace, python::PythonStacktrace, ruby::RubyStacktrace};
use crash_analytics_stacktrace::{Dialect, JavaFrame};

/// The `type` field of a Report: the six wire-format report kinds.
///
/// This is coarser than [`ReportStacktrace`]: a `Core` report may carry
/// either a processed `core_backtrace` or a legacy raw `stacktrace` text
/// blob, and both map to the same `"core"` type string.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Native coredump.
    Core,
    /// CPython traceback.
    Python,
    /// Linux kernel oops.
    Kerneloops,
    /// Java exception chain.
    Java,
    /// Ruby backtrace.
    Ruby,
    /// JavaScript (V8/Node) stack trace.
    Javascript,
}

/// A Java exception chain in its Report wire shape: a flat list of
/// exceptions, each with its class name, optional message and frames.
///
/// [`JavaStacktrace`] is not directly `Serialize`/`Deserialize` — its
/// per-exception data lives in three parallel vectors alongside a
/// `Vec<Thread>` of generic frames — so the report envelope carries this
/// smaller, JSON-native shape instead and converts to/from it at the
/// boundary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JavaReportStacktrace {
    /// One entry per exception in the chain, outermost first.
    pub exceptions: Vec<JavaReportException>,
}

/// One exception in a [`JavaReportStacktrace`] chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JavaReportException {
    /// Fully qualified exception class name.
    pub class: String,
    /// Exception message, if the header line had one.
    #[serde(default)]
    pub message: Option<String>,
    /// Frames, topmost first.
    pub frames: Vec<JavaFrame>,
}

impl From<&JavaStacktrace> for JavaReportStacktrace {
    fn from(s: &JavaStacktrace) -> Self {
        let exceptions = s
            .threads
            .iter()
            .zip(s.exception_classes.iter())
            .zip(s.exception_messages.iter())
            .map(|((thread, class), message)| JavaReportException {
                class: class.clone(),
                message: message.clone(),
                frames: thread
                    .frames
                    .iter()
                    .filter_map(|f| match f {
                        crash_analytics_stacktrace::Frame::Java(jf) => Some(jf.clone()),
                        _ => None,
                    })
                    .collect(),
            })
            .collect();
        JavaReportStacktrace { exceptions }
    }
}

/// One of the seven dialect-specific payloads a Report may carry, matching
/// the seven possible wire keys named in the JSON envelope.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportStacktrace {
    /// Legacy raw GDB backtrace text under the `stacktrace` key.
    RawText(String),
    /// Processed native coredump under the `core_backtrace` key.
    Core(CoreStacktrace),
    /// CPython traceback under the `python` key.
    Python(PythonStacktrace),
    /// Kernel oops under the `koops` key.
    Kerneloops(KoopsStacktrace),
    /// Java exception chain under the `java` key.
    Java(JavaReportStacktrace),
    /// Ruby backtrace under the `ruby` key.
    Ruby(RubyStacktrace),
    /// JavaScript stack trace under the `javascript` key.
    Javascript(JsStacktrace),
}

impl ReportStacktrace {
    /// The `type` value this payload corresponds to.
    pub fn report_type(&self) -> ReportType {
        match self {
            Self::RawText(_) | Self::Core(_) => ReportType::Core,
            Self::Python(_) => ReportType::Python,
            Self::Kerneloops(_) => ReportType::Kerneloops,
            Self::Java(_) => ReportType::Java,
            Self::Ruby(_) => ReportType::Ruby,
            Self::Javascript(_) => ReportType::Javascript,
        }
    }

    /// The dialect this payload's frames belong to.
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::RawText(_) => Dialect::Gdb,
            Self::Core(_) => Dialect::Core,
            Self::Python(_) => Dialect::Python,
            Self::Kerneloops(_) => Dialect::Koops,
            Self::Java(_) => Dialect::Java,
            Self::Ruby(_) => Dialect::Ruby,
            Self::Javascript(_) => Dialect::Js,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_analytics_stacktrace::java::JavaStacktrace;

    #[test]
    fn core_type_covers_both_raw_text_and_processed_payload() {
        assert_eq!(ReportStacktrace::RawText("#0 main".into()).report_type(), ReportType::Core);
        assert_eq!(ReportStacktrace::Core(CoreStacktrace::default()).report_type(), ReportType::Core);
    }

    #[test]
    fn type_serializes_lowercase_matching_wire_names() {
        assert_eq!(serde_json::to_string(&ReportType::Kerneloops).unwrap(), "\"kerneloops\"");
        assert_eq!(serde_json::to_string(&ReportType::Javascript).unwrap(), "\"javascript\"");
    }

    #[test]
    fn java_stacktrace_converts_to_report_shape() {
        let input = "java.lang.RuntimeException: boom\n    at com.example.Main.run(Main.java:42)\n";
        let parsed = JavaStacktrace::parse(input).unwrap();
        let wire = JavaReportStacktrace::from(&parsed);
        assert_eq!(wire.exceptions.len(), 1);
        assert_eq!(wire.exceptions[0].class, "java.lang.RuntimeException");
        assert_eq!(wire.exceptions[0].message.as_deref(), Some("boom"));
        assert_eq!(wire.exceptions[0].frames.len(), 1);
    }
}
