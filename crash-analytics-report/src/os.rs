//! Operating-system identity attached to a [`crate::Report`].

use serde::{Deserialize, Serialize};

/// The operating system a crash was observed on.
///
/// Distinct from a package: there is exactly one `Os` per report, and it
/// has no version-history or install-time concept of its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Os {
    /// Distribution name, e.g. `"fedora"`.
    pub name: String,
    /// Distribution version, e.g. `"39"`.
    pub version: String,
    /// Variant/edition, e.g. `"workstation"`. Empty when the distribution
    /// has no variant concept.
    #[serde(default)]
    pub variant: String,
    /// CPU architecture, e.g. `"x86_64"`.
    pub architecture: String,
    /// Common Platform Enumeration string identifying this OS release.
    #[serde(default)]
    pub cpe: String,
    /// Seconds since boot at the time the crash was observed.
    #[serde(default)]
    pub uptime: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let os = Os {
            name: "fedora".into(),
            version: "39".into(),
            variant: "workstation".into(),
            architecture: "x86_64".into(),
            cpe: "cpe:/o:fedoraproject:fedora:39".into(),
            uptime: 12345,
        };
        let json = serde_json::to_string(&os).unwrap();
        let back: Os = serde_json::from_str(&json).unwrap();
        assert_eq!(os, back);
    }

    #[test]
    fn missing_optional_fields_default() {
        let os: Os = serde_json::from_str(r#"{"name":"debian","version":"12","architecture":"x86_64"}"#).unwrap();
        assert_eq!(os.variant, "");
        assert_eq!(os.cpe, "");
        assert_eq!(os.uptime, 0);
    }
}
