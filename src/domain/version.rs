use crate::error::{MergeError, Result};
use std::cmp::Ordering;
use std::fmt;

/// Parse a semantic version, tolerating a leading `v` or `V`
pub fn parse(version: &str) -> Result<semver::Version> {
    let clean = version
        .trim()
        .trim_start_matches('v')
        .trim_start_matches('V');

    semver::Version::parse(clean).map_err(|e| {
        MergeError::version(format!("'{}' is not a semantic version: {}", version, e))
    })
}

/// Compare two versions by semver precedence.
///
/// Pre-releases order before their release; build metadata is ignored.
pub fn compare(a: &str, b: &str) -> Result<Ordering> {
    let a = parse(a)?;
    let b = parse(b)?;

    Ok(a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre)))
}

/// Where the source version sits relative to the main branch version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCheck {
    /// Same version on both sides
    Same,
    /// Source is older than main
    Behind,
    /// Source is newer than main, the expected case
    Ahead,
}

impl VersionCheck {
    /// Whether the merge can go ahead without asking
    pub fn is_healthy(&self) -> bool {
        matches!(self, VersionCheck::Ahead)
    }
}

impl fmt::Display for VersionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VersionCheck::Same => "same version",
            VersionCheck::Behind => "behind",
            VersionCheck::Ahead => "ahead",
        };
        f.write_str(label)
    }
}

/// Classify the source version against the main branch version
pub fn classify(source: &str, main: &str) -> Result<VersionCheck> {
    Ok(match compare(source, main)? {
        Ordering::Equal => VersionCheck::Same,
        Ordering::Less => VersionCheck::Behind,
        Ordering::Greater => VersionCheck::Ahead,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_prefix() {
        assert_eq!(parse("v1.2.3").unwrap(), semver::Version::new(1, 2, 3));
        assert_eq!(parse("V1.2.3").unwrap(), semver::Version::new(1, 2, 3));
        assert_eq!(parse("1.2.3").unwrap(), semver::Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse("1.2"), Err(MergeError::Version(_))));
        assert!(parse("undefined").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_compare_reflexive() {
        for v in ["0.0.1", "1.2.3", "2.0.0-rc.1", "10.20.30+build.5"] {
            assert_eq!(compare(v, v).unwrap(), Ordering::Equal, "{}", v);
        }
    }

    #[test]
    fn test_compare_antisymmetric() {
        let pairs = [("1.0.0", "2.0.0"), ("1.2.0", "1.10.0"), ("1.0.0-alpha", "1.0.0")];
        for (a, b) in pairs {
            assert_eq!(compare(a, b).unwrap(), Ordering::Less);
            assert_eq!(compare(b, a).unwrap(), Ordering::Greater);
        }
    }

    #[test]
    fn test_compare_transitive() {
        let (a, b, c) = ("0.9.9", "1.0.0-beta.2", "1.0.0");
        assert_eq!(compare(a, b).unwrap(), Ordering::Less);
        assert_eq!(compare(b, c).unwrap(), Ordering::Less);
        assert_eq!(compare(a, c).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_prerelease_ordering() {
        assert_eq!(compare("1.0.0-alpha", "1.0.0-alpha.1").unwrap(), Ordering::Less);
        assert_eq!(compare("1.0.0-alpha.1", "1.0.0-beta").unwrap(), Ordering::Less);
        assert_eq!(compare("1.0.0-rc.1", "1.0.0").unwrap(), Ordering::Less);
    }

    #[test]
    fn test_build_metadata_ignored() {
        assert_eq!(compare("1.0.0+a", "1.0.0+b").unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("1.0.0", "1.0.0").unwrap(), VersionCheck::Same);
        assert_eq!(classify("0.9.0", "1.0.0").unwrap(), VersionCheck::Behind);
        assert_eq!(classify("1.1.0", "1.0.0").unwrap(), VersionCheck::Ahead);
        assert!(VersionCheck::Ahead.is_healthy());
        assert!(!VersionCheck::Same.is_healthy());
    }

    #[test]
    fn test_classify_malformed_is_error() {
        assert!(classify("1.0", "1.0.0").is_err());
        assert!(classify("1.0.0", "not defined").is_err());
    }
}
