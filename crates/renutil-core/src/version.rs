//! Semantic version parsing and comparison.
//!
//! Ren'Py releases are identified by strict semver strings which double as
//! directory names inside the cache root, so the canonical rendering must
//! round-trip through parsing.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A semantic version: `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
///
/// Build metadata is carried along but ignored by equality, ordering and
/// hashing, per the semver specification.
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Vec<Identifier>,
    pub build: Option<String>,
}

/// A single pre-release identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Purely numeric identifier, compared numerically.
    Numeric(u64),
    /// Alphanumeric identifier, compared lexically.
    Alphanumeric(String),
}

impl Version {
    /// Create a release version with no pre-release or build tags.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
            build: None,
        }
    }

    /// Whether this is a pre-release version.
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (i, id) in self.pre.iter().enumerate() {
            f.write_str(if i == 0 { "-" } else { "." })?;
            match id {
                Identifier::Numeric(n) => write!(f, "{}", n)?,
                Identifier::Alphanumeric(s) => f.write_str(s)?,
            }
        }
        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::Alphanumeric(s) => f.write_str(s),
        }
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Release listing anchors carry a trailing slash; tolerate one.
        let s = s.strip_suffix('/').unwrap_or(s);

        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let (s, build) = match s.split_once('+') {
            Some((head, build)) => {
                parse_build_metadata(build)?;
                (head, Some(build.to_string()))
            }
            None => (s, None),
        };

        let (core, pre_text) = match s.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (s, None),
        };

        let mut parts = core.split('.');
        let major = parse_numeric_component(parts.next().unwrap_or(""))?;
        let minor = parse_numeric_component(parts.next().ok_or_else(|| {
            VersionParseError::InvalidFormat(core.to_string())
        })?)?;
        let patch = parse_numeric_component(parts.next().ok_or_else(|| {
            VersionParseError::InvalidFormat(core.to_string())
        })?)?;
        if parts.next().is_some() {
            return Err(VersionParseError::InvalidFormat(core.to_string()));
        }

        let pre = match pre_text {
            Some(text) => text
                .split('.')
                .map(parse_prerelease_identifier)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Version {
            major,
            minor,
            patch,
            pre,
            build,
        })
    }
}

/// Parse a numeric version component, rejecting leading zeros.
fn parse_numeric_component(text: &str) -> Result<u64, VersionParseError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionParseError::InvalidNumber(text.to_string()));
    }
    if text.len() > 1 && text.starts_with('0') {
        return Err(VersionParseError::LeadingZero(text.to_string()));
    }
    text.parse()
        .map_err(|_| VersionParseError::InvalidNumber(text.to_string()))
}

fn parse_prerelease_identifier(text: &str) -> Result<Identifier, VersionParseError> {
    if text.is_empty() {
        return Err(VersionParseError::EmptyIdentifier);
    }
    if !text
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-')
    {
        return Err(VersionParseError::InvalidIdentifier(text.to_string()));
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        if text.len() > 1 && text.starts_with('0') {
            return Err(VersionParseError::LeadingZero(text.to_string()));
        }
        Ok(Identifier::Numeric(text.parse().map_err(|_| {
            VersionParseError::InvalidNumber(text.to_string())
        })?))
    } else {
        Ok(Identifier::Alphanumeric(text.to_string()))
    }
}

fn parse_build_metadata(text: &str) -> Result<(), VersionParseError> {
    for id in text.split('.') {
        if id.is_empty() {
            return Err(VersionParseError::EmptyIdentifier);
        }
        if !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(VersionParseError::InvalidIdentifier(id.to_string()));
        }
    }
    Ok(())
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major
            && self.minor == other.minor
            && self.patch == other.patch
            && self.pre == other.pre
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.pre.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.minor.cmp(&other.minor) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.patch.cmp(&other.patch) {
            Ordering::Equal => {}
            ord => return ord,
        }
        // Absence of a pre-release ranks higher than presence of one.
        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => return Ordering::Equal,
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            (false, false) => {}
        }
        for (a, b) in self.pre.iter().zip(other.pre.iter()) {
            match a.cmp(b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        // Shared prefix: the shorter identifier list has lower precedence.
        self.pre.len().cmp(&other.pre.len())
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            // Numeric identifiers always have lower precedence.
            (Identifier::Numeric(_), Identifier::Alphanumeric(_)) => Ordering::Less,
            (Identifier::Alphanumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::Alphanumeric(a), Identifier::Alphanumeric(b)) => a.cmp(b),
        }
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Error parsing a version string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("invalid version format: {0}")]
    InvalidFormat(String),
    #[error("invalid version number: {0}")]
    InvalidNumber(String),
    #[error("leading zero in numeric component: {0}")]
    LeadingZero(String),
    #[error("empty identifier")]
    EmptyIdentifier,
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_release() {
        let version = v("7.3.5");
        assert_eq!(version, Version::new(7, 3, 5));
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_parse_prerelease_and_build() {
        let version = v("1.2.3-alpha.1+build.42");
        assert_eq!(
            version.pre,
            vec![
                Identifier::Alphanumeric("alpha".into()),
                Identifier::Numeric(1)
            ]
        );
        assert_eq!(version.build.as_deref(), Some("build.42"));
    }

    #[test]
    fn test_parse_tolerates_trailing_slash() {
        assert_eq!(v("7.3.5/"), Version::new(7, 3, 5));
    }

    #[test]
    fn test_parse_rejects_bad_grammar() {
        for bad in ["", "1", "1.2", "01.2.3", "1.02.3", "1.2.03", "1.2.3-",
                    "1.2.3-a..b", "1.2.3-01", "1.2.3.4", "1.x.3", "1.2.3+",
                    "a.b.c"] {
            assert!(bad.parse::<Version>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_display_round_trips() {
        for s in ["7.3.5", "1.0.0-alpha", "1.0.0-alpha.1", "2.0.0-rc.1+sha.5114f85"] {
            assert_eq!(v(s).to_string(), s);
        }
    }

    #[test]
    fn test_semver_precedence() {
        let ordered = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
            "2.0.0",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_build_metadata_ignored_by_equality() {
        assert_eq!(v("1.2.3+abc"), v("1.2.3+def"));
        assert_eq!(v("1.2.3+abc").cmp(&v("1.2.3")), Ordering::Equal);
    }

    #[test]
    fn test_serde_string_form() {
        let version = v("7.4.11");
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"7.4.11\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);
    }
}
