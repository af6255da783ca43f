use crate::error::{ReleaseError, Result};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Literal prefix every release version carries (`v1.2.3`)
pub const VERSION_PREFIX: char = 'v';

/// A `v`-prefixed semantic version as it appears in a tag name.
///
/// Keeps the original spelling so that `v1.2` and `v1.2.0` stay distinct tags
/// even though they have equal precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    raw: String,
    inner: semver::Version,
}

impl ReleaseVersion {
    /// Parse a version from a tag string (e.g., "v1.2.3", "v1.2", "v2.0.0-rc.1")
    ///
    /// The `vMAJOR` and `vMAJOR.MINOR` shorthands are accepted and stand for
    /// `vMAJOR.0.0` and `vMAJOR.MINOR.0`. Shorthands cannot carry prerelease
    /// or build metadata.
    pub fn parse(tag: &str) -> Result<Self> {
        let body = tag.strip_prefix(VERSION_PREFIX).ok_or_else(|| {
            ReleaseError::invalid_version(format!(
                "'{}' is missing the '{}' prefix",
                tag, VERSION_PREFIX
            ))
        })?;

        let inner = semver::Version::parse(&expand_shorthand(body)).map_err(|e| {
            ReleaseError::invalid_version(format!("'{}' is not valid semver: {}", tag, e))
        })?;

        Ok(ReleaseVersion {
            raw: tag.to_string(),
            inner,
        })
    }

    /// Build a release version from its numeric components
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        let inner = semver::Version::new(major, minor, patch);
        ReleaseVersion {
            raw: format!("{}{}", VERSION_PREFIX, inner),
            inner,
        }
    }

    /// The tag spelling this version was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    /// Prerelease component, if any (e.g. "rc.1" for "v2.0.0-rc.1")
    pub fn prerelease(&self) -> Option<&str> {
        if self.inner.pre.is_empty() {
            None
        } else {
            Some(self.inner.pre.as_str())
        }
    }

    pub fn is_prerelease(&self) -> bool {
        !self.inner.pre.is_empty()
    }

    /// Spelled with all three components (`v1.2.3`), not as a `v1`/`v1.2` shorthand
    pub fn is_full(&self) -> bool {
        let core = self.raw.split(['-', '+']).next().unwrap_or(self.raw.as_str());
        core.matches('.').count() == 2
    }

    /// Floating tag of this version's major line (`vMAJOR`)
    pub fn major_tag(&self) -> String {
        format!("{}{}", VERSION_PREFIX, self.inner.major)
    }

    /// Floating tag of this version's minor line (`vMAJOR.MINOR`)
    pub fn major_minor_tag(&self) -> String {
        format!(
            "{}{}.{}",
            VERSION_PREFIX, self.inner.major, self.inner.minor
        )
    }

    pub fn same_major(&self, other: &Self) -> bool {
        self.inner.major == other.inner.major
    }

    pub fn same_major_minor(&self, other: &Self) -> bool {
        self.same_major(other) && self.inner.minor == other.inner.minor
    }

    /// Compare by semantic-version precedence.
    ///
    /// Major, minor and patch compare numerically, a prerelease sorts before
    /// its release, and build metadata is ignored.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        let lhs = &self.inner;
        let rhs = &other.inner;
        (lhs.major, lhs.minor, lhs.patch, &lhs.pre).cmp(&(rhs.major, rhs.minor, rhs.patch, &rhs.pre))
    }

    /// Bump version according to bump type. The result is always a release.
    pub fn bump(&self, bump_type: VersionBump) -> Self {
        let (major, minor, patch) = (self.major(), self.minor(), self.patch());
        match bump_type {
            VersionBump::Major => ReleaseVersion::new(major + 1, 0, 0),
            VersionBump::Minor => ReleaseVersion::new(major, minor + 1, 0),
            VersionBump::Patch => ReleaseVersion::new(major, minor, patch + 1),
        }
    }
}

impl FromStr for ReleaseVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        ReleaseVersion::parse(s)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Prerelease component of a tag string.
///
/// Returns `None` both for releases and for strings that are not valid versions.
pub fn prerelease_of(tag: &str) -> Option<String> {
    ReleaseVersion::parse(tag)
        .ok()
        .and_then(|v| v.prerelease().map(str::to_string))
}

/// `1` -> `1.0.0`, `1.2` -> `1.2.0`; anything else is passed through untouched.
fn expand_shorthand(body: &str) -> Cow<'_, str> {
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Cow::Borrowed(body);
    }

    match body.matches('.').count() {
        0 => Cow::Owned(format!("{}.0.0", body)),
        1 => Cow::Owned(format!("{}.0", body)),
        _ => Cow::Borrowed(body),
    }
}

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::Major => write!(f, "major"),
            VersionBump::Minor => write!(f, "minor"),
            VersionBump::Patch => write!(f, "patch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = ReleaseVersion::parse("v1.2.3").unwrap();
        assert_eq!(v.major(), 1);
        assert_eq!(v.minor(), 2);
        assert_eq!(v.patch(), 3);
        assert_eq!(v.as_str(), "v1.2.3");
        assert!(!v.is_prerelease());
    }

    #[test]
    fn test_is_full() {
        assert!(ReleaseVersion::parse("v1.2.3").unwrap().is_full());
        assert!(ReleaseVersion::parse("v1.2.3-rc.1+build.5").unwrap().is_full());
        assert!(ReleaseVersion::new(0, 1, 0).is_full());
        assert!(!ReleaseVersion::parse("v1").unwrap().is_full());
        assert!(!ReleaseVersion::parse("v1.2").unwrap().is_full());
    }

    #[test]
    fn test_version_parse_requires_prefix() {
        assert!(ReleaseVersion::parse("1.2.3").is_err());
        assert!(ReleaseVersion::parse("V1.2.3").is_err());
        assert!(ReleaseVersion::parse("release-1.2.3").is_err());
    }

    #[test]
    fn test_version_parse_shorthand() {
        let major = ReleaseVersion::parse("v1").unwrap();
        assert_eq!((major.major(), major.minor(), major.patch()), (1, 0, 0));
        assert_eq!(major.as_str(), "v1");

        let minor = ReleaseVersion::parse("v1.2").unwrap();
        assert_eq!((minor.major(), minor.minor(), minor.patch()), (1, 2, 0));
    }

    #[test]
    fn test_version_parse_invalid() {
        for tag in [
            "v", "", "latest", "v1.", "v1.2.", "v1.2.3.4", "v01.2.3", "v1.02.3", "v1-rc1",
            "v1.2-rc1", "v1.2.3-", "v1.2.3+", "v1.2.3-01", "v 1.2.3", "v1.2.3 ",
        ] {
            assert!(ReleaseVersion::parse(tag).is_err(), "{} should be invalid", tag);
        }
    }

    #[test]
    fn test_version_parse_prerelease_and_build() {
        let v = ReleaseVersion::parse("v2.0.0-rc.1+build.5").unwrap();
        assert!(v.is_prerelease());
        assert_eq!(v.prerelease(), Some("rc.1"));

        let build_only = ReleaseVersion::parse("v2.0.0+build.5").unwrap();
        assert!(!build_only.is_prerelease());
    }

    #[test]
    fn test_prerelease_of() {
        assert_eq!(prerelease_of("v1.0.0-beta"), Some("beta".to_string()));
        assert_eq!(prerelease_of("v1.0.0"), None);
        assert_eq!(prerelease_of("garbage-beta"), None);
    }

    #[test]
    fn test_precedence_numeric() {
        let a = ReleaseVersion::parse("v1.9.0").unwrap();
        let b = ReleaseVersion::parse("v1.10.0").unwrap();
        assert_eq!(a.cmp_precedence(&b), Ordering::Less);
    }

    #[test]
    fn test_precedence_prerelease_before_release() {
        let rc = ReleaseVersion::parse("v1.0.0-rc.1").unwrap();
        let release = ReleaseVersion::parse("v1.0.0").unwrap();
        assert_eq!(rc.cmp_precedence(&release), Ordering::Less);

        let alpha = ReleaseVersion::parse("v1.0.0-alpha").unwrap();
        assert_eq!(alpha.cmp_precedence(&rc), Ordering::Less);
    }

    #[test]
    fn test_precedence_ignores_build_and_shorthand_spelling() {
        let built = ReleaseVersion::parse("v1.0.0+abc").unwrap();
        let plain = ReleaseVersion::parse("v1.0.0").unwrap();
        assert_eq!(built.cmp_precedence(&plain), Ordering::Equal);

        let short = ReleaseVersion::parse("v1").unwrap();
        assert_eq!(short.cmp_precedence(&plain), Ordering::Equal);
        assert_ne!(short, plain);
    }

    #[test]
    fn test_floating_labels() {
        let v = ReleaseVersion::parse("v3.4.5").unwrap();
        assert_eq!(v.major_tag(), "v3");
        assert_eq!(v.major_minor_tag(), "v3.4");
    }

    #[test]
    fn test_version_bump() {
        let v = ReleaseVersion::parse("v1.2.3").unwrap();
        assert_eq!(v.bump(VersionBump::Major).as_str(), "v2.0.0");
        assert_eq!(v.bump(VersionBump::Minor).as_str(), "v1.3.0");
        assert_eq!(v.bump(VersionBump::Patch).as_str(), "v1.2.4");
    }

    #[test]
    fn test_version_bump_drops_prerelease() {
        let v = ReleaseVersion::parse("v1.2.3-rc.2").unwrap();
        let bumped = v.bump(VersionBump::Patch);
        assert!(!bumped.is_prerelease());
        assert_eq!(bumped.to_string(), "v1.2.4");
    }
}
