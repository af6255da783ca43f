use crate::domain::version::ReleaseVersion;
use std::fmt;

/// Name of the floating tag that tracks the newest release overall
pub const LATEST_TAG: &str = "latest";

/// A mutable tag repointed to the newest release of its line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatingTag {
    /// Newest release overall
    Latest,
    /// Newest release within a major line (`v2`)
    Major(u64),
    /// Newest release within a minor line (`v2.3`)
    MajorMinor(u64, u64),
}

impl FloatingTag {
    /// Floating tags of a release, narrowest line first
    pub fn for_version(version: &ReleaseVersion) -> [FloatingTag; 3] {
        [
            FloatingTag::MajorMinor(version.major(), version.minor()),
            FloatingTag::Major(version.major()),
            FloatingTag::Latest,
        ]
    }
}

impl fmt::Display for FloatingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatingTag::Latest => f.write_str(LATEST_TAG),
            FloatingTag::Major(major) => write!(f, "v{}", major),
            FloatingTag::MajorMinor(major, minor) => write!(f, "v{}.{}", major, minor),
        }
    }
}

/// Snapshot of previously published tags.
///
/// Only tags that parse as versions take part in comparisons; everything
/// else (`latest`, `nightly`, ...) is kept aside in `ignored`.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    versions: Vec<ReleaseVersion>,
    ignored: Vec<String>,
}

impl TagSet {
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = TagSet::default();
        for tag in tags {
            let tag = tag.as_ref();
            match ReleaseVersion::parse(tag) {
                Ok(version) => set.versions.push(version),
                Err(_) => set.ignored.push(tag.to_string()),
            }
        }
        set
    }

    /// Parsed version tags, in input order
    pub fn versions(&self) -> &[ReleaseVersion] {
        &self.versions
    }

    /// Tags that were skipped because they are not versions
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Whether a version tag is present with exactly this spelling
    pub fn contains_exact(&self, tag: &str) -> bool {
        self.versions.iter().any(|v| v.as_str() == tag)
    }

    /// Highest-precedence release (prereleases excluded).
    ///
    /// Shorthand spellings (`v1`, `v1.2`) are floating tags, not releases, and
    /// are skipped.
    pub fn latest_release(&self) -> Option<&ReleaseVersion> {
        self.versions
            .iter()
            .filter(|v| !v.is_prerelease() && v.is_full())
            .max_by(|a, b| a.cmp_precedence(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floating_tag_display() {
        assert_eq!(FloatingTag::Latest.to_string(), "latest");
        assert_eq!(FloatingTag::Major(2).to_string(), "v2");
        assert_eq!(FloatingTag::MajorMinor(2, 0).to_string(), "v2.0");
    }

    #[test]
    fn test_floating_tags_for_version() {
        let v = ReleaseVersion::parse("v1.4.2").unwrap();
        let names: Vec<String> = FloatingTag::for_version(&v)
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(names, vec!["v1.4", "v1", "latest"]);
    }

    #[test]
    fn test_tag_set_filters_non_versions() {
        let set = TagSet::from_tags(["v1.0.0", "latest", "nightly", "v1.1", "1.2.3"]);
        assert_eq!(set.versions().len(), 2);
        assert_eq!(set.ignored(), &["latest", "nightly", "1.2.3"]);
    }

    #[test]
    fn test_tag_set_contains_exact() {
        let set = TagSet::from_tags(["v1.2", "v1.0.0"]);
        assert!(set.contains_exact("v1.0.0"));
        assert!(set.contains_exact("v1.2"));
        assert!(!set.contains_exact("v1.2.0"));
    }

    #[test]
    fn test_latest_release_skips_prereleases_and_floating() {
        let set = TagSet::from_tags(["v1.0.0", "v1.2.0", "v2", "v2.0.0-rc.1", "latest"]);
        assert_eq!(set.latest_release().map(|v| v.as_str()), Some("v1.2.0"));
    }

    #[test]
    fn test_latest_release_empty() {
        let set = TagSet::from_tags(Vec::<String>::new());
        assert!(set.is_empty());
        assert!(set.latest_release().is_none());
    }
}
