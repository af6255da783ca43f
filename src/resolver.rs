//! Floating tag resolution
//!
//! Decides which of `latest`, `vMAJOR` and `vMAJOR.MINOR` must be moved to a
//! new release, given the tags that already exist. Pure: no I/O, inputs are
//! only read.

use std::cmp::Ordering;

use tracing::debug;

use crate::domain::tag::{FloatingTag, TagSet};
use crate::domain::version::{prerelease_of, ReleaseVersion};
use crate::error::{ReleaseError, Result};

/// Which lines already have a release newer than the target
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct NewerReleases {
    overall: bool,
    in_major: bool,
    in_major_minor: bool,
}

impl NewerReleases {
    fn scan(target: &ReleaseVersion, existing: &TagSet) -> Self {
        let mut newer = NewerReleases::default();

        for tag in existing.versions() {
            if tag.cmp_precedence(target) != Ordering::Greater {
                continue;
            }
            newer.overall = true;
            newer.in_major |= tag.same_major(target);
            newer.in_major_minor |= tag.same_major_minor(target);

            if newer.overall && newer.in_major && newer.in_major_minor {
                break;
            }
        }

        newer
    }
}

/// Compute the floating tags that must point at `target`.
///
/// Returns `vMAJOR.MINOR`, `vMAJOR` and `latest` for each line in which no
/// existing tag is newer than `target`. The target tag itself is not part of
/// the result. Prerelease targets never get floating tags.
///
/// # Errors
/// * [`ReleaseError::InvalidVersion`] - `target` is not a `v`-prefixed semantic version
/// * [`ReleaseError::DuplicateVersion`] - `target` is already among `existing`
///
/// # Example
/// ```
/// use release_tags::resolver::compute_floating_tags;
///
/// let tags = compute_floating_tags("v1.2.1", &["v1.2.0", "v2.0.0"]).unwrap();
/// assert_eq!(tags, vec!["v1.2", "v1"]);
/// ```
pub fn compute_floating_tags<S: AsRef<str>>(target: &str, existing: &[S]) -> Result<Vec<String>> {
    if let Some(pre) = prerelease_of(target) {
        debug!(version = target, prerelease = %pre, "prerelease target, no floating tags");
        return Ok(Vec::new());
    }

    let version = ReleaseVersion::parse(target)?;
    let tags = TagSet::from_tags(existing);
    for ignored in tags.ignored() {
        debug!(tag = %ignored, "ignoring non-semver tag");
    }

    Ok(floating_tags_for(&version, &tags)?
        .into_iter()
        .map(|tag| tag.to_string())
        .collect())
}

/// Typed counterpart of [`compute_floating_tags`] over an already parsed tag set
pub fn floating_tags_for(target: &ReleaseVersion, existing: &TagSet) -> Result<Vec<FloatingTag>> {
    if target.is_prerelease() {
        return Ok(Vec::new());
    }

    if existing.contains_exact(target.as_str()) {
        return Err(ReleaseError::DuplicateVersion(target.to_string()));
    }

    let newer = NewerReleases::scan(target, existing);
    debug!(
        version = %target,
        newer_overall = newer.overall,
        newer_in_major = newer.in_major,
        newer_in_major_minor = newer.in_major_minor,
        "scanned existing tags"
    );

    let [major_minor, major, latest] = FloatingTag::for_version(target);
    let mut floating = Vec::with_capacity(3);
    if !newer.in_major_minor {
        floating.push(major_minor);
    }
    if !newer.in_major {
        floating.push(major);
    }
    if !newer.overall {
        floating.push(latest);
    }
    Ok(floating)
}
