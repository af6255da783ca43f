use std::fmt;

/// Non-fatal conditions met while resolving or publishing a release.
/// These should be reported to the user but never stop the workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Target is a prerelease, so no floating tag moves
    PrereleaseTarget { version: String },
    /// Existing tags that are not versions and took no part in the comparison
    IgnoredTags { tags: Vec<String> },
    /// A newer release exists, so `latest` stays where it is
    NotLatest { version: String, newest: String },
    /// Fetching tags from the remote failed; local tags are used instead
    FetchFailed { remote: String, reason: String },
    /// No commits since the newest release tag
    NoNewCommits { latest_tag: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::PrereleaseTarget { version } => {
                write!(f, "'{}' is a prerelease; floating tags are left untouched", version)
            }
            BoundaryWarning::IgnoredTags { tags } => {
                const SHOWN: usize = 5;
                let listed = tags.iter().take(SHOWN).cloned().collect::<Vec<_>>().join(", ");
                if tags.len() > SHOWN {
                    write!(
                        f,
                        "Ignored {} non-semver tags: {} and {} more",
                        tags.len(),
                        listed,
                        tags.len() - SHOWN
                    )
                } else {
                    write!(f, "Ignored {} non-semver tags: {}", tags.len(), listed)
                }
            }
            BoundaryWarning::NotLatest { version, newest } => {
                write!(
                    f,
                    "'{}' is older than existing release '{}'; 'latest' is not moved",
                    version, newest
                )
            }
            BoundaryWarning::FetchFailed { remote, reason } => {
                write!(
                    f,
                    "Could not fetch tags from remote '{}': {}. Using local tags",
                    remote, reason
                )
            }
            BoundaryWarning::NoNewCommits { latest_tag } => {
                write!(f, "No new commits since tag '{}'", latest_tag)
            }
        }
    }
}
