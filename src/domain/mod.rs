//! Domain logic - versions and tags, independent of git operations

pub mod tag;
pub mod version;

pub use tag::{FloatingTag, TagSet, LATEST_TAG};
pub use version::{prerelease_of, ReleaseVersion, VersionBump, VERSION_PREFIX};
