//! Git operations abstraction layer
//!
//! The release workflow only talks to the [Repository] trait, so it can run
//! against a real repository ([repository::Git2Repository], backed by `git2`)
//! or against [mock::MockRepository] in tests.
//!
//! ```rust
//! # use release_tags::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> release_tags::Result<()> {
//! let head = repo.head_oid()?;
//! let commits = repo.get_commits_between(None, head)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The full commit hash
    pub hash: String,
    /// The commit message
    pub message: String,
    /// The commit author
    pub author: String,
}

/// Git operations needed to publish a release.
///
/// Implementors must be `Send` so a repository handle can be moved to another
/// thread. All failures map to [crate::error::ReleaseError].
pub trait Repository: Send {
    /// All tag names in the repository, sorted alphabetically.
    ///
    /// This is the raw existing-tag snapshot handed to the resolver; it may
    /// contain names that are not versions.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Object ID of the commit `HEAD` points at
    fn head_oid(&self) -> Result<Oid>;

    /// Find a tag by name and get the commit it points at
    ///
    /// Annotated tags are peeled to their commit.
    ///
    /// # Returns
    /// * `Ok(Some(Oid))` - Commit the tag points at
    /// * `Ok(None)` - If the tag doesn't exist
    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>>;

    /// Commits reachable from `to_oid` but not from `from_oid`, oldest first.
    ///
    /// With `from_oid` set to `None` the whole history up to `to_oid` is returned.
    fn get_commits_between(&self, from_oid: Option<Oid>, to_oid: Oid) -> Result<Vec<CommitInfo>>;

    /// Create a lightweight tag at `oid`.
    ///
    /// With `force` an existing tag of the same name is moved; without it an
    /// existing tag is an error.
    fn create_tag(&self, name: &str, oid: Oid, force: bool) -> Result<()>;

    /// Delete a local tag; deleting a missing tag is an error
    fn delete_tag(&self, name: &str) -> Result<()>;

    /// Push the given tags to a remote, overwriting remote tags when `force` is set
    fn push_tags(&self, remote: &str, tag_names: &[&str], force: bool) -> Result<()>;

    /// Fetch all tags from a remote, updating local tags that moved
    fn fetch_tags(&self, remote: &str) -> Result<()>;
}

/// Refspec pushing or fetching a single tag, prefixed with `+` when forced
pub fn tag_refspec(tag_name: &str, force: bool) -> String {
    let prefix = if force { "+" } else { "" };
    format!("{}refs/tags/{}:refs/tags/{}", prefix, tag_name, tag_name)
}
