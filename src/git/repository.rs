use crate::error::{ReleaseError, Result};
use crate::git::{tag_refspec, CommitInfo};
use git2::{
    Cred, CredentialType, ErrorCode, FetchOptions, Oid, PushOptions, RemoteCallbacks,
    Repository as Git2Repo, Sort,
};
use std::path::Path;
use tracing::{debug, info};

/// Credential lookups tried before giving up on a remote
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Callbacks authenticating against a remote.
    ///
    /// SSH keys from `~/.ssh` are tried first, then the SSH agent, then the
    /// configured git credential helper.
    fn remote_callbacks(&self) -> Result<RemoteCallbacks<'static>> {
        let config = self.repo.config()?;
        let mut attempts = 0;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username_from_url, allowed_types| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }

            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(CredentialType::SSH_KEY) {
                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_ecdsa", "id_rsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }

                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }

            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                return Cred::credential_helper(&config, url, username_from_url);
            }

            Cred::default()
        });

        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, message
            ))),
            None => Ok(()),
        });

        Ok(callbacks)
    }
}

impl super::Repository for Git2Repository {
    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        let mut names: Vec<String> = tags.iter().flatten().map(|s| s.to_string()).collect();
        names.sort();
        Ok(names)
    }

    fn head_oid(&self) -> Result<Oid> {
        let head = self
            .repo
            .head()
            .map_err(|e| ReleaseError::tag(format!("Cannot resolve HEAD: {}", e)))?;
        Ok(head.peel_to_commit()?.id())
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>> {
        let reference_name = format!("refs/tags/{}", tag_name);

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => {
                let commit = reference
                    .peel_to_commit()
                    .map_err(|e| ReleaseError::tag(format!("Cannot peel tag '{}': {}", tag_name, e)))?;

                Ok(Some(commit.id()))
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(ReleaseError::tag(format!(
                "Cannot find tag '{}': {}",
                tag_name, e
            ))),
        }
    }

    fn get_commits_between(&self, from_oid: Option<Oid>, to_oid: Oid) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(to_oid)?;
        if let Some(from_oid) = from_oid {
            revwalk.hide(from_oid)?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            commits.push(CommitInfo {
                hash: oid.to_string(),
                message: commit.message().unwrap_or("(empty message)").to_string(),
                author: commit.author().name().unwrap_or("unknown").to_string(),
            });
        }

        Ok(commits)
    }

    fn create_tag(&self, name: &str, oid: Oid, force: bool) -> Result<()> {
        let object = self
            .repo
            .find_object(oid, None)
            .map_err(|e| ReleaseError::tag(format!("Cannot find object {}: {}", oid, e)))?;

        match self.repo.tag_lightweight(name, &object, force) {
            Ok(_) => {
                debug!(tag = name, %oid, force, "created tag");
                Ok(())
            }
            Err(e) if e.code() == ErrorCode::Exists => {
                Err(ReleaseError::tag(format!("Tag '{}' already exists", name)))
            }
            Err(e) => Err(ReleaseError::tag(format!("Cannot create tag '{}': {}", name, e))),
        }
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.repo
            .tag_delete(name)
            .map_err(|e| ReleaseError::tag(format!("Cannot delete tag '{}': {}", name, e)))?;
        debug!(tag = name, "deleted tag");
        Ok(())
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str], force: bool) -> Result<()> {
        let mut remote_handle = self
            .repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::remote(format!("Cannot find remote '{}': {}", remote, e)))?;

        let refspecs: Vec<String> = tag_names
            .iter()
            .map(|tag| tag_refspec(tag, force))
            .collect();

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(self.remote_callbacks()?);

        remote_handle
            .push(&refspecs, Some(&mut push_options))
            .map_err(|e| ReleaseError::remote(format!("Push to '{}' failed: {}", remote, e)))?;

        info!(remote, tags = ?tag_names, force, "pushed tags");
        Ok(())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        let mut remote_handle = self
            .repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::remote(format!("Cannot find remote '{}': {}", remote, e)))?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(self.remote_callbacks()?);

        remote_handle
            .fetch(&["+refs/tags/*:refs/tags/*"], Some(&mut fetch_options), None)
            .map_err(|e| ReleaseError::remote(format!("Fetch from '{}' failed: {}", remote, e)))?;

        debug!(remote, "fetched tags");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use git2::Signature;
    use tempfile::TempDir;

    fn commit(repo: &Git2Repo, message: &str) -> Oid {
        let sig = Signature::now("Test Author", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    fn init_repo() -> (TempDir, Git2Repo) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_list_tags_sorted() {
        let (dir, raw) = init_repo();
        let oid = commit(&raw, "feat: first");
        let repo = Git2Repository::open(dir.path()).unwrap();

        repo.create_tag("v1.0.0", oid, false).unwrap();
        repo.create_tag("latest", oid, false).unwrap();

        assert_eq!(repo.list_tags().unwrap(), vec!["latest", "v1.0.0"]);
    }

    #[test]
    fn test_create_tag_without_force_refuses_existing() {
        let (dir, raw) = init_repo();
        let first = commit(&raw, "feat: first");
        let second = commit(&raw, "fix: second");
        let repo = Git2Repository::open(dir.path()).unwrap();

        repo.create_tag("v1.0.0", first, false).unwrap();
        let err = repo.create_tag("v1.0.0", second, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(repo.find_tag_oid("v1.0.0").unwrap(), Some(first));
    }

    #[test]
    fn test_create_tag_with_force_moves_tag() {
        let (dir, raw) = init_repo();
        let first = commit(&raw, "feat: first");
        let second = commit(&raw, "fix: second");
        let repo = Git2Repository::open(dir.path()).unwrap();

        repo.create_tag("v1", first, true).unwrap();
        repo.create_tag("v1", second, true).unwrap();
        assert_eq!(repo.find_tag_oid("v1").unwrap(), Some(second));
    }

    #[test]
    fn test_delete_tag() {
        let (dir, raw) = init_repo();
        let oid = commit(&raw, "feat: first");
        let repo = Git2Repository::open(dir.path()).unwrap();

        repo.create_tag("v1.0.0", oid, false).unwrap();
        repo.delete_tag("v1.0.0").unwrap();
        assert_eq!(repo.find_tag_oid("v1.0.0").unwrap(), None);
        assert!(repo.delete_tag("v1.0.0").is_err());
    }

    #[test]
    fn test_find_missing_tag() {
        let (dir, raw) = init_repo();
        commit(&raw, "feat: first");
        let repo = Git2Repository::open(dir.path()).unwrap();

        assert_eq!(repo.find_tag_oid("v9.9.9").unwrap(), None);
    }

    #[test]
    fn test_commits_between_oldest_first() {
        let (dir, raw) = init_repo();
        let first = commit(&raw, "feat: first");
        commit(&raw, "fix: second");
        let third = commit(&raw, "docs: third");
        let repo = Git2Repository::open(dir.path()).unwrap();

        assert_eq!(repo.head_oid().unwrap(), third);

        let since_first = repo.get_commits_between(Some(first), third).unwrap();
        let messages: Vec<&str> = since_first.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["fix: second", "docs: third"]);

        let all = repo.get_commits_between(None, third).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].message, "feat: first");
        assert_eq!(all[0].author, "Test Author");
    }

    #[test]
    fn test_push_and_fetch_tags_through_bare_remote() {
        let remote_dir = TempDir::new().unwrap();
        Git2Repo::init_bare(remote_dir.path()).unwrap();
        let remote_url = remote_dir.path().to_str().unwrap();

        let (dir, raw) = init_repo();
        let oid = commit(&raw, "feat: first");
        raw.remote("origin", remote_url).unwrap();
        let repo = Git2Repository::open(dir.path()).unwrap();
        repo.create_tag("v1.0.0", oid, false).unwrap();
        repo.create_tag("latest", oid, true).unwrap();
        repo.push_tags("origin", &["v1.0.0", "latest"], true).unwrap();

        let (clone_dir, clone_raw) = init_repo();
        clone_raw.remote("origin", remote_url).unwrap();
        let clone = Git2Repository::open(clone_dir.path()).unwrap();
        clone.fetch_tags("origin").unwrap();

        assert_eq!(clone.list_tags().unwrap(), vec!["latest", "v1.0.0"]);
        assert_eq!(clone.find_tag_oid("v1.0.0").unwrap(), Some(oid));
    }

    #[test]
    fn test_push_to_missing_remote() {
        let (dir, raw) = init_repo();
        commit(&raw, "feat: first");
        let repo = Git2Repository::open(dir.path()).unwrap();

        let err = repo.push_tags("upstream", &["v1.0.0"], false).unwrap_err();
        assert!(matches!(err, ReleaseError::Remote(_)));
    }
}
