use crate::error::{ReleaseError, Result};
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// A tag push recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRecord {
    pub remote: String,
    pub tags: Vec<String>,
    pub force: bool,
}

/// In-memory repository for exercising the release workflow without git.
///
/// Commits form a single linear history in insertion order. Created and
/// pushed tags are recorded so tests can assert on them.
pub struct MockRepository {
    commits: Vec<(Oid, CommitInfo)>,
    tags: RefCell<BTreeMap<String, Oid>>,
    pushes: RefCell<Vec<PushRecord>>,
    remote_tags: Vec<(String, Oid)>,
    fetch_error: Option<String>,
    push_error: Option<String>,
    rejected_tags: Vec<String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            tags: RefCell::new(BTreeMap::new()),
            pushes: RefCell::new(Vec::new()),
            remote_tags: Vec::new(),
            fetch_error: None,
            push_error: None,
            rejected_tags: Vec::new(),
        }
    }

    /// Append a commit; the newest commit is HEAD
    pub fn add_commit(&mut self, oid: Oid, message: impl Into<String>) {
        let info = CommitInfo {
            hash: oid.to_string(),
            message: message.into(),
            author: "Mock Author".to_string(),
        };
        self.commits.push((oid, info));
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.tags.get_mut().insert(name.into(), oid);
    }

    /// Tag that only appears locally after `fetch_tags`
    pub fn add_remote_tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.remote_tags.push((name.into(), oid));
    }

    /// Make `fetch_tags` fail with the given message
    pub fn fail_fetch(&mut self, message: impl Into<String>) {
        self.fetch_error = Some(message.into());
    }

    /// Make `push_tags` fail with the given message
    pub fn fail_push(&mut self, message: impl Into<String>) {
        self.push_error = Some(message.into());
    }

    /// Make `create_tag` fail for this tag name
    pub fn reject_tag(&mut self, name: impl Into<String>) {
        self.rejected_tags.push(name.into());
    }

    /// Current target of a tag
    pub fn tag_target(&self, name: &str) -> Option<Oid> {
        self.tags.borrow().get(name).copied()
    }

    /// Pushes performed so far
    pub fn pushes(&self) -> Vec<PushRecord> {
        self.pushes.borrow().clone()
    }

    fn position(&self, oid: Oid) -> Option<usize> {
        self.commits.iter().position(|(id, _)| *id == oid)
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.tags.borrow().keys().cloned().collect())
    }

    fn head_oid(&self) -> Result<Oid> {
        self.commits
            .last()
            .map(|(oid, _)| *oid)
            .ok_or_else(|| ReleaseError::tag("Cannot resolve HEAD: repository is empty"))
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>> {
        Ok(self.tag_target(tag_name))
    }

    fn get_commits_between(&self, from_oid: Option<Oid>, to_oid: Oid) -> Result<Vec<CommitInfo>> {
        let end = self
            .position(to_oid)
            .ok_or_else(|| ReleaseError::tag(format!("Unknown commit {}", to_oid)))?;
        let start = match from_oid {
            Some(from) => self.position(from).map_or(0, |i| i + 1),
            None => 0,
        };

        Ok(self
            .commits
            .iter()
            .take(end + 1)
            .skip(start)
            .map(|(_, info)| info.clone())
            .collect())
    }

    fn create_tag(&self, name: &str, oid: Oid, force: bool) -> Result<()> {
        if self.rejected_tags.iter().any(|t| t == name) {
            return Err(ReleaseError::tag(format!("Cannot create tag '{}': rejected", name)));
        }
        let mut tags = self.tags.borrow_mut();
        if !force && tags.contains_key(name) {
            return Err(ReleaseError::tag(format!("Tag '{}' already exists", name)));
        }
        tags.insert(name.to_string(), oid);
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.tags
            .borrow_mut()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ReleaseError::tag(format!("Cannot delete tag '{}': not found", name)))
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str], force: bool) -> Result<()> {
        if let Some(message) = &self.push_error {
            return Err(ReleaseError::remote(format!(
                "Push to '{}' failed: {}",
                remote, message
            )));
        }
        self.pushes.borrow_mut().push(PushRecord {
            remote: remote.to_string(),
            tags: tag_names.iter().map(|t| t.to_string()).collect(),
            force,
        });
        Ok(())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        if let Some(message) = &self.fetch_error {
            return Err(ReleaseError::remote(format!(
                "Fetch from '{}' failed: {}",
                remote, message
            )));
        }

        let mut tags = self.tags.borrow_mut();
        for (name, oid) in &self.remote_tags {
            tags.insert(name.clone(), *oid);
        }
        Ok(())
    }
}
