//! Release workflow orchestration
//!
//! The flows behind the CLI commands, written against the [Repository] trait
//! so they run the same on a real repository and on the mock. Nothing here
//! prompts or prints; warnings are collected and returned to the caller.

use std::cmp::Ordering;

use git2::Oid;
use tracing::{info, warn};

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::conventional::determine_version_bump;
use crate::domain::{ReleaseVersion, TagSet, VersionBump, LATEST_TAG};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::resolver::compute_floating_tags;
use crate::ui::formatter::format_manual_push_instruction;

/// Floating tags for a target version plus what was learned along the way
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRelease {
    pub version: ReleaseVersion,
    /// Floating tags to move, narrowest line first
    pub floating: Vec<String>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Resolve the floating tags for `target` against a snapshot of existing tags.
///
/// Fails with the resolver's `InvalidVersion` / `DuplicateVersion` errors.
pub fn resolve_release<S: AsRef<str>>(target: &str, existing: &[S]) -> Result<ResolvedRelease> {
    let floating = compute_floating_tags(target, existing)?;
    let version = ReleaseVersion::parse(target)?;
    let tags = TagSet::from_tags(existing);

    let mut warnings = Vec::new();
    if !tags.ignored().is_empty() {
        warnings.push(BoundaryWarning::IgnoredTags {
            tags: tags.ignored().to_vec(),
        });
    }

    if version.is_prerelease() {
        warnings.push(BoundaryWarning::PrereleaseTarget {
            version: version.to_string(),
        });
    } else if !floating.iter().any(|tag| tag == LATEST_TAG) {
        let newest = tags
            .versions()
            .iter()
            .filter(|v| v.cmp_precedence(&version) == Ordering::Greater)
            .max_by(|a, b| a.cmp_precedence(b));
        if let Some(newest) = newest {
            warnings.push(BoundaryWarning::NotLatest {
                version: version.to_string(),
                newest: newest.to_string(),
            });
        }
    }

    Ok(ResolvedRelease {
        version,
        floating,
        warnings,
    })
}

/// Next version derived from the commits since the newest release
#[derive(Debug, Clone, PartialEq)]
pub struct NextVersion {
    pub version: ReleaseVersion,
    /// Newest release tag the bump started from, if any
    pub previous: Option<String>,
    /// Bump applied to `previous`; `None` for the initial version
    pub bump: Option<VersionBump>,
    /// Number of commits analysed
    pub commit_count: usize,
    pub warnings: Vec<BoundaryWarning>,
}

/// Derive the next release version from conventional commits.
///
/// Without any release tag the configured initial version is used.
pub fn next_version<R: Repository>(repo: &R, config: &Config) -> Result<NextVersion> {
    let tags = TagSet::from_tags(repo.list_tags()?);
    let head = repo.head_oid()?;

    let Some(latest) = tags.latest_release() else {
        let commit_count = repo.get_commits_between(None, head)?.len();
        return Ok(NextVersion {
            version: config.initial_version()?,
            previous: None,
            bump: None,
            commit_count,
            warnings: Vec::new(),
        });
    };

    let from = repo.find_tag_oid(latest.as_str())?;
    let messages: Vec<String> = repo
        .get_commits_between(from, head)?
        .into_iter()
        .map(|commit| commit.message)
        .collect();

    let mut warnings = Vec::new();
    if messages.is_empty() {
        warnings.push(BoundaryWarning::NoNewCommits {
            latest_tag: latest.to_string(),
        });
    }

    let bump = determine_version_bump(&messages, &config.conventional_commits);
    Ok(NextVersion {
        version: latest.bump(bump),
        previous: Some(latest.to_string()),
        bump: Some(bump),
        commit_count: messages.len(),
        warnings,
    })
}

/// Arguments for the publish workflow
///
/// Mirrors the CLI flags in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishWorkflowArgs {
    /// Version to publish; derived from commits when absent
    pub version: Option<String>,

    /// Remote to fetch from and push to
    pub remote: String,

    /// Push created tags
    pub push: bool,

    /// Fetch remote tags first
    pub fetch: bool,

    /// Preview mode - don't create tags or push
    pub dry_run: bool,
}

impl PublishWorkflowArgs {
    /// Arguments taking every default from the configuration
    pub fn from_config(config: &Config) -> Self {
        PublishWorkflowArgs {
            version: None,
            remote: config.publish.remote.clone(),
            push: config.publish.push,
            fetch: config.publish.fetch,
            dry_run: false,
        }
    }
}

/// Result of a successful publish workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// The primary release tag
    pub version: String,

    /// Floating tags moved to the release
    pub floating: Vec<String>,

    /// Whether tags were pushed to the remote
    pub pushed: bool,

    /// Nothing was created or pushed
    pub dry_run: bool,

    pub warnings: Vec<BoundaryWarning>,
}

impl WorkflowResult {
    /// All tags of the release, primary first
    pub fn tags(&self) -> Vec<String> {
        std::iter::once(self.version.clone())
            .chain(self.floating.iter().cloned())
            .collect()
    }
}

/// Plan the release: fetch, pick the version, resolve floating tags.
///
/// Returns the result a dry run would report. Version errors abort here,
/// before anything is written.
pub fn plan_publish<R: Repository>(
    repo: &R,
    args: &PublishWorkflowArgs,
    config: &Config,
) -> Result<WorkflowResult> {
    let mut warnings = Vec::new();

    if args.fetch {
        if let Err(e) = repo.fetch_tags(&args.remote) {
            warn!(remote = %args.remote, error = %e, "fetching tags failed");
            warnings.push(BoundaryWarning::FetchFailed {
                remote: args.remote.clone(),
                reason: e.to_string(),
            });
        }
    }

    let version = match &args.version {
        Some(version) => version.clone(),
        None => {
            let next = next_version(repo, config)?;
            warnings.extend(next.warnings);
            next.version.to_string()
        }
    };

    let existing = repo.list_tags()?;
    let resolved = resolve_release(&version, &existing)?;
    warnings.extend(resolved.warnings);

    Ok(WorkflowResult {
        version,
        floating: resolved.floating,
        pushed: false,
        dry_run: true,
        warnings,
    })
}

/// Carry out a planned release: create the tags at HEAD and push them.
///
/// The primary tag is never forced; floating tags are moved. If a tag cannot
/// be created, the tags already written are put back so the release can be
/// retried. A failed push leaves the local tags in place and the error names
/// them.
pub fn execute_publish<R: Repository>(
    repo: &R,
    args: &PublishWorkflowArgs,
    mut plan: WorkflowResult,
) -> Result<WorkflowResult> {
    let head = repo.head_oid()?;
    let previous = plan
        .floating
        .iter()
        .map(|tag| Ok((tag.as_str(), repo.find_tag_oid(tag)?)))
        .collect::<Result<Vec<_>>>()?;

    repo.create_tag(&plan.version, head, false)?;
    for (moved, tag) in plan.floating.iter().enumerate() {
        if let Err(e) = repo.create_tag(tag, head, true) {
            roll_back_tags(repo, &plan.version, &previous[..moved]);
            return Err(e);
        }
    }
    info!(version = %plan.version, floating = ?plan.floating, %head, "created release tags");

    if args.push {
        push_release_tags(repo, &args.remote, &plan).map_err(|e| {
            let reason = match e {
                ReleaseError::Remote(reason) => reason,
                other => other.to_string(),
            };
            ReleaseError::remote(format!(
                "{}\nTags {} were created locally. Push them with:\n{}",
                reason,
                plan.tags().join(", "),
                format_manual_push_instruction(&plan.version, &plan.floating, &args.remote)
            ))
        })?;
        plan.pushed = true;
    }

    plan.dry_run = false;
    Ok(plan)
}

fn push_release_tags<R: Repository>(repo: &R, remote: &str, plan: &WorkflowResult) -> Result<()> {
    repo.push_tags(remote, &[plan.version.as_str()], false)?;
    if !plan.floating.is_empty() {
        let floating: Vec<&str> = plan.floating.iter().map(String::as_str).collect();
        repo.push_tags(remote, &floating, true)?;
    }
    Ok(())
}

/// Delete the new release tag and return moved floating tags to their
/// previous targets. Failures here are logged; the original error wins.
fn roll_back_tags<R: Repository>(repo: &R, version: &str, moved: &[(&str, Option<Oid>)]) {
    if let Err(e) = repo.delete_tag(version) {
        warn!(tag = version, error = %e, "failed to remove release tag");
    }
    for (tag, previous) in moved {
        let restored = match previous {
            Some(oid) => repo.create_tag(tag, *oid, true),
            None => repo.delete_tag(tag),
        };
        if let Err(e) = restored {
            warn!(tag = *tag, error = %e, "failed to restore floating tag");
        }
    }
    info!(version, "rolled back release tags");
}

/// Main publish workflow
///
/// 1. Fetch tags from the remote (failure is only a warning)
/// 2. Take the explicit version or derive it from commits
/// 3. Resolve floating tags against the existing tags
/// 4. Unless dry-run: create the tags and optionally push them
pub fn run_publish_workflow<R: Repository>(
    repo: &R,
    args: &PublishWorkflowArgs,
    config: &Config,
) -> Result<WorkflowResult> {
    let plan = plan_publish(repo, args, config)?;
    if args.dry_run {
        return Ok(plan);
    }
    execute_publish(repo, args, plan)
}
