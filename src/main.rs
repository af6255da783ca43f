use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use release_tags::cli::orchestration::{self, PublishWorkflowArgs};
use release_tags::config::{self, Config};
use release_tags::git::{Git2Repository, Repository};
use release_tags::{logging, ui};

#[derive(Parser)]
#[command(
    name = "release-tags",
    version,
    about = "Resolve and publish floating release tags (latest, vMAJOR, vMAJOR.MINOR)"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v, -vv, -vvv)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the floating tags a version should receive, one per line
    Resolve {
        /// Target version, e.g. v1.2.3
        version: String,

        /// Existing tags
        tags: Vec<String>,

        #[arg(long, help = "Read existing tags from stdin, one per line")]
        stdin: bool,

        #[arg(long, help = "Include the tags of the git repository in the current directory")]
        git: bool,
    },

    /// Print the next version derived from conventional commits
    Next,

    /// Tag HEAD with a release and move its floating tags
    Publish {
        /// Version to publish; derived from commits when omitted
        version: Option<String>,

        #[arg(short, long, help = "Remote to fetch from and push to")]
        remote: Option<String>,

        #[arg(long, help = "Create tags locally without pushing")]
        no_push: bool,

        #[arg(long, help = "Do not fetch remote tags first")]
        no_fetch: bool,

        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,

        #[arg(short, long, help = "Skip confirmation prompts")]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("loading configuration")?;

    match args.command {
        Command::Resolve {
            version,
            tags,
            stdin,
            git,
        } => resolve(&version, tags, stdin, git),
        Command::Next => next(&config),
        Command::Publish {
            version,
            remote,
            no_push,
            no_fetch,
            dry_run,
            yes,
        } => {
            let mut workflow_args = PublishWorkflowArgs::from_config(&config);
            workflow_args.version = version;
            if let Some(remote) = remote {
                workflow_args.remote = remote;
            }
            workflow_args.push &= !no_push;
            workflow_args.fetch &= !no_fetch;
            workflow_args.dry_run = dry_run;
            publish(&config, &workflow_args, yes)
        }
    }
}

fn resolve(version: &str, mut existing: Vec<String>, stdin: bool, git: bool) -> Result<()> {
    if stdin {
        existing.extend(read_tags(io::stdin().lock()).context("reading tags from stdin")?);
    }
    if git {
        let repo = open_repository()?;
        existing.extend(repo.list_tags()?);
    }

    let resolved = orchestration::resolve_release(version, &existing)?;
    for warning in &resolved.warnings {
        ui::display_boundary_warning(warning);
    }
    for tag in &resolved.floating {
        println!("{}", tag);
    }
    Ok(())
}

fn next(config: &Config) -> Result<()> {
    let repo = open_repository()?;
    let next = orchestration::next_version(&repo, config)?;
    for warning in &next.warnings {
        ui::display_boundary_warning(warning);
    }
    println!("{}", next.version);
    Ok(())
}

fn publish(config: &Config, args: &PublishWorkflowArgs, yes: bool) -> Result<()> {
    let repo = open_repository()?;

    if args.fetch {
        ui::display_status(&format!("Fetching tags from '{}'...", args.remote));
    }
    let plan = orchestration::plan_publish(&repo, args, config)?;
    for warning in &plan.warnings {
        ui::display_boundary_warning(warning);
    }
    ui::display_tag_plan(&plan.version, &plan.floating);

    if args.dry_run {
        ui::display_status("Dry run: no tags were created");
        return Ok(());
    }

    if !yes && ui::is_interactive() && !ui::confirm_action("Create these tags?")? {
        println!("Operation cancelled by user.");
        return Ok(());
    }

    let result = orchestration::execute_publish(&repo, args, plan)?;
    let tags = result.tags();
    if result.pushed {
        ui::display_success(&format!(
            "Published {} to '{}'",
            tags.join(", "),
            args.remote
        ));
    } else {
        ui::display_success(&format!("Created {} locally", tags.join(", ")));
        ui::display_manual_push_instruction(&result.version, &result.floating, &args.remote);
    }
    Ok(())
}

fn open_repository() -> Result<Git2Repository> {
    Git2Repository::open(".").context("not in a git repository")
}

/// One tag per line; blank lines are skipped
fn read_tags<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut tags = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let tag = line.trim();
        if !tag.is_empty() {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_tags_skips_blank_lines() {
        let input = "v1.0.0\n\n  v1.1.0  \nlatest\n";
        let tags = read_tags(input.as_bytes()).unwrap();
        assert_eq!(tags, vec!["v1.0.0", "v1.1.0", "latest"]);
    }

    #[test]
    fn test_args_parse_publish() {
        let args = Args::try_parse_from([
            "release-tags",
            "publish",
            "v1.2.0",
            "--remote",
            "upstream",
            "--dry-run",
        ])
        .unwrap();
        match args.command {
            Command::Publish {
                version,
                remote,
                dry_run,
                no_push,
                ..
            } => {
                assert_eq!(version.as_deref(), Some("v1.2.0"));
                assert_eq!(remote.as_deref(), Some("upstream"));
                assert!(dry_run);
                assert!(!no_push);
            }
            _ => panic!("expected publish"),
        }
    }

    #[test]
    fn test_args_verbose_count() {
        let args = Args::try_parse_from(["release-tags", "-vv", "next"]).unwrap();
        assert_eq!(args.verbose, 2);
    }
}
