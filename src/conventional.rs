//! Conventional commit analysis used to derive the next release version

use std::sync::OnceLock;

use regex::Regex;

use crate::config::ConventionalCommitsConfig;
pub use crate::domain::VersionBump;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^([a-z]+)(?:\(([^)]+)\))?(!?):\s*(.*)$").expect("commit header regex is valid")
    })
}

/// Parse the header of a commit message (`type(scope)!: description`).
///
/// Types not listed in the configuration, and messages that are not
/// conventional at all, are treated as `chore`. A commit is breaking when the
/// header carries `!` or the message contains a configured breaking indicator.
pub fn parse_conventional_commit(message: &str, config: &ConventionalCommitsConfig) -> ParsedCommit {
    let header = message.lines().next().unwrap_or_default();
    let indicated_breaking = config
        .breaking_change_indicators
        .iter()
        .any(|indicator| message.contains(indicator.as_str()));

    if let Some(captures) = header_regex().captures(header) {
        let commit_type = &captures[1];
        if config.types.iter().any(|t| t == commit_type) {
            return ParsedCommit {
                r#type: commit_type.to_string(),
                scope: captures.get(2).map(|m| m.as_str().to_string()),
                description: captures[4].to_string(),
                is_breaking_change: &captures[3] == "!" || indicated_breaking,
            };
        }
    }

    ParsedCommit {
        r#type: "chore".to_string(),
        scope: None,
        description: header.to_string(),
        is_breaking_change: indicated_breaking,
    }
}

/// Decide how far to bump the version for a batch of commit messages.
///
/// Breaking changes and major keywords win outright; features and minor
/// keywords give a minor bump; everything else is a patch.
pub fn determine_version_bump(commit_messages: &[String], config: &ConventionalCommitsConfig) -> VersionBump {
    let mut bump = VersionBump::Patch;

    for message in commit_messages {
        let parsed = parse_conventional_commit(message, config);

        if parsed.is_breaking_change || mentions_any(message, &config.major_keywords) {
            return VersionBump::Major;
        }

        if matches!(parsed.r#type.as_str(), "feat" | "feature")
            || mentions_any(message, &config.minor_keywords)
        {
            bump = VersionBump::Minor;
        }
    }

    bump
}

/// Case-insensitive whole-word match. Hyphens count as part of a word, so
/// `breaking` does not match `non-breaking`.
fn mentions_any(message: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .filter(|keyword| !keyword.is_empty())
        .any(|keyword| {
            let pattern = format!(r"(?i)(?:^|[^\w-]){}(?:$|[^\w-])", regex::escape(keyword));
            Regex::new(&pattern)
                .map(|re| re.is_match(message))
                .unwrap_or(false)
        })
}
