//! Pure formatting functions for UI output.
//!
//! Status lines go to stdout, errors and warnings to stderr. Anything meant
//! for scripts (`resolve`, `next`) is printed plainly by the caller instead.

use console::style;

use crate::boundary::BoundaryWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Render the tags a release will create, primary tag first.
pub fn format_tag_plan(version: &str, floating: &[String]) -> String {
    let mut out = format!("{}\n  {} {}", style("Release tags:").bold(), style("●").green(), version);
    if floating.is_empty() {
        out.push_str(&format!("\n  {}", style("(no floating tags)").dim()));
    }
    for tag in floating {
        out.push_str(&format!("\n  {} {}", style("↻").cyan(), tag));
    }
    out
}

/// Display the tags a release will create.
pub fn display_tag_plan(version: &str, floating: &[String]) {
    println!("\n{}", format_tag_plan(version, floating));
}

/// Commands that push locally created release tags.
///
/// Only floating tags are forced; the primary tag is pushed plainly.
pub fn format_manual_push_instruction(version: &str, floating: &[String], remote: &str) -> String {
    let mut commands = vec![format!("git push {} {}", remote, version)];
    if !floating.is_empty() {
        commands.push(format!("git push --force {} {}", remote, floating.join(" ")));
    }
    commands.join("\n")
}

/// Display manual push instruction for tags created locally.
///
/// # Arguments
/// * `version` - The primary release tag
/// * `floating` - Floating tags moved to the same commit
/// * `remote` - The remote name (e.g., "origin")
pub fn display_manual_push_instruction(version: &str, floating: &[String], remote: &str) {
    let commands = format_manual_push_instruction(version, floating, remote);
    println!("\n{} To push these tags later, run:", style("→").yellow());
    for command in commands.lines() {
        println!("  {}", style(command).cyan());
    }
}
