//! `modgraph stale` command implementation.

use anyhow::{Result, bail};
use colored::Colorize;
use modgraph::stale_report;

use super::display::{OutputMode, print_json, print_modules};
use crate::workspace::Workspace;

/// Run the stale command.
///
/// With `check`, a non-empty report is an error so scripts can gate on it.
pub async fn run(workspace: &Workspace, check: bool, mode: OutputMode) -> Result<()> {
    let graph = workspace.load_graph().await?;
    let root = workspace.root.clone();
    let options = workspace.index.clone();
    let report =
        tokio::task::spawn_blocking(move || stale_report(&graph, &root, &options)).await??;

    match mode {
        OutputMode::Json => print_json(&report)?,
        OutputMode::Text if report.is_clean() => {
            println!("{}", "Snapshot is up to date.".green());
        }
        OutputMode::Text => {
            println!(
                "{} {} changes since the last index:",
                "Stale:".yellow().bold(),
                report.len()
            );
            for (title, keys) in [
                ("Modified", &report.modified),
                ("Added", &report.added),
                ("Deleted", &report.deleted),
            ] {
                if !keys.is_empty() {
                    println!();
                    println!("  {} ({}):", title.white().bold(), keys.len());
                    print_modules(keys, "(none)");
                }
            }
            println!(
                "\n{}: Run '{}' to refresh the snapshot.",
                "hint".dimmed(),
                "modgraph index".cyan()
            );
        }
    }

    if check && !report.is_clean() {
        bail!("{} modules changed since the last index", report.len());
    }
    Ok(())
}
