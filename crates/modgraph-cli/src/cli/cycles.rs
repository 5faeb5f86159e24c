//! `modgraph cycles` command implementation.

use anyhow::Result;
use colored::Colorize;
use modgraph::query;

use super::display::{OutputMode, print_json};
use crate::workspace::Workspace;

/// Run the cycles command.
pub async fn run(workspace: &Workspace, mode: OutputMode) -> Result<()> {
    let graph = workspace.load_graph().await?;
    let cycles = query::cycles(&graph);

    if mode == OutputMode::Json {
        print_json(&cycles)?;
        return Ok(());
    }

    if cycles.is_empty() {
        println!("{}", "No circular dependencies detected.".green());
        return Ok(());
    }

    println!(
        "Found {} circular dependencies:",
        cycles.len().to_string().red().bold()
    );
    println!();

    for (i, cycle) in cycles.iter().enumerate() {
        println!(
            "  {} {} ({} modules):",
            "Cycle".yellow().bold(),
            i + 1,
            cycle.len()
        );
        for key in cycle {
            println!("    {} {}", "•".dimmed(), key.dimmed());
        }
    }

    Ok(())
}
