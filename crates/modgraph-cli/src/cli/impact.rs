//! `modgraph impact` command implementation.

use anyhow::Result;
use colored::Colorize;
use modgraph::{Impact, query};

use super::display::{OutputMode, colorize_risk, print_json, print_modules};
use crate::workspace::Workspace;

/// Run the impact command.
pub async fn run(workspace: &Workspace, module: &str, mode: OutputMode) -> Result<()> {
    let graph = workspace.load_graph().await?;
    let impact = query::impact(&graph, module)?;

    match mode {
        OutputMode::Json => print_json(&impact)?,
        OutputMode::Text => print_impact_analysis(&impact),
    }
    Ok(())
}

fn print_impact_analysis(impact: &Impact) {
    println!("Impact analysis for {}:", impact.module.cyan().bold());
    println!();
    println!("  {}: {}", "Risk".white().bold(), colorize_risk(impact.risk));
    println!();

    println!(
        "  {} ({} modules):",
        "Direct dependents".white().bold(),
        impact.direct.len().to_string().green()
    );
    print_modules(&impact.direct, "(none)");

    println!();

    println!(
        "  {} ({} modules total):",
        "Transitive dependents".white().bold(),
        impact.transitive.len().to_string().yellow()
    );
    let beyond_direct = &impact.transitive[impact.direct.len().min(impact.transitive.len())..];
    print_modules(beyond_direct, "(none beyond direct)");
}
