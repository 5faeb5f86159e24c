//! `modgraph stats` command implementation.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use modgraph::{GraphStats, query};
use serde::Serialize;

use super::display::{OutputMode, print_json};
use crate::workspace::Workspace;

#[derive(Debug, Serialize)]
struct StatsOutput {
    project: String,
    indexed_at: DateTime<Utc>,
    version: String,
    cycles: usize,
    #[serde(flatten)]
    graph: GraphStats,
}

/// Run the stats command.
pub async fn run(workspace: &Workspace, mode: OutputMode) -> Result<()> {
    let snapshot = workspace.read_snapshot().await?.with_context(|| {
        format!(
            "no snapshot for project {}; run `modgraph index` first",
            workspace.project
        )
    })?;
    let project = snapshot.project.clone();
    let indexed_at = snapshot.indexed_at;
    let graph = snapshot.into_graph()?;

    let output = StatsOutput {
        project,
        indexed_at,
        version: format!("{:016x}", graph.version()),
        cycles: query::cycles(&graph).len(),
        graph: graph.stats(),
    };

    match mode {
        OutputMode::Json => print_json(&output)?,
        OutputMode::Text => print_stats(&output),
    }
    Ok(())
}

fn print_stats(output: &StatsOutput) {
    let stats = &output.graph;
    println!("{}", "Graph Statistics".white().bold());
    println!();
    println!("  {:<22} {}", "Project:".dimmed(), output.project);
    println!(
        "  {:<22} {}",
        "Indexed at:".dimmed(),
        output.indexed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  {:<22} {}", "Version:".dimmed(), output.version);
    println!();
    println!("  {:<22} {}", "Modules:".dimmed(), stats.modules);
    println!("  {:<22} {}", "Lines:".dimmed(), stats.lines);
    println!("  {:<22} {}", "Internal edges:".dimmed(), stats.internal_edges);
    println!("  {:<22} {}", "All edges:".dimmed(), stats.edges);
    println!(
        "  {:<22} {}",
        "External packages:".dimmed(),
        stats.external_packages
    );

    if !stats.by_language.is_empty() {
        println!();
        println!("  {}", "By language:".white().bold());
        for (language, count) in &stats.by_language {
            println!("    {:<20} {count}", language.as_str());
        }
    }

    println!();
    if stats.heuristic > 0 {
        println!(
            "  {:<22} {}",
            "Heuristic parses:".dimmed(),
            stats.heuristic.to_string().yellow()
        );
    }
    if stats.degraded > 0 {
        println!(
            "  {:<22} {}",
            "Degraded modules:".dimmed(),
            stats.degraded.to_string().red()
        );
    }
    let cycles = if output.cycles == 0 {
        "0".green()
    } else {
        output.cycles.to_string().red()
    };
    println!("  {:<22} {cycles}", "Cycles:".dimmed());
}
