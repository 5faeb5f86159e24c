//! `modgraph search` command implementation.

use anyhow::Result;
use colored::Colorize;
use modgraph::query;

use super::display::{OutputMode, print_json, print_wrapped};
use crate::workspace::Workspace;

/// Run the search command.
pub async fn run(workspace: &Workspace, text: &str, top_k: usize, mode: OutputMode) -> Result<()> {
    let graph = workspace.load_graph().await?;
    let hits = query::search(&graph, text, top_k);

    if mode == OutputMode::Json {
        print_json(&hits)?;
        return Ok(());
    }

    if hits.is_empty() {
        println!("No modules match \"{text}\"");
        if graph.is_empty() {
            println!(
                "\n{}: The graph is empty. Run '{}' to index your project.",
                "hint".dimmed(),
                "modgraph index".cyan()
            );
        }
        return Ok(());
    }

    println!(
        "Found {} modules matching \"{}\":",
        hits.len().to_string().green().bold(),
        text.cyan()
    );
    println!();

    for hit in &hits {
        println!(
            "  {} {}",
            hit.module.white().bold(),
            format!("({:.3})", hit.score).dimmed()
        );
        if let Some(module) = graph.module(&hit.module) {
            if !module.summary.is_empty() {
                print_wrapped(&module.summary, 4);
            }
        }
    }

    Ok(())
}
