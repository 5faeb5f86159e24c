//! `modgraph order` command implementation.

use anyhow::Result;
use colored::Colorize;
use modgraph::query;

use super::display::{OutputMode, print_json};
use crate::workspace::Workspace;

/// Run the order command.
///
/// An empty `modules` list orders the whole graph.
pub async fn run(workspace: &Workspace, modules: &[String], mode: OutputMode) -> Result<()> {
    let graph = workspace.load_graph().await?;
    let subset = (!modules.is_empty()).then_some(modules);
    let order = query::topo_sort(&graph, subset)?;

    if mode == OutputMode::Json {
        print_json(&order)?;
        return Ok(());
    }

    println!(
        "{} ({} modules, dependencies first):",
        "Build order".white().bold(),
        order.len()
    );
    let width = order.len().to_string().len();
    for (i, key) in order.iter().enumerate() {
        println!("  {} {key}", format!("{:>width$}.", i + 1).dimmed());
    }
    Ok(())
}
