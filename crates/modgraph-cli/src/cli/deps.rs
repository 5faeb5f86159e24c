//! `modgraph deps` command implementation.

use anyhow::Result;
use colored::Colorize;
use modgraph::{DependencyCache, EXTERNAL_PREFIX, Graph, query};
use serde::Serialize;
use tracing::debug;

use super::display::{OutputMode, print_json, print_modules};
use crate::workspace::Workspace;

#[derive(Debug, Serialize)]
struct DepsOutput<'a> {
    module: &'a str,
    direction: &'static str,
    transitive: bool,
    modules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external: Vec<String>,
}

/// Run the deps command.
///
/// Without flags, lists the modules `module` imports directly. `reverse`
/// lists importers instead; `transitive` follows edges all the way.
pub async fn run(
    workspace: &Workspace,
    module: &str,
    reverse: bool,
    transitive: bool,
    mode: OutputMode,
) -> Result<()> {
    let graph = workspace.load_graph().await?;

    let modules = match (reverse, transitive) {
        (false, false) => query::dependencies(&graph, module)?,
        (true, false) => query::dependents(&graph, module)?,
        (true, true) => query::impact(&graph, module)?.transitive,
        (false, true) => {
            let cache = DependencyCache::from_options(&workspace.cache);
            let deps = cache.get_transitive_deps(&graph, module)?;
            debug!(stats = ?cache.stats(), "Transitive dependency lookup");
            deps.iter().cloned().collect()
        }
    };
    let external = if reverse {
        Vec::new()
    } else {
        external_packages(&graph, module)
    };

    let output = DepsOutput {
        module,
        direction: if reverse { "dependents" } else { "dependencies" },
        transitive,
        modules,
        external,
    };

    match mode {
        OutputMode::Json => print_json(&output)?,
        OutputMode::Text => print_deps(&output),
    }
    Ok(())
}

fn external_packages(graph: &Graph, module: &str) -> Vec<String> {
    let mut packages: Vec<String> = graph
        .edges_from(module)
        .filter(|edge| edge.is_external())
        .map(|edge| {
            edge.to
                .strip_prefix(EXTERNAL_PREFIX)
                .unwrap_or(&edge.to)
                .to_string()
        })
        .collect();
    packages.sort();
    packages.dedup();
    packages
}

fn print_deps(output: &DepsOutput<'_>) {
    let scope = if output.transitive { "Transitive" } else { "Direct" };
    println!(
        "{} {} of {} ({}):",
        scope.white().bold(),
        output.direction.white().bold(),
        output.module.cyan().bold(),
        output.modules.len().to_string().green()
    );
    print_modules(&output.modules, "(none)");

    if !output.external.is_empty() {
        println!();
        println!("  {}:", "External packages".white().bold());
        print_modules(&output.external, "(none)");
    }
}
