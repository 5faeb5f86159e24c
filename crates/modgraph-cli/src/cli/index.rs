//! `modgraph index` command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use modgraph::{IndexReport, Snapshot, index_project};
use modgraph_store::{SnapshotLock, write_atomic};
use serde::Serialize;
use tracing::{info, warn};

use super::display::{OutputMode, print_json};
use crate::workspace::Workspace;

const MAX_LISTED_PROBLEMS: usize = 5;

#[derive(Debug, Serialize)]
struct IndexSummary<'a> {
    project: &'a str,
    snapshot: String,
    modules: usize,
    edges: usize,
    version: String,
    written: bool,
    failures: Vec<String>,
    unresolved: Vec<String>,
    duration_ms: u64,
}

/// Run the index command.
///
/// Holds the snapshot lock for the whole pass. The snapshot is rewritten
/// only when the graph version changed.
pub async fn run(workspace: &Workspace, mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Text {
        println!(
            "{} {}...",
            "Indexing".cyan().bold(),
            workspace.root.display()
        );
    }

    let _lock = SnapshotLock::acquire(&workspace.snapshot_path).await?;

    let previous_version = match workspace.read_snapshot().await {
        Ok(Some(snapshot)) => snapshot.into_graph().ok().map(|graph| graph.version()),
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Existing snapshot is unreadable, replacing it");
            None
        }
    };

    let root = workspace.root.clone();
    let options = workspace.index.clone();
    let report = tokio::task::spawn_blocking(move || index_project(&root, &options))
        .await
        .context("indexing task failed")??;

    let written = previous_version != Some(report.graph.version());
    if written {
        let snapshot = Snapshot::new(&workspace.project, Utc::now(), &report.graph);
        write_atomic(&workspace.snapshot_path, &snapshot.to_json_vec()?).await?;
        info!(snapshot = %workspace.snapshot_path.display(), "Snapshot written");
    } else {
        info!("Graph unchanged, snapshot left as is");
    }

    match mode {
        OutputMode::Json => print_json(&summary(workspace, &report, written))?,
        OutputMode::Text => print_report(workspace, &report, written),
    }
    Ok(())
}

fn summary<'a>(workspace: &'a Workspace, report: &IndexReport, written: bool) -> IndexSummary<'a> {
    IndexSummary {
        project: &workspace.project,
        snapshot: workspace.snapshot_path.display().to_string(),
        modules: report.graph.len(),
        edges: report.graph.edges().len(),
        version: format!("{:016x}", report.graph.version()),
        written,
        failures: report.failures.iter().map(ToString::to_string).collect(),
        unresolved: report.unresolved.iter().map(ToString::to_string).collect(),
        duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
    }
}

fn print_report(workspace: &Workspace, report: &IndexReport, written: bool) {
    println!();
    println!(
        "{} {} modules, {} edges",
        "Indexed".green().bold(),
        report.graph.len(),
        report.graph.edges().len()
    );
    println!("{}: {:.2?}", "Duration".dimmed(), report.duration);

    if written {
        println!(
            "{}: {}",
            "Snapshot".dimmed(),
            workspace.snapshot_path.display()
        );
    } else {
        println!("{}", "Graph unchanged; snapshot not rewritten".dimmed());
    }

    if !report.files_skipped.is_empty() {
        println!(
            "{}: {} files (non-UTF-8 path)",
            "Skipped".yellow(),
            report.files_skipped.len()
        );
    }

    if !report.dirs_skipped.is_empty() {
        println!(
            "{}: {} directories (unreadable)",
            "Skipped".yellow(),
            report.dirs_skipped.len()
        );
    }

    if !report.failures.is_empty() {
        println!();
        println!(
            "{} ({}):",
            "Degraded modules".red().bold(),
            report.failures.len()
        );
        for failure in report.failures.iter().take(MAX_LISTED_PROBLEMS) {
            println!("  {} {failure}", "•".red());
        }
        if report.failures.len() > MAX_LISTED_PROBLEMS {
            println!(
                "  ... and {} more",
                report.failures.len() - MAX_LISTED_PROBLEMS
            );
        }
    }

    if !report.unresolved.is_empty() {
        println!();
        println!(
            "{}: {}",
            "Unresolved internal imports".dimmed(),
            report.unresolved.len()
        );
        for unresolved in report.unresolved.iter().take(MAX_LISTED_PROBLEMS) {
            println!("  {} {unresolved}", "•".dimmed());
        }
    }
}
