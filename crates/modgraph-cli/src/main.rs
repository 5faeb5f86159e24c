//! Modgraph CLI - module dependency graphs from the command line.
//!
//! Modgraph indexes a source tree into a module graph, persists it as a JSON
//! snapshot, and answers impact, ordering, cycle and search queries against
//! that snapshot.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use modgraph::Language;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod workspace;

use cli::display::OutputMode;
use workspace::Workspace;

/// Modgraph: module dependency graph and change-impact queries.
#[derive(Debug, Parser)]
#[command(name = "modgraph")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Project name (defaults to `project:` in modgraph.yaml, then the root directory name)
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Index the project and write its snapshot
    Index {
        /// Only index these languages (python, rust, javascript, typescript)
        #[arg(short, long = "language", value_parser = parse_language)]
        languages: Vec<Language>,
    },

    /// Rank modules by relevance to a free-text query
    Search {
        /// Search text, matched against paths, interfaces and summaries
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long, default_value = "10")]
        top_k: usize,
    },

    /// Show which modules are affected by changing a module
    Impact {
        /// Module key (project-relative path)
        module: String,
    },

    /// Print modules in dependency order (dependencies first)
    Order {
        /// Restrict the ordering to these modules (defaults to all)
        modules: Vec<String>,
    },

    /// List a module's dependencies or dependents
    Deps {
        /// Module key (project-relative path)
        module: String,

        /// List dependents instead of dependencies
        #[arg(long)]
        reverse: bool,

        /// Follow edges transitively
        #[arg(short, long)]
        transitive: bool,
    },

    /// Detect circular dependencies
    Cycles,

    /// Compare the snapshot with the files on disk
    Stale {
        /// Exit with an error if anything changed
        #[arg(long)]
        check: bool,
    },

    /// Show graph statistics
    Stats,
}

fn parse_language(tag: &str) -> Result<Language, String> {
    Language::from_tag(tag).ok_or_else(|| {
        format!("unknown language '{tag}'. Valid languages: python, rust, javascript, typescript")
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let languages = match &cli.command {
        Commands::Index { languages } => languages.as_slice(),
        _ => &[],
    };
    let workspace = Workspace::resolve(&root, cli.project.as_deref(), languages).await?;
    let mode = OutputMode::from_json_flag(cli.json);

    match cli.command {
        Commands::Index { .. } => cli::index::run(&workspace, mode).await,
        Commands::Search { query, top_k } => cli::search::run(&workspace, &query, top_k, mode).await,
        Commands::Impact { module } => cli::impact::run(&workspace, &module, mode).await,
        Commands::Order { modules } => cli::order::run(&workspace, &modules, mode).await,
        Commands::Deps {
            module,
            reverse,
            transitive,
        } => cli::deps::run(&workspace, &module, reverse, transitive, mode).await,
        Commands::Cycles => cli::cycles::run(&workspace, mode).await,
        Commands::Stale { check } => cli::stale::run(&workspace, check, mode).await,
        Commands::Stats => cli::stats::run(&workspace, mode).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn index_accepts_repeated_languages() {
        let cli = Cli::try_parse_from(["modgraph", "index", "-l", "py", "--language", "rust"])
            .unwrap();
        match cli.command {
            Commands::Index { languages } => {
                assert_eq!(languages, vec![Language::Python, Language::Rust]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_language_is_rejected() {
        assert!(Cli::try_parse_from(["modgraph", "index", "-l", "cobol"]).is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["modgraph", "cycles", "--json", "-r", "/tmp/p", "-vv"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/p")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn search_defaults_to_ten_results() {
        let cli = Cli::try_parse_from(["modgraph", "search", "billing"]).unwrap();
        match cli.command {
            Commands::Search { query, top_k } => {
                assert_eq!(query, "billing");
                assert_eq!(top_k, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[rstest]
    #[case::impact(&["modgraph", "impact"])]
    #[case::deps(&["modgraph", "deps"])]
    #[case::search(&["modgraph", "search"])]
    fn module_argument_is_required(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn order_accepts_empty_subset() {
        let cli = Cli::try_parse_from(["modgraph", "order"]).unwrap();
        assert!(matches!(cli.command, Commands::Order { modules } if modules.is_empty()));
    }
}
