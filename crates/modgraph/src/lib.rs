//! # Modgraph: Local Module Dependency Graph
//!
//! Modgraph parses a source tree into per-module records (summary, public
//! interfaces, imports), links them into a dependency graph and answers
//! questions about it: which modules match a capability, what a change
//! breaks, and in which order modules should be generated.
//!
//! ## Design Philosophy
//!
//! - **Per-file, never all-or-nothing** - a file that fails to parse stays in
//!   the graph as a degraded record; indexing keeps going
//! - **Deterministic** - the same tree yields the same graph, ranking and
//!   snapshot bytes
//! - **Pure queries** - a [`Graph`] is immutable; re-indexing builds a new one
//! - **Library first** - persistence and the CLI live in sibling crates
//!
//! ## Quick Start
//!
//! ```no_run
//! use modgraph::{IndexOptions, index_project, query};
//! use std::path::Path;
//!
//! let report = index_project(Path::new("/path/to/project"), &IndexOptions::default())?;
//! let graph = &report.graph;
//!
//! for hit in query::search(graph, "memory optimization", 5) {
//!     println!("{:.2} {}", hit.score, hit.module);
//! }
//!
//! let impact = query::impact(graph, "src/auth.py")?;
//! println!("{} modules affected ({})", impact.transitive.len(), impact.risk);
//! # Ok::<(), modgraph::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod discovery;
mod error;
pub mod graph;
pub mod languages;
pub mod parser;
pub mod query;
pub mod resolver;
pub mod snapshot;
pub mod staleness;
mod types;

pub use cache::{CacheStats, DependencyCache};
pub use config::{CacheOptions, IndexOptions};
pub use error::{Error, ParseFailure, ParseFailureKind, Result, UnresolvedImport};
pub use graph::{BuildOutput, FORMAT_VERSION, Graph, GraphBuilder, GraphStats};
pub use snapshot::{Snapshot, load_graph};
pub use staleness::{StaleReport, content_hash, is_stale, stale_report};
pub use types::{
    EXTERNAL_PREFIX, Edge, EdgeKind, Impact, Import, Interface, InterfaceKind, Language, Module,
    ParseConfidence, Risk, SearchHit, SymbolUse, UseKind, external_key,
};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{info, warn};

use discovery::discover;
use parser::{ParsedModule, parse_file};
use resolver::ImportContext;

/// Everything one indexing pass produced.
#[derive(Debug, Clone)]
pub struct IndexReport {
    /// The built graph
    pub graph: Graph,
    /// Files kept as degraded records, with the reason
    pub failures: Vec<ParseFailure>,
    /// Internal imports that matched no module
    pub unresolved: Vec<UnresolvedImport>,
    /// Files skipped because their path is not valid UTF-8
    pub files_skipped: Vec<PathBuf>,
    /// Directories that could not be read (path, error reason)
    pub dirs_skipped: Vec<(PathBuf, String)>,
    /// How long the pass took
    pub duration: Duration,
}

/// Index every supported source file under `root`.
///
/// Files are parsed in parallel. Results are ordered by key before the graph
/// is built, so the outcome does not depend on scheduling.
///
/// # Errors
///
/// Returns [`Error::Config`] if `root` is not a directory. Per-file problems
/// never fail the pass; they are listed in [`IndexReport::failures`].
pub fn index_project(root: &Path, options: &IndexOptions) -> Result<IndexReport> {
    let start = Instant::now();
    let discovery = discover(root, options)?;

    let known: HashSet<String> = discovery.files.iter().map(|f| f.key.clone()).collect();
    let ctx = ImportContext::new(&known, &options.source_roots);

    // `discovery.files` is sorted by key and `collect` keeps input order.
    let parsed: Vec<ParsedModule> = discovery
        .files
        .par_iter()
        .map(|file| parse_file(root, &file.key, file.language, &ctx))
        .collect();

    let mut failures = Vec::new();
    let mut modules = Vec::with_capacity(parsed.len());
    for ParsedModule { module, failure } in parsed {
        if let Some(failure) = failure {
            warn!(file = %failure.path.display(), error = %failure.message, "Degraded module");
            failures.push(failure);
        }
        modules.push(module);
    }

    let BuildOutput { graph, unresolved } = GraphBuilder::new(options).build(modules);
    let duration = start.elapsed();

    info!(
        root = %root.display(),
        modules = graph.len(),
        edges = graph.edges().len(),
        failures = failures.len(),
        unresolved = unresolved.len(),
        duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        "Indexing complete"
    );

    Ok(IndexReport {
        graph,
        failures,
        unresolved,
        files_skipped: discovery.files_skipped,
        dirs_skipped: discovery.dirs_skipped,
        duration,
    })
}
