//! Graph construction from module records.
//!
//! Each internal import is resolved against the set of module keys. Imports
//! that do not resolve are dropped from the edge set and listed in
//! [`BuildOutput::unresolved`]. External imports become edges to synthetic
//! `external:{package}` nodes. Where a module calls or subclasses a name it
//! imported from another module, a `calls` or `inherits` edge is added next
//! to the `imports` edge.
//!
//! Edges are merged per `(from, to, kind)` and emitted sorted, so the same
//! records always produce the same graph.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, info, warn};

use super::Graph;
use crate::config::IndexOptions;
use crate::error::UnresolvedImport;
use crate::resolver::{self, ImportContext};
use crate::types::{Edge, EdgeKind, Module, UseKind, external_key};

/// A built graph plus the imports that could not be placed in it.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// The graph
    pub graph: Graph,
    /// Internal imports dropped from the edge set
    pub unresolved: Vec<UnresolvedImport>,
}

/// Builds a [`Graph`] from module records.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    source_roots: Vec<String>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(&IndexOptions::default())
    }
}

type EdgeKey = (String, String, EdgeKind);

impl GraphBuilder {
    /// Create a builder resolving imports the way `options` describes.
    #[must_use]
    pub fn new(options: &IndexOptions) -> Self {
        Self {
            source_roots: options.source_roots.clone(),
        }
    }

    /// Build a graph from `modules`.
    ///
    /// If two records share a key, the first one wins.
    pub fn build(&self, modules: impl IntoIterator<Item = Module>) -> BuildOutput {
        let mut by_key: BTreeMap<String, Module> = BTreeMap::new();
        for module in modules {
            if by_key.contains_key(&module.path) {
                warn!(module = %module.path, "Duplicate module key, keeping first record");
                continue;
            }
            by_key.insert(module.path.clone(), module);
        }

        let known: HashSet<String> = by_key.keys().cloned().collect();
        let ctx = ImportContext::new(&known, &self.source_roots);

        let mut edges: BTreeMap<EdgeKey, BTreeSet<String>> = BTreeMap::new();
        let mut unresolved = Vec::new();

        for module in by_key.values() {
            add_internal_edges(module, &ctx, &mut edges, &mut unresolved);

            for import in &module.imports_external {
                let package = resolver::external_package(module.language, &import.target);
                edges
                    .entry((module.path.clone(), external_key(&package), EdgeKind::Imports))
                    .or_default()
                    .extend(import.names.iter().cloned());
            }
        }

        let edges: Vec<Edge> = edges
            .into_iter()
            .map(|((from, to, kind), specifics)| Edge {
                from,
                to,
                kind,
                specifics: specifics.into_iter().collect(),
            })
            .collect();

        info!(
            modules = by_key.len(),
            edges = edges.len(),
            unresolved = unresolved.len(),
            "Graph built"
        );

        BuildOutput {
            graph: Graph::assemble(by_key, edges),
            unresolved,
        }
    }
}

fn add_internal_edges(
    module: &Module,
    ctx: &ImportContext<'_>,
    edges: &mut BTreeMap<EdgeKey, BTreeSet<String>>,
    unresolved: &mut Vec<UnresolvedImport>,
) {
    let called: BTreeSet<&str> = module
        .symbol_uses
        .iter()
        .filter(|u| u.kind == UseKind::Call)
        .map(|u| u.name.as_str())
        .collect();
    let inherited: BTreeSet<&str> = module
        .symbol_uses
        .iter()
        .filter(|u| u.kind == UseKind::Inherit)
        .map(|u| u.name.as_str())
        .collect();

    for import in &module.imports_internal {
        let targets = resolver::resolve_import(module.language, &module.path, import, ctx);
        if targets.is_empty() {
            debug!(
                module = %module.path,
                target = %import.target,
                "Import does not resolve, dropping edge"
            );
            unresolved.push(UnresolvedImport {
                from: module.path.clone(),
                target: import.target.clone(),
                reason: "no module in the tree matches this import".to_string(),
            });
            continue;
        }

        for (to, names) in targets {
            if to == module.path {
                continue;
            }

            let mut add = |kind: EdgeKind, specifics: Vec<&String>| {
                edges
                    .entry((module.path.clone(), to.clone(), kind))
                    .or_default()
                    .extend(specifics.into_iter().cloned());
            };

            add(EdgeKind::Imports, names.iter().collect());

            let calls: Vec<&String> = names
                .iter()
                .filter(|n| called.contains(n.as_str()))
                .collect();
            if !calls.is_empty() {
                add(EdgeKind::Calls, calls);
            }

            let bases: Vec<&String> = names
                .iter()
                .filter(|n| inherited.contains(n.as_str()))
                .collect();
            if !bases.is_empty() {
                add(EdgeKind::Inherits, bases);
            }
        }
    }
}

/// Build a graph with default resolution settings.
#[must_use]
pub fn build(modules: impl IntoIterator<Item = Module>) -> Graph {
    GraphBuilder::default().build(modules).graph
}
