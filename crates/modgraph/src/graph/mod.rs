//! The module graph.
//!
//! A [`Graph`] owns the module records and the edge list. Two lookup tables
//! are derived from the edges: the dependents index (who imports a module)
//! and the dependencies index (what a module imports). Both are built only
//! in [`Graph::assemble`], the single place a graph comes into existence, so
//! they cannot drift from the edges. A graph is never mutated afterwards;
//! re-indexing produces a new value with a new [`Graph::version`].
//!
//! Only edges between modules enter the indices. Edges to `external:`
//! nodes are kept in the edge list for reporting.

mod builder;

pub use builder::{BuildOutput, GraphBuilder, build};

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::{Edge, Language, Module, ParseConfidence};

/// Version of the persisted snapshot layout.
pub const FORMAT_VERSION: u32 = 1;

/// An immutable module dependency graph.
#[derive(Debug, Clone)]
pub struct Graph {
    modules: BTreeMap<String, Module>,
    edges: Vec<Edge>,
    dependents_index: HashMap<String, Vec<String>>,
    dependencies_index: HashMap<String, Vec<String>>,
    version: u64,
}

impl Graph {
    /// Create a graph from records and edges, validating every endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSnapshot`] if two modules share a key, an
    /// edge starts at an unknown module, or an internal edge ends at one.
    pub fn from_parts(modules: impl IntoIterator<Item = Module>, edges: Vec<Edge>) -> Result<Self> {
        let mut by_key = BTreeMap::new();
        for module in modules {
            let key = module.path.clone();
            if by_key.insert(key.clone(), module).is_some() {
                return Err(Error::InvalidSnapshot(format!("duplicate module key {key}")));
            }
        }

        for edge in &edges {
            if !by_key.contains_key(&edge.from) {
                return Err(Error::InvalidSnapshot(format!(
                    "edge source {} is not a module",
                    edge.from
                )));
            }
            if !edge.is_external() && !by_key.contains_key(&edge.to) {
                return Err(Error::InvalidSnapshot(format!(
                    "edge target {} is not a module",
                    edge.to
                )));
            }
        }

        Ok(Self::assemble(by_key, edges))
    }

    /// Build the derived indices and version stamp.
    ///
    /// Callers guarantee that every endpoint exists.
    pub(crate) fn assemble(modules: BTreeMap<String, Module>, mut edges: Vec<Edge>) -> Self {
        edges.sort();
        edges.dedup();

        let mut dependents_index: HashMap<String, Vec<String>> = HashMap::new();
        let mut dependencies_index: HashMap<String, Vec<String>> = HashMap::new();
        for edge in edges.iter().filter(|e| !e.is_external()) {
            dependents_index
                .entry(edge.to.clone())
                .or_default()
                .push(edge.from.clone());
            dependencies_index
                .entry(edge.from.clone())
                .or_default()
                .push(edge.to.clone());
        }
        for list in dependents_index
            .values_mut()
            .chain(dependencies_index.values_mut())
        {
            list.sort();
            list.dedup();
        }

        let version = compute_version(&modules, &edges);
        Self {
            modules,
            edges,
            dependents_index,
            dependencies_index,
            version,
        }
    }

    /// An empty graph.
    #[must_use]
    pub fn empty() -> Self {
        Self::assemble(BTreeMap::new(), Vec::new())
    }

    /// Content-derived stamp; equal graphs share a version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Module records in key order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Module keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Look up a module by key.
    #[must_use]
    pub fn module(&self, key: &str) -> Option<&Module> {
        self.modules.get(key)
    }

    /// Whether `key` names a module in this graph.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.modules.contains_key(key)
    }

    /// All edges, sorted.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the graph has no modules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules that depend on `key` directly, sorted. Empty for unknown keys.
    #[must_use]
    pub fn dependents_of(&self, key: &str) -> &[String] {
        self.dependents_index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Modules `key` depends on directly, sorted. Empty for unknown keys.
    #[must_use]
    pub fn dependencies_of(&self, key: &str) -> &[String] {
        self.dependencies_index.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edges leaving `key`, including edges to external packages.
    pub fn edges_from<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Edge> {
        // Edges are sorted by `from`, so the matching run is contiguous.
        let start = self.edges.partition_point(|e| e.from.as_str() < key);
        self.edges[start..].iter().take_while(move |e| e.from == key)
    }

    /// Summary counts.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            modules: self.modules.len(),
            edges: self.edges.len(),
            ..GraphStats::default()
        };

        for module in self.modules.values() {
            *stats.by_language.entry(module.language).or_default() += 1;
            if module.parse_confidence == ParseConfidence::Heuristic {
                stats.heuristic += 1;
            }
            if module.is_degraded() {
                stats.degraded += 1;
            }
            stats.lines += module.line_count;
        }

        let mut externals: Vec<&str> = Vec::new();
        for edge in &self.edges {
            if edge.is_external() {
                externals.push(&edge.to);
            } else {
                stats.internal_edges += 1;
            }
        }
        externals.sort_unstable();
        externals.dedup();
        stats.external_packages = externals.len();

        stats
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::empty()
    }
}

/// Counts describing a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of modules
    pub modules: usize,
    /// Number of edges of any kind
    pub edges: usize,
    /// Edges between two modules
    pub internal_edges: usize,
    /// Distinct external packages referenced
    pub external_packages: usize,
    /// Modules per language
    pub by_language: BTreeMap<Language, usize>,
    /// Modules extracted with heuristics
    pub heuristic: usize,
    /// Modules with a parse error
    pub degraded: usize,
    /// Total source lines
    pub lines: usize,
}

fn compute_version(modules: &BTreeMap<String, Module>, edges: &[Edge]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(FORMAT_VERSION.to_le_bytes());
    for (key, module) in modules {
        hasher.update(key.as_bytes());
        hasher.update([0]);
        hasher.update(module.content_hash.as_bytes());
        hasher.update([0]);
    }
    for edge in edges {
        hasher.update(edge.from.as_bytes());
        hasher.update([0]);
        hasher.update(edge.to.as_bytes());
        hasher.update([0]);
        hasher.update(edge.kind.to_string().as_bytes());
        hasher.update([0]);
        for name in &edge.specifics {
            hasher.update(name.as_bytes());
            hasher.update([1]);
        }
    }
    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}
