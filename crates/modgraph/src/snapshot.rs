//! The persisted form of a graph.
//!
//! A snapshot is a JSON document holding the module records and edges. The
//! derived indices are not stored; they are rebuilt when the snapshot is
//! turned back into a [`Graph`]. Loading checks `format_version` before
//! decoding anything else, so an incompatible layout fails with a precise
//! error instead of a field-level decode failure.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{FORMAT_VERSION, Graph};
use crate::types::{Edge, Module};

/// A serializable graph plus provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Layout version, see [`FORMAT_VERSION`]
    pub format_version: u32,
    /// Project name
    pub project: String,
    /// When the indexing pass ran
    pub indexed_at: DateTime<Utc>,
    /// Module records by key
    pub modules: BTreeMap<String, Module>,
    /// Edges, sorted
    pub edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    format_version: Option<u32>,
}

impl Snapshot {
    /// Capture `graph` for `project`.
    ///
    /// The timestamp is supplied by the caller so the same graph always
    /// serializes to the same bytes.
    #[must_use]
    pub fn new(project: impl Into<String>, indexed_at: DateTime<Utc>, graph: &Graph) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            project: project.into(),
            indexed_at,
            modules: graph
                .modules()
                .map(|m| (m.path.clone(), m.clone()))
                .collect(),
            edges: graph.edges().to_vec(),
        }
    }

    /// Pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Decode a snapshot, checking its format version first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphVersionMismatch`] for any other version,
    /// [`Error::InvalidSnapshot`] when the version is missing, and
    /// [`Error::Json`] for malformed JSON.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let probe: VersionProbe = serde_json::from_slice(bytes)?;
        match probe.format_version {
            Some(FORMAT_VERSION) => {}
            Some(found) => {
                return Err(Error::GraphVersionMismatch {
                    expected: FORMAT_VERSION,
                    found,
                });
            }
            None => {
                return Err(Error::InvalidSnapshot(
                    "missing format_version".to_string(),
                ));
            }
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Rebuild the graph, validating keys and edge endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSnapshot`] if a record is filed under a key
    /// other than its own path, or if an edge points at a missing module.
    pub fn into_graph(self) -> Result<Graph> {
        if let Some((key, module)) = self.modules.iter().find(|(key, m)| **key != m.path) {
            return Err(Error::InvalidSnapshot(format!(
                "module {} is stored under key {key}",
                module.path
            )));
        }
        debug!(
            project = %self.project,
            modules = self.modules.len(),
            edges = self.edges.len(),
            "Rebuilding graph from snapshot"
        );
        Graph::from_parts(self.modules.into_values(), self.edges)
    }
}

/// Decode `bytes` and rebuild the graph in one step.
///
/// # Errors
///
/// See [`Snapshot::from_json_slice`] and [`Snapshot::into_graph`].
pub fn load_graph(bytes: &[u8]) -> Result<Graph> {
    Snapshot::from_json_slice(bytes)?.into_graph()
}
