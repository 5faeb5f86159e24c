//! Resolved project context for command execution.
//!
//! Combines the command-line flags with `modgraph.yaml` into the paths and
//! options every command needs, and loads the persisted graph.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use modgraph::{CacheOptions, Graph, IndexOptions, Language, Snapshot};
use modgraph_store::{default_snapshot_path, read_bytes_if_exists};

use crate::config::ProjectConfig;

/// A project root plus its configuration.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Absolute project root
    pub root: PathBuf,
    /// Project name recorded in the snapshot
    pub project: String,
    /// Where the snapshot lives
    pub snapshot_path: PathBuf,
    /// Indexing options after flag overrides
    pub index: IndexOptions,
    /// Cache options
    pub cache: CacheOptions,
}

impl Workspace {
    /// Resolve the workspace for `root`.
    ///
    /// `project` and `languages` override the values from `modgraph.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist or the config file is
    /// invalid.
    pub async fn resolve(
        root: &Path,
        project: Option<&str>,
        languages: &[Language],
    ) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("project root not found: {}", root.display()))?;
        let config = ProjectConfig::load(&root).await?;

        let project = match project.map(str::to_string).or(config.project) {
            Some(name) => name,
            None => default_project_name(&root),
        };
        if project.is_empty() || project.contains(['/', '\\']) {
            bail!("invalid project name {project:?}");
        }

        let snapshot_path = match config.snapshot {
            Some(path) => root.join(path),
            None => default_snapshot_path(&root, &project),
        };

        let mut index = config.index;
        if !languages.is_empty() {
            index.languages = languages.to_vec();
        }

        Ok(Self {
            root,
            project,
            snapshot_path,
            index,
            cache: config.cache,
        })
    }

    /// Read the persisted snapshot, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub async fn read_snapshot(&self) -> Result<Option<Snapshot>> {
        let Some(bytes) = read_bytes_if_exists(&self.snapshot_path).await? else {
            return Ok(None);
        };
        let snapshot = Snapshot::from_json_slice(&bytes)
            .with_context(|| format!("cannot load {}", self.snapshot_path.display()))?;
        Ok(Some(snapshot))
    }

    /// Load the persisted graph.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshot exists yet, or if it is unreadable,
    /// from another format version, or inconsistent.
    pub async fn load_graph(&self) -> Result<Graph> {
        let Some(snapshot) = self.read_snapshot().await? else {
            bail!(
                "no snapshot for project {} at {}; run `modgraph index` first",
                self.project,
                self.snapshot_path.display()
            );
        };
        snapshot
            .into_graph()
            .with_context(|| format!("cannot load {}", self.snapshot_path.display()))
    }
}

fn default_project_name(root: &Path) -> String {
    root.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("project")
        .to_string()
}
