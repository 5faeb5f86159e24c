//! Project configuration loaded from `modgraph.yaml`.
//!
//! The file is optional. Every field has a default, so a file that sets only
//! `project:` is valid. Command-line flags override what the file says.
//!
//! ```yaml
//! project: billing
//! index:
//!   source_roots: ["", "src"]
//!   languages: [python]
//! cache:
//!   capacity: 512
//! ```

use std::path::{Path, PathBuf};

use modgraph::{CacheOptions, IndexOptions};
use serde::{Deserialize, Serialize};

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "modgraph.yaml";

/// Contents of `modgraph.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name; defaults to the root directory name
    pub project: Option<String>,
    /// Snapshot location relative to the root; defaults to `.modgraph/<project>.json`
    pub snapshot: Option<PathBuf>,
    /// Indexing options
    pub index: IndexOptions,
    /// Transitive-dependency cache options
    pub cache: CacheOptions,
}

impl ProjectConfig {
    /// Load `modgraph.yaml` from `root`, or defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`modgraph::Error::Config`] if the file exists but is not
    /// valid, and [`modgraph::Error::Io`] if it cannot be read.
    pub async fn load(root: &Path) -> modgraph::Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Self::parse(&content).map_err(|e| {
                modgraph::Error::Config(format!("{}: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes as null, which is not a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}
