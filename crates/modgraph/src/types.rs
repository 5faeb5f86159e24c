//! Domain types for the module graph.
//!
//! These types represent the core domain model:
//! - **Records**: `Module`, `Interface`, `Import`, `SymbolUse` (produced once per indexing pass)
//! - **Relationships**: `Edge`, `EdgeKind`
//! - **Results**: `Impact`, `Risk`, `SearchHit` (query results)
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Language | Enum not String | Closed set; dispatch is a `match` |
//! | Module key | Root-relative path with `/` | Stable across platforms and checkouts |
//! | Staleness | Computed on demand | Never stored as a flag on `Module` |
//! | Collections | Sorted `Vec`s | Snapshots must be byte-identical across runs |

use serde::{Deserialize, Serialize};

/// Prefix of the synthetic node key used for external packages.
pub const EXTERNAL_PREFIX: &str = "external:";

// ============================================================================
// Enums
// ============================================================================

/// Supported source languages.
///
/// The set is fixed at build time; each variant maps to exactly one parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python source files (`.py`, `.pyi`)
    Python,
    /// Rust source files (`.rs`)
    Rust,
    /// JavaScript source files (`.js`, `.jsx`, `.mjs`, `.cjs`)
    JavaScript,
    /// TypeScript source files (`.ts`, `.tsx`, `.mts`, `.cts`)
    TypeScript,
}

impl Language {
    /// Every supported language, in declaration order.
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::Rust,
        Language::JavaScript,
        Language::TypeScript,
    ];

    /// File extensions handled by this language.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py", "pyi"],
            Self::Rust => &["rs"],
            Self::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Self::TypeScript => &["ts", "tsx", "mts", "cts"],
        }
    }

    /// Detect language from file extension.
    ///
    /// # Returns
    ///
    /// `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    /// Detect language from a file path's extension.
    #[must_use]
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse a language tag such as `python` or `ts`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "python" | "py" => Some(Self::Python),
            "rust" | "rs" => Some(Self::Rust),
            "javascript" | "js" => Some(Self::JavaScript),
            "typescript" | "ts" => Some(Self::TypeScript),
            _ => None,
        }
    }

    /// Lowercase tag used in snapshots and output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Rust => "rust",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
        }
    }

    /// How faithfully this language's parser extracts imports and interfaces.
    #[must_use]
    pub fn confidence(&self) -> ParseConfidence {
        match self {
            Self::Python | Self::Rust => ParseConfidence::Exact,
            Self::JavaScript | Self::TypeScript => ParseConfidence::Heuristic,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a module was extracted with a real grammar or with patterns.
///
/// Heuristic modules may undercount imports; impact and search consumers can
/// weight them accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseConfidence {
    /// Grammar-level extraction
    Exact,
    /// Pattern-based extraction
    Heuristic,
}

/// Kind of a public interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    /// Class, struct, enum, trait, interface or type alias
    Class,
    /// Free function
    Function,
    /// Module-level constant
    Const,
}

impl std::fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Function => write!(f, "function"),
            Self::Const => write!(f, "const"),
        }
    }
}

/// Kind of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// The module imports the target
    Imports,
    /// The module calls names imported from the target
    Calls,
    /// The module subclasses a type imported from the target
    Inherits,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imports => write!(f, "imports"),
            Self::Calls => write!(f, "calls"),
            Self::Inherits => write!(f, "inherits"),
        }
    }
}

/// How a module uses a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseKind {
    /// The name is called
    Call,
    /// The name is a base class
    Inherit,
}

/// Change risk derived from the number of transitive dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Risk {
    /// Fewer than two transitive dependents
    Low,
    /// Two to five transitive dependents
    Medium,
    /// More than five transitive dependents
    High,
}

impl Risk {
    /// Classify a transitive dependent count.
    #[must_use]
    pub fn from_dependent_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::Low,
            2..=5 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl std::fmt::Display for Risk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A public interface exported by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// Name as declared
    pub name: String,
    /// What kind of interface this is
    pub kind: InterfaceKind,
    /// Best-effort declaration line, e.g. `def load(path: str) -> Config`
    pub signature: String,
    /// First line of the interface's own documentation
    #[serde(default)]
    pub doc_excerpt: String,
}

/// An import statement as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Import {
    /// The import specifier (`pkg.util`, `./util`, `crate::db`, `.`)
    pub target: String,
    /// Names imported from the target; empty for whole-module imports
    #[serde(default)]
    pub names: Vec<String>,
}

impl Import {
    /// Create an import record.
    #[must_use]
    pub fn new(target: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            target: target.into(),
            names,
        }
    }
}

/// A name the module calls or inherits from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolUse {
    /// The referenced name (first segment for dotted references)
    pub name: String,
    /// How it is used
    pub kind: UseKind,
}

/// The per-file record produced by a parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Root-relative path with `/` separators; unique key within a graph
    pub path: String,
    /// Source language
    pub language: Language,
    /// Number of lines in the file
    #[serde(rename = "lines")]
    pub line_count: usize,
    /// SHA-256 of the raw file bytes, lowercase hex
    pub content_hash: String,
    /// First line of the module docstring
    #[serde(default)]
    pub summary: String,
    /// Public interfaces, in source order
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    /// Imports that refer to modules in this tree
    #[serde(default)]
    pub imports_internal: Vec<Import>,
    /// Imports of third-party or standard-library packages
    #[serde(default)]
    pub imports_external: Vec<Import>,
    /// Extraction fidelity
    pub parse_confidence: ParseConfidence,
    /// Set when the file could not be parsed normally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    /// Names called or inherited from, sorted and deduplicated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbol_uses: Vec<SymbolUse>,
}

impl Module {
    /// Create an empty module record for `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            line_count: 0,
            content_hash: String::new(),
            summary: String::new(),
            interfaces: Vec::new(),
            imports_internal: Vec::new(),
            imports_external: Vec::new(),
            parse_confidence: language.confidence(),
            parse_error: None,
            symbol_uses: Vec::new(),
        }
    }

    /// Create a degraded record for a file that could not be parsed.
    ///
    /// The module stays in the graph so edges pointing at it remain valid.
    #[must_use]
    pub fn degraded(
        path: impl Into<String>,
        language: Language,
        content_hash: String,
        line_count: usize,
        error: impl Into<String>,
    ) -> Self {
        Self {
            content_hash,
            line_count,
            parse_error: Some(error.into()),
            ..Self::new(path, language)
        }
    }

    /// Whether this record was produced from a failed parse.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.parse_error.is_some()
    }
}

/// A directed dependency between two graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Key of the depending module
    pub from: String,
    /// Key of the module depended on, or `external:{package}`
    pub to: String,
    /// Relationship kind
    pub kind: EdgeKind,
    /// Names actually imported or used, sorted
    #[serde(default)]
    pub specifics: Vec<String>,
}

impl Edge {
    /// Whether the edge targets a synthetic external-package node.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.to.starts_with(EXTERNAL_PREFIX)
    }
}

/// Build the synthetic node key for an external package.
#[must_use]
pub fn external_key(package: &str) -> String {
    format!("{EXTERNAL_PREFIX}{package}")
}

// ============================================================================
// Query results
// ============================================================================

/// Result of change-impact analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impact {
    /// The module analyzed
    pub module: String,
    /// Modules that import the target directly, sorted
    pub direct: Vec<String>,
    /// Every module that reaches the target, in breadth-first order
    pub transitive: Vec<String>,
    /// Risk classification of `transitive.len()`
    pub risk: Risk,
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Module key
    pub module: String,
    /// Relevance in `(0.0, 1.0]`
    pub score: f64,
}
