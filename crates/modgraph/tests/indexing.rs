//! Integration tests for the indexing pipeline.
//!
//! These tests verify the full path:
//! project tree → discovery → per-file parsing → graph → snapshot

use std::fs;

use chrono::{TimeZone, Utc};
use modgraph::{
    EdgeKind, IndexOptions, Language, ParseConfidence, ParseFailureKind, Risk, Snapshot,
    index_project, load_graph, query,
};
use tempfile::TempDir;

/// Create a temporary project with the given files.
fn project_with_files(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (path, content) in files {
        let full_path = dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("failed to write file");
    }
    dir
}

const PYTHON_PROJECT: &[(&str, &str)] = &[
    ("pkg/__init__.py", "\"\"\"Package root.\"\"\"\n"),
    (
        "pkg/core.py",
        "\"\"\"Core engine for memory optimization.\"\"\"\nimport os\nfrom .util import helper\n\n\nclass Engine:\n    \"\"\"Runs things.\"\"\"\n\n    def run(self):\n        return helper()\n",
    ),
    (
        "pkg/util.py",
        "\"\"\"Shared helpers.\"\"\"\n\n\ndef helper():\n    \"\"\"Help out.\"\"\"\n    return 1\n",
    ),
    (
        "app.py",
        "\"\"\"User authentication handler.\"\"\"\nfrom pkg.core import Engine\nimport requests\n\n\ndef main():\n    Engine().run()\n",
    ),
];

// ============================================================================
// Basic indexing
// ============================================================================

#[test]
fn empty_project_yields_empty_graph() {
    let dir = project_with_files(&[]);

    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");

    assert!(report.graph.is_empty());
    assert!(report.failures.is_empty());
    assert!(report.unresolved.is_empty());
}

#[test]
fn python_project_links_modules() {
    let dir = project_with_files(PYTHON_PROJECT);

    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");
    let graph = &report.graph;

    assert_eq!(graph.len(), 4);
    assert!(report.failures.is_empty());
    assert_eq!(graph.dependents_of("pkg/util.py"), ["pkg/core.py"]);
    assert_eq!(graph.dependents_of("pkg/core.py"), ["app.py"]);

    let core = graph.module("pkg/core.py").expect("core indexed");
    assert_eq!(core.summary, "Core engine for memory optimization.");
    assert_eq!(core.language, Language::Python);
    assert_eq!(core.parse_confidence, ParseConfidence::Exact);
    assert!(core.interfaces.iter().any(|i| i.name == "Engine"));
}

#[test]
fn external_imports_become_package_nodes() {
    let dir = project_with_files(PYTHON_PROJECT);

    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");

    let externals: Vec<_> = report
        .graph
        .edges_from("app.py")
        .filter(|e| e.is_external())
        .map(|e| e.to.as_str())
        .collect();
    assert_eq!(externals, vec!["external:requests"]);
    assert_eq!(report.graph.stats().external_packages, 2);
}

#[test]
fn queries_over_indexed_project() {
    let dir = project_with_files(PYTHON_PROJECT);
    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");
    let graph = &report.graph;

    let impact = query::impact(graph, "pkg/util.py").expect("impact failed");
    assert_eq!(impact.direct, vec!["pkg/core.py"]);
    assert_eq!(impact.transitive, vec!["pkg/core.py", "app.py"]);
    assert_eq!(impact.risk, Risk::Medium);

    let order = query::topo_sort(graph, None).expect("order failed");
    let position = |key: &str| order.iter().position(|k| k == key).expect("key ordered");
    assert!(position("pkg/util.py") < position("pkg/core.py"));
    assert!(position("pkg/core.py") < position("app.py"));

    let hits = query::search(graph, "memory optimization", 3);
    assert_eq!(hits[0].module, "pkg/core.py");
}

// ============================================================================
// Degraded files
// ============================================================================

#[test]
fn malformed_file_is_kept_as_degraded_module() {
    let dir = project_with_files(&[
        ("good.py", "from bad import thing\n"),
        ("bad.py", "def broken(:\n"),
    ]);

    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, ParseFailureKind::Syntax);

    let bad = report.graph.module("bad.py").expect("bad.py kept");
    assert!(bad.is_degraded());
    assert!(bad.interfaces.is_empty());
    assert!(!bad.content_hash.is_empty());
    // Edges into the degraded module still resolve.
    assert_eq!(report.graph.dependents_of("bad.py"), ["good.py"]);
}

#[test]
fn non_utf8_file_is_an_encoding_failure() {
    let dir = project_with_files(&[]);
    fs::write(dir.path().join("latin.py"), b"x = '\xe9'\n").expect("write file");

    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, ParseFailureKind::Encoding);
    assert!(report.graph.contains("latin.py"));
}

#[test]
fn unresolved_relative_import_is_reported() {
    let dir = project_with_files(&[("pkg/a.py", "from .missing import x\n")]);

    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");

    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].from, "pkg/a.py");
    assert!(report.graph.edges().is_empty());
}

// ============================================================================
// Other languages
// ============================================================================

#[test]
fn rust_crate_uses_resolve_to_files() {
    let dir = project_with_files(&[
        (
            "src/lib.rs",
            "//! Crate root.\n\npub mod store;\n\nuse crate::store::Store;\n\npub fn open() -> Store {\n    Store\n}\n",
        ),
        ("src/store.rs", "//! Storage layer.\n\npub struct Store;\n"),
    ]);

    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");
    let graph = &report.graph;

    assert_eq!(graph.dependents_of("src/store.rs"), ["src/lib.rs"]);
    let lib = graph.module("src/lib.rs").expect("lib indexed");
    assert_eq!(lib.summary, "Crate root.");
    assert!(lib.interfaces.iter().any(|i| i.name == "open"));
}

#[test]
fn typescript_relative_imports_resolve() {
    let dir = project_with_files(&[
        (
            "web/app.ts",
            "import { api } from './api';\n\nexport function start(): void {\n  api();\n}\n",
        ),
        ("web/api.ts", "export const api = () => 1;\n"),
    ]);

    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");
    let graph = &report.graph;

    assert_eq!(graph.dependents_of("web/api.ts"), ["web/app.ts"]);
    let app = graph.module("web/app.ts").expect("app indexed");
    assert_eq!(app.parse_confidence, ParseConfidence::Heuristic);

    let kinds: Vec<_> = graph.edges_from("web/app.ts").map(|e| e.kind).collect();
    assert!(kinds.contains(&EdgeKind::Imports));
}

#[test]
fn excluded_directories_are_not_indexed() {
    let dir = project_with_files(&[
        ("app.py", "import lib\n"),
        ("node_modules/lib/index.js", "module.exports = 1;\n"),
        ("target/debug/build.rs", "fn main() {}\n"),
    ]);

    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");

    let keys: Vec<_> = report.graph.keys().collect();
    assert_eq!(keys, vec!["app.py"]);
}

#[test]
fn language_filter_limits_discovery() {
    let dir = project_with_files(&[("a.py", ""), ("b.ts", ""), ("src/lib.rs", "")]);
    let options = IndexOptions::default().with_language(Language::TypeScript);

    let report = index_project(dir.path(), &options).expect("index failed");

    let keys: Vec<_> = report.graph.keys().collect();
    assert_eq!(keys, vec!["b.ts"]);
}

#[test]
fn missing_root_is_an_error() {
    let dir = project_with_files(&[]);
    let result = index_project(&dir.path().join("nope"), &IndexOptions::default());
    assert!(matches!(result, Err(modgraph::Error::Config(_))));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn reindexing_unchanged_tree_is_byte_identical() {
    let dir = project_with_files(PYTHON_PROJECT);
    let indexed_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let first = index_project(dir.path(), &IndexOptions::default()).expect("index failed");
    let second = index_project(dir.path(), &IndexOptions::default()).expect("index failed");

    let first_bytes = Snapshot::new("demo", indexed_at, &first.graph)
        .to_json_vec()
        .expect("encode");
    let second_bytes = Snapshot::new("demo", indexed_at, &second.graph)
        .to_json_vec()
        .expect("encode");

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.graph.version(), second.graph.version());

    let reloaded = load_graph(&first_bytes).expect("decode");
    assert_eq!(reloaded.version(), first.graph.version());
}
