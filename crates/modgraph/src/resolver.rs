//! Import specifier resolution.
//!
//! Maps an import as written (`pkg.util`, `..core`, `crate::db`, `./util`)
//! to the key of a module in the same tree. Resolution works purely against
//! the set of known keys, never the filesystem, so the same answer comes out
//! of indexing a tree and of rebuilding a graph from records.
//!
//! Specifiers that do not resolve are either external packages or, when
//! relative, dangling imports the graph builder reports as unresolved.

use std::collections::{BTreeMap, HashSet};

use crate::types::{Import, Language};

/// Script extensions tried, in order, for extensionless specifiers.
const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"];

/// Context needed to resolve imports within a tree.
#[derive(Debug, Clone, Copy)]
pub struct ImportContext<'a> {
    /// All module keys in the tree
    pub known_keys: &'a HashSet<String>,
    /// Root-relative directories absolute imports are looked up under
    pub source_roots: &'a [String],
}

impl<'a> ImportContext<'a> {
    /// Create a context over `known_keys`.
    #[must_use]
    pub fn new(known_keys: &'a HashSet<String>, source_roots: &'a [String]) -> Self {
        Self {
            known_keys,
            source_roots,
        }
    }

    fn first_known(&self, candidates: impl IntoIterator<Item = String>) -> Option<String> {
        candidates
            .into_iter()
            .find(|candidate| self.known_keys.contains(candidate.as_str()))
    }
}

/// Whether `target` is written relative to the importing module.
///
/// Relative imports always refer to the tree, even when they do not resolve.
#[must_use]
pub fn is_relative(language: Language, target: &str) -> bool {
    match language {
        Language::Python => target.starts_with('.'),
        Language::Rust => matches!(
            target.split("::").next(),
            Some("crate" | "self" | "super")
        ),
        Language::JavaScript | Language::TypeScript => {
            target == "." || target == ".." || target.starts_with("./") || target.starts_with("../")
        }
    }
}

/// Top-level package name of an external import.
#[must_use]
pub fn external_package(language: Language, target: &str) -> String {
    match language {
        Language::Python => target.split('.').next().unwrap_or(target).to_string(),
        Language::Rust => target.split("::").next().unwrap_or(target).to_string(),
        Language::JavaScript | Language::TypeScript => {
            let mut parts = target.split('/');
            match (parts.next(), parts.next()) {
                (Some(scope), Some(name)) if scope.starts_with('@') => format!("{scope}/{name}"),
                (Some(first), _) => first.to_string(),
                _ => target.to_string(),
            }
        }
    }
}

/// Resolve a single import specifier to a module key.
#[must_use]
pub fn resolve(
    language: Language,
    from_key: &str,
    target: &str,
    ctx: &ImportContext<'_>,
) -> Option<String> {
    match language {
        Language::Python => resolve_python(from_key, target, ctx),
        Language::Rust => resolve_rust(from_key, target, ctx),
        Language::JavaScript | Language::TypeScript => resolve_script(from_key, target, ctx),
    }
}

/// Resolve an import and distribute its names over the modules they live in.
///
/// An imported name may itself be a submodule (`from . import util`,
/// `use crate::{db}`); such names resolve to the submodule. Remaining names
/// belong to the target module. Returns `(key, names)` pairs sorted by key,
/// empty if nothing resolved.
#[must_use]
pub fn resolve_import(
    language: Language,
    from_key: &str,
    import: &Import,
    ctx: &ImportContext<'_>,
) -> Vec<(String, Vec<String>)> {
    let mut resolved: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut leftover = Vec::new();

    for name in &import.names {
        let submodule = submodule_target(language, &import.target, name)
            .and_then(|target| resolve(language, from_key, &target, ctx));
        match submodule {
            Some(key) => resolved.entry(key).or_default().push(name.clone()),
            None => leftover.push(name.clone()),
        }
    }

    if import.names.is_empty() || !leftover.is_empty() {
        if let Some(key) = resolve(language, from_key, &import.target, ctx) {
            resolved.entry(key).or_default().extend(leftover);
        }
    }

    resolved.into_iter().collect()
}

fn submodule_target(language: Language, target: &str, name: &str) -> Option<String> {
    match language {
        Language::Python if target.chars().all(|c| c == '.') => Some(format!("{target}{name}")),
        Language::Python => Some(format!("{target}.{name}")),
        Language::Rust => Some(format!("{target}::{name}")),
        Language::JavaScript | Language::TypeScript => None,
    }
}

// ============================================================================
// Python
// ============================================================================

fn resolve_python(from_key: &str, target: &str, ctx: &ImportContext<'_>) -> Option<String> {
    if target.starts_with('.') {
        let dots = target.chars().take_while(|c| *c == '.').count();
        let mut parts: Vec<&str> = split_dir(parent_dir(from_key));
        for _ in 1..dots {
            parts.pop()?;
        }
        parts.extend(target[dots..].split('.').filter(|s| !s.is_empty()));
        return ctx.first_known(python_candidates(&parts.join("/")));
    }

    let relative = target.replace('.', "/");
    ctx.source_roots
        .iter()
        .find_map(|root| ctx.first_known(python_candidates(&join(root, &relative))))
}

fn python_candidates(module_path: &str) -> Vec<String> {
    if module_path.is_empty() {
        return vec!["__init__.py".to_string(), "__init__.pyi".to_string()];
    }
    vec![
        format!("{module_path}.py"),
        format!("{module_path}.pyi"),
        format!("{module_path}/__init__.py"),
        format!("{module_path}/__init__.pyi"),
    ]
}

// ============================================================================
// Rust
// ============================================================================

/// Paths may continue past the module into items (`crate::db::Store::new`),
/// so the longest prefix that names a module wins.
fn resolve_rust(from_key: &str, target: &str, ctx: &ImportContext<'_>) -> Option<String> {
    let segments: Vec<&str> = target.split("::").filter(|s| !s.is_empty()).collect();
    let first = *segments.first()?;

    let (base_dir, rest, min_len) = match first {
        "crate" => (crate_root_dir(from_key, ctx), &segments[1..], 0),
        "self" => {
            if segments.len() == 1 {
                return ctx.known_keys.contains(from_key).then(|| from_key.to_string());
            }
            (module_dir(from_key), &segments[1..], 1)
        }
        "super" => {
            let supers = segments.iter().take_while(|s| **s == "super").count();
            let mut dir = module_dir(from_key);
            for _ in 0..supers {
                dir = parent(&dir)?.to_string();
            }
            (dir, &segments[supers..], 0)
        }
        // Bare paths name a module of this crate or an external crate.
        _ => (crate_root_dir(from_key, ctx), &segments[..], 1),
    };

    (min_len..=rest.len())
        .rev()
        .find_map(|len| rust_module_key(&base_dir, &rest[..len], ctx))
}

fn rust_module_key(dir: &str, segments: &[&str], ctx: &ImportContext<'_>) -> Option<String> {
    if segments.is_empty() {
        return module_file_for_dir(dir, ctx);
    }
    let path = join(dir, &segments.join("/"));
    ctx.first_known([format!("{path}.rs"), format!("{path}/mod.rs")])
}

/// The file whose child modules live in `dir`.
fn module_file_for_dir(dir: &str, ctx: &ImportContext<'_>) -> Option<String> {
    let mut candidates = vec![
        join(dir, "mod.rs"),
        join(dir, "lib.rs"),
        join(dir, "main.rs"),
    ];
    if !dir.is_empty() {
        candidates.push(format!("{dir}.rs"));
    }
    ctx.first_known(candidates)
}

/// Directory holding the child modules of the file `key`.
fn module_dir(key: &str) -> String {
    let dir = parent_dir(key);
    let file = key.rsplit('/').next().unwrap_or(key);
    let stem = file.strip_suffix(".rs").unwrap_or(file);
    match stem {
        "mod" | "lib" | "main" => dir.to_string(),
        _ => join(dir, stem),
    }
}

/// Nearest ancestor directory holding a `lib.rs` or `main.rs`.
fn crate_root_dir(from_key: &str, ctx: &ImportContext<'_>) -> String {
    let mut dir = parent_dir(from_key);
    loop {
        if ctx.known_keys.contains(&join(dir, "lib.rs"))
            || ctx.known_keys.contains(&join(dir, "main.rs"))
        {
            return dir.to_string();
        }
        match parent(dir) {
            Some(up) => dir = up,
            None => return parent_dir(from_key).to_string(),
        }
    }
}

// ============================================================================
// JavaScript / TypeScript
// ============================================================================

fn resolve_script(from_key: &str, target: &str, ctx: &ImportContext<'_>) -> Option<String> {
    if is_relative(Language::JavaScript, target) {
        let base = normalize(&join(parent_dir(from_key), target))?;
        return ctx.first_known(script_candidates(&base));
    }

    ctx.source_roots.iter().find_map(|root| {
        let base = normalize(&join(root, target))?;
        ctx.first_known(script_candidates(&base))
    })
}

fn script_candidates(base: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    if !base.is_empty() {
        candidates.push(base.to_string());
        candidates.extend(SCRIPT_EXTENSIONS.iter().map(|ext| format!("{base}.{ext}")));

        // Compiled-output specifiers (`./util.js`) written in TypeScript sources.
        for (js, ts) in [("js", "ts"), ("jsx", "tsx"), ("mjs", "mts"), ("cjs", "cts")] {
            if let Some(stem) = base.strip_suffix(&format!(".{js}")) {
                candidates.push(format!("{stem}.{ts}"));
            }
        }
    }
    candidates.extend(
        SCRIPT_EXTENSIONS
            .iter()
            .map(|ext| join(base, &format!("index.{ext}"))),
    );
    candidates
}

// ============================================================================
// Key helpers
// ============================================================================

fn parent_dir(key: &str) -> &str {
    key.rsplit_once('/').map_or("", |(dir, _)| dir)
}

fn parent(dir: &str) -> Option<&str> {
    if dir.is_empty() {
        None
    } else {
        Some(parent_dir(dir))
    }
}

fn split_dir(dir: &str) -> Vec<&str> {
    dir.split('/').filter(|s| !s.is_empty()).collect()
}

fn join(dir: &str, rest: &str) -> String {
    match (dir.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => dir.to_string(),
        (false, false) => format!("{dir}/{rest}"),
    }
}

/// Collapse `.` and `..` segments; `None` if the path escapes the root.
fn normalize(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}
