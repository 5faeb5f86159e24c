//! Capability search.
//!
//! Ranks modules against a free-text query using token-set Jaccard
//! similarity over three fields:
//!
//! | Field | Weight |
//! |-------|--------|
//! | module summary | 0.5 |
//! | interface names | 0.3 |
//! | interface doc excerpts | 0.2 |
//!
//! A query found verbatim (case-insensitive) in the summary earns a flat
//! bonus; the total is capped at 1.0. Ties order by shorter path, then by
//! path, so rankings are reproducible.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::graph::Graph;
use crate::types::{Module, SearchHit};

const SUMMARY_WEIGHT: f64 = 0.5;
const INTERFACE_WEIGHT: f64 = 0.3;
const DOC_WEIGHT: f64 = 0.2;
const VERBATIM_BONUS: f64 = 0.15;

/// Rank modules by relevance to `query`, returning at most `top_k` hits.
///
/// Only modules with a positive score are returned. An empty or blank query
/// returns no hits.
#[must_use]
pub fn search(graph: &Graph, query: &str, top_k: usize) -> Vec<SearchHit> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || top_k == 0 {
        return Vec::new();
    }
    let needle = query.trim().to_lowercase();

    let mut hits: Vec<SearchHit> = graph
        .modules()
        .filter_map(|module| {
            let score = score_module(module, &query_tokens, &needle);
            (score > 0.0).then(|| SearchHit {
                module: module.path.clone(),
                score,
            })
        })
        .collect();

    hits.sort_by(compare_hits);
    hits.truncate(top_k);
    hits
}

/// Split on non-alphanumeric boundaries and lowercase.
#[must_use]
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn score_module(module: &Module, query: &HashSet<String>, needle: &str) -> f64 {
    let summary = tokenize(&module.summary);
    let names = tokenize(
        &module
            .interfaces
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    );
    let docs = tokenize(
        &module
            .interfaces
            .iter()
            .map(|i| i.doc_excerpt.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    );

    let mut score = SUMMARY_WEIGHT * jaccard(query, &summary)
        + INTERFACE_WEIGHT * jaccard(query, &names)
        + DOC_WEIGHT * jaccard(query, &docs);

    if !needle.is_empty() && module.summary.to_lowercase().contains(needle) {
        score += VERBATIM_BONUS;
    }
    score.min(1.0)
}

#[allow(clippy::cast_precision_loss)] // Token counts are far below 2^52
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.module.len().cmp(&b.module.len()))
        .then_with(|| a.module.cmp(&b.module))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Interface, InterfaceKind, Language};

    fn module(key: &str, summary: &str) -> Module {
        let mut m = Module::new(key, Language::Python);
        m.summary = summary.to_string();
        m
    }

    fn graph(modules: Vec<Module>) -> Graph {
        Graph::from_parts(modules, vec![]).unwrap()
    }

    #[test]
    fn empty_query_returns_nothing() {
        let g = graph(vec![module("a.py", "anything at all")]);
        assert!(search(&g, "", 10).is_empty());
        assert!(search(&g, "   ", 10).is_empty());
        assert!(search(&g, "!!", 10).is_empty());
    }

    #[test]
    fn zero_top_k_returns_nothing() {
        let g = graph(vec![module("a.py", "memory")]);
        assert!(search(&g, "memory", 0).is_empty());
    }

    #[test]
    fn relevant_summary_ranks_first() {
        let g = graph(vec![
            module("ckpt.py", "gradient checkpointing for memory optimization"),
            module("auth.py", "user authentication handler"),
        ]);

        let hits = search(&g, "memory optimization", 10);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].module, "ckpt.py");
        // J = 2/5, weighted 0.2, plus the verbatim bonus.
        assert!((hits[0].score - 0.35).abs() < 1e-9);
    }

    #[test]
    fn interface_names_and_docs_contribute() {
        let mut m = module("io.py", "");
        m.interfaces.push(Interface {
            name: "load".into(),
            kind: InterfaceKind::Function,
            signature: "def load()".into(),
            doc_excerpt: "Load a config file.".into(),
        });
        let g = graph(vec![m]);

        let hits = search(&g, "load", 5);

        assert_eq!(hits.len(), 1);
        // 0.3 * 1/1 + 0.2 * 1/4
        assert!((hits[0].score - 0.35).abs() < 1e-9);
    }

    #[test]
    fn score_is_capped_at_one() {
        let mut m = module("x.py", "parse");
        m.interfaces.push(Interface {
            name: "parse".into(),
            kind: InterfaceKind::Function,
            signature: "def parse()".into(),
            doc_excerpt: "parse".into(),
        });
        let g = graph(vec![m]);

        let hits = search(&g, "parse", 1);
        assert!((hits[0].score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ties_break_by_shorter_then_lexicographic_path() {
        let g = graph(vec![
            module("pkg/zz.py", "cache layer"),
            module("pkg/aaa.py", "cache layer"),
            module("pkg/bb.py", "cache layer"),
        ]);

        let hits = search(&g, "cache layer", 10);
        let order: Vec<_> = hits.iter().map(|h| h.module.as_str()).collect();

        assert_eq!(order, vec!["pkg/bb.py", "pkg/zz.py", "pkg/aaa.py"]);
    }

    #[test]
    fn tokenize_splits_and_lowercases() {
        let tokens = tokenize("Memory-Optimization, v2!");
        let expected: HashSet<String> = ["memory", "optimization", "v2"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(tokens, expected);
    }
}
