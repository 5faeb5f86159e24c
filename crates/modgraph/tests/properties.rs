//! Property tests for graph queries and hashing.

use std::collections::HashSet;

use modgraph::{
    DependencyCache, Edge, EdgeKind, Error, Graph, Language, Module, content_hash, is_stale, query,
};
use proptest::prelude::*;

fn key(i: usize) -> String {
    format!("m{i:02}.py")
}

fn graph_from(n: usize, pairs: &[(usize, usize)]) -> Graph {
    let modules = (0..n).map(|i| Module::new(key(i), Language::Python));
    let edges = pairs
        .iter()
        .filter(|(from, to)| from != to)
        .map(|(from, to)| Edge {
            from: key(*from),
            to: key(*to),
            kind: EdgeKind::Imports,
            specifics: vec![],
        })
        .collect();
    Graph::from_parts(modules, edges).expect("endpoints exist")
}

/// Any directed graph without self-loops.
fn arb_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..30)))
}

/// A DAG: edges only run from a higher index to a lower one.
fn arb_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    arb_graph().prop_map(|(n, pairs)| {
        let pairs = pairs
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.max(b), a.min(b)))
            .collect();
        (n, pairs)
    })
}

proptest! {
    #[test]
    fn impact_direct_is_subset_of_transitive((n, pairs) in arb_graph(), target in 0usize..12) {
        let graph = graph_from(n, &pairs);
        let target = key(target % n);

        let impact = query::impact(&graph, &target).unwrap();

        prop_assert!(impact.direct.iter().all(|d| impact.transitive.contains(d)));
        prop_assert!(!impact.direct.contains(&target));
        prop_assert!(!impact.transitive.contains(&target));
        let unique: HashSet<_> = impact.transitive.iter().collect();
        prop_assert_eq!(unique.len(), impact.transitive.len());
    }

    #[test]
    fn topo_sort_puts_dependencies_first((n, pairs) in arb_dag()) {
        let graph = graph_from(n, &pairs);

        let order = query::topo_sort(&graph, None).unwrap();

        prop_assert_eq!(order.len(), n);
        let position = |k: &str| order.iter().position(|o| o == k).unwrap();
        for edge in graph.edges() {
            prop_assert!(position(&edge.to) < position(&edge.from));
        }
    }

    #[test]
    fn topo_sort_orders_subset_by_induced_edges(
        (n, pairs) in arb_dag(),
        mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let graph = graph_from(n, &pairs);
        let subset: Vec<String> = (0..n).filter(|&i| mask[i]).map(key).collect();

        let order = query::topo_sort(&graph, Some(subset.as_slice())).unwrap();

        let expected: HashSet<&String> = subset.iter().collect();
        let actual: HashSet<&String> = order.iter().collect();
        prop_assert_eq!(order.len(), subset.len());
        prop_assert_eq!(actual, expected);

        let position = |k: &str| order.iter().position(|o| o == k);
        for edge in graph.edges() {
            if let (Some(from), Some(to)) = (position(&edge.from), position(&edge.to)) {
                prop_assert!(to < from, "{} must precede {}", edge.to, edge.from);
            }
        }
    }

    #[test]
    fn topo_sort_reports_a_real_cycle((n, pairs) in arb_dag(), a in 0usize..12, b in 0usize..12) {
        let (a, b) = (a % n, b % n);
        prop_assume!(a != b);
        let mut pairs = pairs;
        pairs.push((a, b));
        pairs.push((b, a));
        let graph = graph_from(n, &pairs);

        match query::topo_sort(&graph, None) {
            Err(Error::CycleDetected { cycle }) => {
                prop_assert!(cycle.len() >= 2);
                for (i, from) in cycle.iter().enumerate() {
                    let to = &cycle[(i + 1) % cycle.len()];
                    prop_assert!(graph.dependencies_of(from).contains(to));
                }
            }
            other => prop_assert!(false, "expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn cache_agrees_with_itself((n, pairs) in arb_graph(), target in 0usize..12) {
        let graph = graph_from(n, &pairs);
        let target = key(target % n);
        let cache = DependencyCache::new(4);

        let first = cache.get_transitive_deps(&graph, &target).unwrap();
        cache.clear_caches();
        let second = cache.get_transitive_deps(&graph, &target).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn staleness_is_a_pure_function(a in prop::collection::vec(any::<u8>(), 0..64),
                                    b in prop::collection::vec(any::<u8>(), 0..64)) {
        let stored = content_hash(&a);

        prop_assert!(!is_stale(&stored, &a));
        prop_assert_eq!(is_stale(&stored, &b), a != b);
        prop_assert_eq!(is_stale(&stored, &b), is_stale(&stored, &b));
    }

    #[test]
    fn search_is_sorted_and_bounded(words in prop::collection::vec("[a-z]{1,6}", 1..4), top_k in 0usize..5) {
        let modules = (0..6).map(|i| {
            let mut m = Module::new(key(i), Language::Python);
            m.summary = words.iter().skip(i % words.len()).cloned().collect::<Vec<_>>().join(" ");
            m
        });
        let graph = Graph::from_parts(modules, vec![]).unwrap();
        let query_text = words.join(" ");

        let hits = query::search(&graph, &query_text, top_k);

        prop_assert!(hits.len() <= top_k);
        for hit in &hits {
            prop_assert!(hit.score > 0.0 && hit.score <= 1.0);
        }
        for pair in hits.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        prop_assert_eq!(hits, query::search(&graph, &query_text, top_k));
    }
}
