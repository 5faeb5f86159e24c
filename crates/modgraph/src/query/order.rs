//! Generation ordering and cycle detection.
//!
//! [`topo_sort`] orders modules so every module comes after the modules it
//! imports. [`cycles`] lists the strongly connected components that make
//! such an order impossible.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use super::impact::ensure_known;
use crate::error::{Error, Result};
use crate::graph::Graph;

/// Order `subset` (or the whole graph) with dependencies first.
///
/// Only edges between members of the subset are considered. Whenever several
/// modules are ready, the smallest key goes next, so the result is
/// deterministic.
///
/// # Errors
///
/// Returns [`Error::ModuleNotFound`] for a subset key not in the graph and
/// [`Error::CycleDetected`] if the subset contains a cycle.
pub fn topo_sort(graph: &Graph, subset: Option<&[String]>) -> Result<Vec<String>> {
    let members: BTreeSet<&str> = match subset {
        Some(keys) => {
            for key in keys {
                ensure_known(graph, key)?;
            }
            keys.iter().map(String::as_str).collect()
        }
        None => graph.keys().collect(),
    };

    // Induced subgraph: not-yet-emitted dependencies per member, and the
    // members that wait on each one.
    let mut pending: HashMap<&str, usize> = HashMap::with_capacity(members.len());
    let mut waiting: HashMap<&str, Vec<&str>> = HashMap::new();
    for &key in &members {
        let mut count = 0;
        for dep in graph.dependencies_of(key) {
            if let Some(&dep) = members.get(dep.as_str()) {
                count += 1;
                waiting.entry(dep).or_default().push(key);
            }
        }
        pending.insert(key, count);
    }

    let mut ready: BTreeSet<&str> = members
        .iter()
        .copied()
        .filter(|key| pending.get(key) == Some(&0))
        .collect();
    let mut order = Vec::with_capacity(members.len());

    while let Some(key) = ready.pop_first() {
        order.push(key.to_string());
        for &dependent in waiting.get(key).map_or(&[][..], Vec::as_slice) {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    if order.len() < members.len() {
        let cycle = find_cycle(graph, &pending);
        debug!(cycle = ?cycle, "Ordering blocked by a cycle");
        return Err(Error::CycleDetected { cycle });
    }
    Ok(order)
}

/// Walk from the smallest blocked module along blocked dependencies until a
/// module repeats. Every blocked module has at least one blocked dependency,
/// so the walk always closes.
fn find_cycle(graph: &Graph, pending: &HashMap<&str, usize>) -> Vec<String> {
    let blocked: BTreeSet<&str> = pending
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(key, _)| *key)
        .collect();

    let Some(&start) = blocked.iter().next() else {
        return Vec::new();
    };

    let mut path: Vec<&str> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut current = start;
    loop {
        if let Some(&at) = position.get(current) {
            return path[at..].iter().map(ToString::to_string).collect();
        }
        position.insert(current, path.len());
        path.push(current);

        let next = graph
            .dependencies_of(current)
            .iter()
            .map(String::as_str)
            .find(|dep| blocked.contains(dep));
        match next {
            Some(dep) => current = dep,
            None => return path.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Every dependency cycle in the graph.
///
/// Each cycle is a strongly connected component with more than one module,
/// or a single module importing itself. Members are sorted and the list of
/// cycles is sorted.
#[must_use]
pub fn cycles(graph: &Graph) -> Vec<Vec<String>> {
    let mut digraph: DiGraph<&str, ()> = DiGraph::new();
    let nodes: HashMap<&str, NodeIndex> = graph
        .keys()
        .map(|key| (key, digraph.add_node(key)))
        .collect();

    for key in graph.keys() {
        for dep in graph.dependencies_of(key) {
            if let (Some(&from), Some(&to)) = (nodes.get(key), nodes.get(dep.as_str())) {
                digraph.add_edge(from, to, ());
            }
        }
    }

    let mut found: Vec<Vec<String>> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| digraph.contains_edge(node, node))
        })
        .map(|component| {
            let mut members: Vec<String> = component
                .into_iter()
                .map(|node| digraph[node].to_string())
                .collect();
            members.sort();
            members
        })
        .collect();
    found.sort();
    found
}
