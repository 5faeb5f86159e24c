//! Change impact and direct neighbour queries.

use std::collections::{HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::types::{Impact, Risk};

/// What breaks if `key` changes.
///
/// `direct` lists the modules importing `key`, sorted. `transitive` is the
/// breadth-first closure over dependents, starting with the direct ones, so
/// it always contains `direct`. `key` itself never appears, even inside a
/// cycle. Risk is graded on the transitive count.
///
/// # Errors
///
/// Returns [`Error::ModuleNotFound`] if `key` is not in the graph.
pub fn impact(graph: &Graph, key: &str) -> Result<Impact> {
    ensure_known(graph, key)?;

    let direct = graph.dependents_of(key);

    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(key);
    let mut transitive = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for dependent in direct {
        if seen.insert(dependent) {
            transitive.push(dependent.clone());
            queue.push_back(dependent);
        }
    }

    while let Some(current) = queue.pop_front() {
        for dependent in graph.dependents_of(current) {
            if seen.insert(dependent) {
                transitive.push(dependent.clone());
                queue.push_back(dependent);
            }
        }
    }

    Ok(Impact {
        module: key.to_string(),
        direct: direct.to_vec(),
        risk: Risk::from_dependent_count(transitive.len()),
        transitive,
    })
}

/// Modules that import `key` directly.
///
/// # Errors
///
/// Returns [`Error::ModuleNotFound`] if `key` is not in the graph.
pub fn dependents(graph: &Graph, key: &str) -> Result<Vec<String>> {
    ensure_known(graph, key)?;
    Ok(graph.dependents_of(key).to_vec())
}

/// Modules `key` imports directly.
///
/// # Errors
///
/// Returns [`Error::ModuleNotFound`] if `key` is not in the graph.
pub fn dependencies(graph: &Graph, key: &str) -> Result<Vec<String>> {
    ensure_known(graph, key)?;
    Ok(graph.dependencies_of(key).to_vec())
}

pub(crate) fn ensure_known(graph: &Graph, key: &str) -> Result<()> {
    if graph.contains(key) {
        Ok(())
    } else {
        Err(Error::ModuleNotFound(key.to_string()))
    }
}
