//! Benchmarks for modgraph query operations.
//!
//! These benchmarks measure the performance of:
//! - `impact` on wide and deep dependent sets
//! - `topo_sort` over the whole graph
//! - `search` ranking
//! - `DependencyCache` hits versus cold lookups

// Benchmark code - performance of the benchmark setup is not critical
#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use std::fs;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use modgraph::{DependencyCache, Graph, IndexOptions, index_project, query};
use tempfile::TempDir;

/// Generate a layered Python package.
///
/// Creates a structure like:
/// ```text
/// pkg/layer0_*.py  (no imports)
///   <- pkg/layer1_*.py  (import every layer0 module)
///     <- ...
///       <- pkg/layer{depth-1}_*.py
/// ```
fn generate_layered_package(depth: usize, width: usize) -> Vec<(String, String)> {
    let mut files = vec![("pkg/__init__.py".to_string(), String::new())];
    for layer in 0..depth {
        for i in 0..width {
            let mut content = format!("\"\"\"Layer {layer} worker {i} for batch processing.\"\"\"\n");
            if layer > 0 {
                for j in 0..width {
                    content.push_str(&format!("from .layer{}_{j} import run{j}\n", layer - 1));
                }
            }
            content.push_str(&format!(
                "\n\ndef run{i}():\n    \"\"\"Process one batch.\"\"\"\n    return {i}\n"
            ));
            files.push((format!("pkg/layer{layer}_{i}.py"), content));
        }
    }
    files
}

/// Write `files` into a temp dir and index it.
/// The temp directory must be kept alive while the graph is used.
fn indexed_graph(files: &[(String, String)]) -> (TempDir, Graph) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (path, content) in files {
        let full_path = dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("failed to write file");
    }
    let report = index_project(dir.path(), &IndexOptions::default()).expect("index failed");
    (dir, report.graph)
}

fn bench_impact(c: &mut Criterion) {
    let mut group = c.benchmark_group("impact");

    for depth in &[2usize, 5, 10] {
        let (_dir, graph) = indexed_graph(&generate_layered_package(*depth, 5));
        group.throughput(Throughput::Elements(graph.len() as u64));

        group.bench_with_input(BenchmarkId::new("layers", depth), depth, |b, _| {
            b.iter(|| black_box(query::impact(&graph, "pkg/layer0_0.py").expect("impact")));
        });
    }

    group.finish();
}

fn bench_topo_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("topo_sort");

    for width in &[5usize, 10, 20] {
        let (_dir, graph) = indexed_graph(&generate_layered_package(6, *width));
        group.throughput(Throughput::Elements(graph.len() as u64));

        group.bench_with_input(BenchmarkId::new("width", width), width, |b, _| {
            b.iter(|| black_box(query::topo_sort(&graph, None).expect("acyclic")));
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let (_dir, graph) = indexed_graph(&generate_layered_package(10, 10));

    c.bench_function("search/batch_processing", |b| {
        b.iter(|| black_box(query::search(&graph, "batch processing worker", 10)));
    });
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_deps");
    let (_dir, graph) = indexed_graph(&generate_layered_package(10, 5));
    let target = "pkg/layer9_0.py";

    group.bench_function("cold", |b| {
        let cache = DependencyCache::default();
        b.iter(|| {
            cache.clear_caches();
            black_box(cache.get_transitive_deps(&graph, target).expect("known"))
        });
    });

    group.bench_function("warm", |b| {
        let cache = DependencyCache::default();
        cache.get_transitive_deps(&graph, target).expect("known");
        b.iter(|| black_box(cache.get_transitive_deps(&graph, target).expect("known")));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_impact,
    bench_topo_sort,
    bench_search,
    bench_cache
);
criterion_main!(benches);
