//! Benchmarks for dependency graph operations
//!
//! Run with: cargo bench -p upnext-graph

#![allow(clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use upnext_graph::Graph;

/// Generates a wide graph: one category, many tasks all depending on a
/// single root task.
fn generate_wide_graph(task_count: i64) -> Graph {
    let mut graph = Graph::new();
    graph.add_todo(0, 1);
    for tid in 1..=task_count {
        graph.add_todo(tid, 1);
        graph.add_dep(tid, 0).unwrap();
    }
    graph.build_ddm();
    graph
}

/// Generates a deep linear chain within one category.
fn generate_deep_graph(depth: i64) -> Graph {
    let mut graph = Graph::new();
    graph.add_todo(0, 1);
    for tid in 1..depth {
        graph.add_todo(tid, 1);
        graph.add_dep(tid, tid - 1).unwrap();
    }
    graph.build_ddm();
    graph
}

/// Generates a graph spread across many categories, each depending on the
/// previous category as a whole.
fn generate_category_chain(categories: i64, tasks_per_category: i64) -> Graph {
    let mut graph = Graph::new();
    for cid in 0..categories {
        for t in 0..tasks_per_category {
            graph.add_todo(cid * tasks_per_category + t, cid);
        }
    }
    for cid in 1..categories {
        let dependant = cid * tasks_per_category;
        graph.add_cat_dep(dependant, cid - 1).unwrap();
    }
    graph.build_ddm();
    graph
}

fn benchmark_build_ddm_wide(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_ddm_wide");
    for count in [50, 100, 200, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut graph = generate_wide_graph(count);
            b.iter(|| {
                graph.build_ddm();
                black_box(graph.ddm());
            });
        });
    }
    group.finish();
}

fn benchmark_build_ddm_deep(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_ddm_deep_chain");
    for depth in [10, 20, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut graph = generate_deep_graph(depth);
            b.iter(|| {
                graph.build_ddm();
                black_box(graph.ddm());
            });
        });
    }
    group.finish();
}

fn benchmark_category_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("category_chain");
    for (cats, per_cat) in [(5, 5), (10, 5), (5, 10), (10, 10)] {
        let label = format!("c{cats}_t{per_cat}");
        group.bench_with_input(BenchmarkId::from_parameter(&label), &(cats, per_cat), |b, &(cats, per_cat)| {
            let mut graph = generate_category_chain(cats, per_cat);
            b.iter(|| {
                graph.build_ddm();
                black_box(graph.ddm());
            });
        });
    }
    group.finish();
}

fn benchmark_dedupe(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedupe");
    for count in [20, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let mut g = generate_deep_graph(count);
                    for tid in 2..count {
                        let _ = g.add_dep(tid, 0);
                    }
                    g.build_ddm();
                    g
                },
                |mut g| {
                    g.dedupe();
                    black_box(g)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn benchmark_filter_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_out");
    for count in [100, 500, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let graph = generate_wide_graph(count);
            let excluded: std::collections::HashSet<i64> = (1..=count / 2).collect();
            b.iter(|| black_box(graph.filter_out(&excluded).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_build_ddm_wide,
    benchmark_build_ddm_deep,
    benchmark_category_chain,
    benchmark_dedupe,
    benchmark_filter_out,
);

criterion_main!(benches);
