//! Routing benchmarks.
//!
//! Run with: `cargo bench -p waypoint-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use waypoint_router::RouteTable;

fn build_table(num_routes: usize) -> RouteTable {
    let mut table = RouteTable::new();

    for i in 0..num_routes / 3 {
        let pattern = format!("/api/v1/resource{i}");
        table.insert(Method::GET, &pattern, format!("GET {pattern}"));
    }

    for i in 0..num_routes / 3 {
        let pattern = format!("/api/v1/resource{i}/{{id}}");
        table.insert(Method::GET, &pattern, format!("GET {pattern}"));
    }

    for i in 0..num_routes / 3 {
        let pattern = format!("/api/v1/org/{{orgId}}/resource{i}/{{id}}");
        table.insert(Method::GET, &pattern, format!("GET {pattern}"));
    }

    table
}

fn bench_static_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("static_match", |b| {
        b.iter(|| {
            black_box(table.lookup(&Method::GET, "/api/v1/resource50"));
        });
    });
}

fn bench_param_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("param_match", |b| {
        b.iter(|| {
            black_box(table.lookup(&Method::GET, "/api/v1/resource25/12345"));
        });
    });
}

fn bench_nested_param_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("nested_param_match", |b| {
        b.iter(|| {
            black_box(table.lookup(&Method::GET, "/api/v1/org/acme-corp/resource10/12345"));
        });
    });
}

fn bench_method_not_allowed(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("method_not_allowed", |b| {
        b.iter(|| {
            black_box(table.lookup(&Method::DELETE, "/api/v1/resource50"));
        });
    });
}

fn bench_miss(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("miss", |b| {
        b.iter(|| {
            black_box(table.lookup(&Method::GET, "/api/v1/nonexistent/path"));
        });
    });
}

fn bench_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_size");

    for size in [30, 300, 3000] {
        let table = build_table(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| black_box(table.lookup(&Method::GET, "/api/v1/resource7/42")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_param_match,
    bench_nested_param_match,
    bench_method_not_allowed,
    bench_miss,
    bench_table_size,
);
criterion_main!(benches);
