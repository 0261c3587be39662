use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use ordtree::OrderedTree;
use std::collections::BTreeMap;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Simple LCG for a deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn key_orders() -> [(&'static str, Vec<i64>); 3] {
    [
        ("ordered", ordered_keys(N)),
        ("reverse", reverse_ordered_keys(N)),
        ("random", random_keys(N)),
    ]
}

// ─── Point operations ───────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("insert_{order}"));

        group.bench_function(BenchmarkId::new("OrderedTree", N), |b| {
            b.iter(|| {
                let mut tree = OrderedTree::new();
                for &k in &keys {
                    tree.set(k, k);
                }
                tree
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            });
        });

        group.finish();
    }
}

fn bench_get(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let tree: OrderedTree<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
        let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

        let mut group = c.benchmark_group(format!("get_{order}"));

        group.bench_function(BenchmarkId::new("OrderedTree", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = tree.get(&k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for &k in &keys {
                    if let Some(&v) = map.get(&k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });

        group.finish();
    }
}

fn bench_remove(c: &mut Criterion) {
    for (order, keys) in key_orders() {
        let mut group = c.benchmark_group(format!("remove_{order}"));

        group.bench_function(BenchmarkId::new("OrderedTree", N), |b| {
            b.iter_batched(
                || keys.iter().map(|&k| (k, k)).collect::<OrderedTree<i64, i64>>(),
                |mut tree| {
                    for &k in &keys {
                        tree.remove(&k);
                    }
                    tree
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
            b.iter_batched(
                || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
                |mut map| {
                    for &k in &keys {
                        map.remove(&k);
                    }
                    map
                },
                BatchSize::SmallInput,
            );
        });

        group.finish();
    }
}

// ─── Range scans ────────────────────────────────────────────────────────────

fn bench_range_scan(c: &mut Criterion) {
    let keys = random_keys(N);
    let tree: OrderedTree<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let (lo, hi) = (i64::from(u32::MAX / 4), i64::from(u32::MAX / 2));

    let mut group = c.benchmark_group("range_scan");

    group.bench_function(BenchmarkId::new("OrderedTree", N), |b| {
        b.iter(|| tree.values_between(Some(&lo), Some(&hi)).fold(0i64, |acc, &v| acc.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| map.range(lo..hi).fold(0i64, |acc, (_, &v)| acc.wrapping_add(v)));
    });

    group.finish();
}

// ─── Fanout sweep ───────────────────────────────────────────────────────────

fn bench_fanout_sweep(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("fanout_insert_remove");

    for t in [2, 4, 6, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(t), &t, |b, &t| {
            b.iter(|| {
                let mut tree = OrderedTree::with_fanout(t).expect("fanout is at least 2");
                for &k in &keys {
                    tree.set(k, k);
                }
                for &k in &keys {
                    tree.remove(&k);
                }
                tree
            });
        });
    }

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(point_benches, bench_insert, bench_get, bench_remove);

criterion_group!(scan_benches, bench_range_scan, bench_fanout_sweep);

criterion_main!(point_benches, scan_benches);
