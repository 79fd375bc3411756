//! Benchmarks for ball tree construction and k-NN queries.

use balltree_knn::knn::brute_force;
use balltree_knn::{BallTree, BallTreeConfig, DataPoint, KnnDistance};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

fn random_points(n: usize, dim: usize, seed: u64) -> Vec<DataPoint<f64, usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| DataPoint::new((0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect(), i))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for n in [1_000, 10_000, 50_000] {
        let data = random_points(n, 8, 42);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| {
                BallTree::from_data_points(
                    data.clone(),
                    KnnDistance::Euclidean,
                    &BallTreeConfig::default(),
                )
            })
        });
    }
    group.finish();
}

fn bench_knn_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn_query");
    let data = random_points(20_000, 8, 7);
    let queries: Vec<Vec<f64>> =
        random_points(100, 8, 99).into_iter().map(|p| p.features).collect();
    let config = BallTreeConfig::default();
    let tree = match BallTree::from_data_points(data.clone(), KnnDistance::Euclidean, &config) {
        Ok(tree) => tree,
        Err(err) => panic!("failed to build benchmark tree: {err}"),
    };

    for k in [1, 10, 50] {
        group.bench_with_input(BenchmarkId::new("ball_tree", k), &k, |b, &k| {
            b.iter(|| {
                for query in &queries {
                    black_box(tree.find_k_nearest(k, query).ok());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("brute_force", k), &k, |b, &k| {
            b.iter(|| {
                for query in &queries {
                    black_box(brute_force::k_nearest(&data, query, k, &KnnDistance::Euclidean));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_knn_query);
criterion_main!(benches);
