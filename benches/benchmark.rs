use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avlset::AvlSet;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for size in SIZES {
        let mut rng = StdRng::seed_from_u64(5489);
        let values: Vec<u64> = (0..size).map(|_| rng.gen()).collect();

        group.bench_with_input(BenchmarkId::new("avl", size), &values, |b, values| {
            b.iter(|| {
                let mut set = AvlSet::new();
                for value in values {
                    set.insert(*value);
                }
                set
            })
        });

        group.bench_with_input(BenchmarkId::new("btree", size), &values, |b, values| {
            b.iter(|| {
                let mut set = BTreeSet::new();
                for value in values {
                    set.insert(*value);
                }
                set
            })
        });
    }
    group.finish();
}

pub fn lookup(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<u64> = (0..100_000).map(|_| rng.gen()).collect();

    let set: AvlSet<u64> = values.iter().copied().collect();

    c.bench_function("avl_find", |b| {
        b.iter(|| {
            for value in &values {
                black_box(set.find(value));
            }
        })
    });

    c.bench_function("avl_lower_bound", |b| {
        b.iter(|| {
            for value in &values {
                black_box(set.lower_bound(&value.wrapping_add(1)));
            }
        })
    });

    c.bench_function("avl_iter", |b| {
        b.iter(|| {
            for value in &set {
                black_box(value);
            }
        })
    });
}

criterion_group!(benches, insert, lookup);
criterion_main!(benches);
