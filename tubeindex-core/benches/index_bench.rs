use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tubeindex_core::VectorIndex;

const DIMENSION: usize = 384;

fn pseudo_vector(seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    (0..DIMENSION)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 40) as f32 / (1u64 << 24) as f32
        })
        .collect()
}

fn filled_index(n: usize) -> VectorIndex {
    let mut index = VectorIndex::new(DIMENSION);
    for i in 0..n {
        index.add(&pseudo_vector(i as u64)).unwrap();
    }
    index
}

fn bench_add(c: &mut Criterion) {
    let vector = pseudo_vector(7);
    c.bench_function("vector_index_add_1k", |b| {
        b.iter(|| {
            let mut index = VectorIndex::new(DIMENSION);
            for _ in 0..1_000 {
                index.add(black_box(&vector)).unwrap();
            }
            index
        })
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_index_search");
    let query = pseudo_vector(u64::MAX);

    for size in [100usize, 1_000, 10_000] {
        let index = filled_index(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &index, |b, index| {
            b.iter(|| index.search(black_box(&query), 10).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add, bench_search);
criterion_main!(benches);
