use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trailsense_core::BinaryDescriptor;
use trailsense_engine::recognition::scan_landmarks;
use trailsense_engine::LandmarkStore;
use trailsense_features::BruteForceMatcher;

fn descriptors(seed: u64, n: usize) -> Vec<BinaryDescriptor> {
    let mut state = seed | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    (0..n)
        .map(|_| BinaryDescriptor([next(), next(), next(), next()]))
        .collect()
}

fn bench_scan(c: &mut Criterion) {
    let matcher = BruteForceMatcher::default();
    let query = descriptors(0xfeed, 500);

    let mut group = c.benchmark_group("recognition_scan");
    group.sample_size(10);
    for landmarks in [1usize, 8, 32] {
        let mut store = LandmarkStore::new();
        for i in 0..landmarks {
            store
                .append(descriptors(i as u64 + 1, 500), 500, i as f64 * 3.0, None)
                .expect("append");
        }
        group.bench_with_input(
            BenchmarkId::from_parameter(landmarks),
            &store,
            |b, store| b.iter(|| scan_landmarks(&matcher, black_box(&query), store, 50)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
