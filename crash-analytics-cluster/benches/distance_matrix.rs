use criterion::{criterion_group, criterion_main, Criterion};

use crash_analytics_cluster::{DistanceMatrix, DistanceType};
use crash_analytics_stacktrace::{CoreFrame, Dialect, Frame, Thread};

fn synthetic_threads(n: usize) -> Vec<Thread> {
    (0..n)
        .map(|i| {
            let mut thread = Thread::new(Dialect::Core);
            thread.frames = (0..20)
                .map(|f| {
                    Frame::Core(CoreFrame {
                        function_name: Some(format!("fn_{}", (i + f) % 50)),
                        ..Default::default()
                    })
                })
                .collect();
            thread
        })
        .collect()
}

fn distance_matrix_benchmark(c: &mut Criterion) {
    let threads = synthetic_threads(200);

    c.bench_function("distance matrix, single-threaded", |b| {
        b.iter(|| DistanceMatrix::compute(&threads, DistanceType::Jaccard))
    });

    c.bench_function("distance matrix, rayon-parallel", |b| {
        b.iter(|| DistanceMatrix::compute_parallel(&threads, DistanceType::Jaccard))
    });
}

criterion_group!(benches, distance_matrix_benchmark);
criterion_main!(benches);
