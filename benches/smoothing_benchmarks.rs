//! Benchmarks for the per-sample hot path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pose_streamer::{codec::encode, smoothing::SmoothingWindow};

fn benchmark_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoothing");

    // Test data - simulating noisy yaw measurements
    let test_data: Vec<f64> = (0..100)
        .map(|i| {
            let t = f64::from(i) * 0.1;
            15.0 * t.sin() + 0.5 * rand::random::<f64>()
        })
        .collect();

    for window_size in [4, 8, 16, 32] {
        group.bench_with_input(
            BenchmarkId::new("push", window_size),
            &window_size,
            |b, &window_size| {
                let mut window = SmoothingWindow::new(window_size, 50.0);
                b.iter(|| {
                    for &sample in &test_data {
                        black_box(window.push(black_box(sample)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn benchmark_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    group.bench_function("encode", |b| {
        b.iter(|| black_box(encode(black_box(-417))));
    });

    group.bench_function("push_and_encode", |b| {
        let mut window = SmoothingWindow::default();
        let mut angle = -20.0;
        b.iter(|| {
            angle = if angle > 20.0 { -20.0 } else { angle + 0.37 };
            black_box(encode(window.push(angle)))
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_window, benchmark_frame);
criterion_main!(benches);
