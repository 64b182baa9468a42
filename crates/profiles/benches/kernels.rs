use criterion::{black_box, criterion_group, criterion_main, Criterion};

use profiles::{interpolate_intervals, interpolate_linear};

fn bench_linear(c: &mut Criterion) {
    let source_x: Vec<f64> = (0..100).map(|i| i as f64 * 250.0).collect();
    let source_y: Vec<f64> = source_x.iter().map(|x| 288.0 - x * 0.0065).collect();
    let target_x: Vec<f64> = (0..47).map(|i| 100.0 + i as f64 * 500.0).collect();
    let mut out = vec![0.0; target_x.len()];

    c.bench_function("interpolate_linear 100->47", |b| {
        b.iter(|| {
            interpolate_linear(
                black_box(&source_x),
                black_box(&source_y),
                black_box(&target_x),
                false,
                &mut out,
            )
            .unwrap();
        })
    });
}

fn bench_intervals(c: &mut Criterion) {
    let mut source_bounds = Vec::with_capacity(200);
    for i in 0..100 {
        source_bounds.push(i as f64 * 250.0);
        source_bounds.push((i + 1) as f64 * 250.0);
    }
    let source_y = vec![1.0e19; 100];
    let mut target_bounds = Vec::with_capacity(94);
    for i in 0..47 {
        target_bounds.push(i as f64 * 500.0);
        target_bounds.push((i + 1) as f64 * 500.0);
    }
    let mut out = vec![0.0; 47];

    c.bench_function("interpolate_intervals 100->47", |b| {
        b.iter(|| {
            interpolate_intervals(
                black_box(&source_bounds),
                black_box(&source_y),
                black_box(&target_bounds),
                &mut out,
            )
            .unwrap();
        })
    });
}

criterion_group!(benches, bench_linear, bench_intervals);
criterion_main!(benches);
