//! Benchmarks for the field crate - grid sampling, masks and field interpolation.
//!
//! Run with: cargo bench --package field
//! Or: cargo bench --package field --bench field_benchmarks -- interpolate_field

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use earth_common::{CancelFlag, Product};
use field::{FieldConfig, FieldRequest, FieldTask, GridSampler, MaskBuilder, OverlaySource};
use projection::{Orthographic, Projection, View};
use rand::Rng;
use std::sync::Arc;
use test_utils::{global_1deg, vector_records, WIND_CATEGORY};

/// A global one-degree wind grid with smooth zonal flow plus noise.
fn generate_wind_sampler() -> GridSampler {
    let header = global_1deg();
    let mut rng = rand::thread_rng();
    let n = header.nx * header.ny;
    let mut u = Vec::with_capacity(n);
    let mut v = Vec::with_capacity(n);
    for row in 0..header.ny {
        let lat = (90.0 - row as f64).to_radians();
        for _ in 0..header.nx {
            u.push(15.0 * (2.0 * lat).cos() + rng.gen_range(-2.0..2.0));
            v.push(rng.gen_range(-5.0..5.0));
        }
    }
    let grid = Product::Wind
        .build(&vector_records(&header, WIND_CATEGORY, u, v))
        .expect("valid wind records");
    GridSampler::new(Arc::new(grid))
}

// =============================================================================
// SAMPLER BENCHMARKS
// =============================================================================

fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_sampler");
    let sampler = generate_wind_sampler();

    let mut rng = rand::thread_rng();
    let points: Vec<(f64, f64)> = (0..10_000)
        .map(|_| (rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0)))
        .collect();

    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("interpolate_10k", |b| {
        b.iter(|| {
            for &(lon, lat) in &points {
                black_box(sampler.interpolate(black_box(lon), black_box(lat)));
            }
        });
    });

    group.finish();
}

// =============================================================================
// MASK BENCHMARKS
// =============================================================================

fn bench_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_build");

    for (width, height) in [(640, 480), (1280, 720), (1920, 1080)] {
        let view = View::new(width, height);
        let globe = Orthographic::centered_on(-30.0, 20.0, view);
        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::new("orthographic", format!("{}x{}", width, height)),
            &globe,
            |b, globe| b.iter(|| MaskBuilder::build(black_box(globe), view)),
        );
    }

    group.finish();
}

// =============================================================================
// FIELD INTERPOLATION BENCHMARKS
// =============================================================================

fn bench_interpolate_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate_field");
    group.sample_size(10);
    let sampler = generate_wind_sampler();

    for (width, height) in [(640, 480), (1280, 720)] {
        let view = View::new(width, height);
        let projection: Arc<dyn Projection> =
            Arc::new(Orthographic::centered_on(-30.0, 20.0, view));
        let request = FieldRequest {
            primary: sampler.clone(),
            overlay: OverlaySource::Magnitude(Product::Wind.scale()),
            projection: projection.clone(),
            velocity_scale: 1.0 / 60000.0,
        };

        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::new("orthographic", format!("{}x{}", width, height)),
            &request,
            |b, request| {
                b.iter(|| {
                    let mask = MaskBuilder::build(projection.as_ref(), view).expect("mask");
                    let task = FieldTask::new(
                        request.clone(),
                        mask,
                        FieldConfig::default(),
                        CancelFlag::new(),
                    )
                    .expect("task");
                    black_box(task.run_to_completion())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_sampler, bench_mask, bench_interpolate_field);
criterion_main!(benches);
