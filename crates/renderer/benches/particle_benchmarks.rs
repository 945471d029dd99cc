//! Benchmarks for the renderer crate - particle frames and PNG encoding.
//!
//! Run with: cargo bench --package renderer
//! Or: cargo bench --package renderer --bench particle_benchmarks -- particle_frame

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use earth_common::{CancelFlag, Product};
use field::{Field, FieldConfig, FieldRequest, FieldTask, GridSampler, MaskBuilder, OverlaySource};
use projection::{Orthographic, Projection, View};
use rand::Rng;
use renderer::png::{encode_png, encode_png_auto};
use renderer::{AnimationConfig, ParticleAnimator, TrailCanvas};
use std::sync::Arc;
use test_utils::{global_1deg, vector_records, WIND_CATEGORY};

/// A globe field over a noisy zonal wind.
fn generate_field(view: View) -> Arc<Field> {
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

    let projection: Arc<dyn Projection> = Arc::new(Orthographic::centered_on(0.0, 0.0, view));
    let mask = MaskBuilder::build(projection.as_ref(), view).expect("mask");
    let request = FieldRequest {
        primary: GridSampler::new(Arc::new(grid)),
        overlay: OverlaySource::Magnitude(Product::Wind.scale()),
        projection,
        velocity_scale: Product::Wind.particles().expect("wind animates").velocity_scale,
    };
    let field = FieldTask::new(request, mask, FieldConfig::default(), CancelFlag::new())
        .expect("task")
        .run_to_completion()
        .expect("field")
        .expect("not cancelled");
    Arc::new(field)
}

fn animator(field: Arc<Field>, low_power: bool) -> ParticleAnimator {
    let config = AnimationConfig {
        low_power,
        seed: Some(42),
        ..Default::default()
    };
    let settings = Product::Wind.particles().expect("wind animates");
    ParticleAnimator::new(field, settings, config, CancelFlag::new()).expect("animator")
}

// =============================================================================
// PARTICLE BENCHMARKS
// =============================================================================

fn bench_particle_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_frame");

    for &(width, height) in &[(320usize, 240usize), (800, 600)] {
        let view = View::new(width, height);
        let field = generate_field(view);

        for &low_power in &[false, true] {
            let mut animator = animator(field.clone(), low_power);
            let mut canvas = TrailCanvas::new(view).expect("canvas");
            group.throughput(Throughput::Elements(animator.particles().len() as u64));

            let label = if low_power { "low_power" } else { "full" };
            group.bench_with_input(
                BenchmarkId::new(label, format!("{}x{}", width, height)),
                &(),
                |b, _| {
                    b.iter(|| {
                        animator.evolve();
                        animator.draw(black_box(&mut canvas)).expect("draw");
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_evolve_only(c: &mut Criterion) {
    let view = View::new(800, 600);
    let mut animator = animator(generate_field(view), false);

    c.bench_function("evolve_800x600", |b| {
        b.iter(|| {
            animator.evolve();
            black_box(animator.buckets().len());
        });
    });
}

// =============================================================================
// PNG BENCHMARKS
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");
    let view = View::new(800, 600);

    // A frame after a few dozen steps: gray trails over transparency.
    let mut animator = animator(generate_field(view), false);
    let mut canvas = TrailCanvas::new(view).expect("canvas");
    for _ in 0..30 {
        animator.evolve();
        animator.draw(&mut canvas).expect("draw");
    }
    let frame = canvas.to_rgba();
    group.throughput(Throughput::Bytes(frame.len() as u64));

    group.bench_function("frame_auto", |b| {
        b.iter(|| encode_png_auto(black_box(&frame), view.width, view.height).expect("png"));
    });
    group.bench_function("frame_rgba", |b| {
        b.iter(|| encode_png(black_box(&frame), view.width, view.height).expect("png"));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_particle_frame,
    bench_evolve_only,
    bench_png_encoding,
);
criterion_main!(benches);
