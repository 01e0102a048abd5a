//! Benchmarks for single-tile rendering.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use renderer::png::encode_png;
use renderer::{render_tile, ColorScale, ColorSpec, RenderOptions};
use test_utils::{cloud_from_grid, create_grid_with_gaps, create_ssh_grid};
use tile_common::TileCoord;

fn bench_render_tile(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_tile");
    let spec = ColorSpec::new(ColorScale::RdBu, -0.75, 0.75, 20).unwrap();
    let coord = TileCoord::new(3, 2, 4);

    for &resolution in &[20usize, 80, 200] {
        let cloud = cloud_from_grid(&create_ssh_grid((-60.0, 0.0, resolution), (-90.0, 0.0, resolution)));
        group.throughput(Throughput::Elements(cloud.len() as u64));
        group.bench_with_input(BenchmarkId::new("ssh", resolution), &cloud, |b, cloud| {
            b.iter(|| render_tile(black_box(cloud), &coord, &spec, &RenderOptions::default()))
        });
    }

    let gappy = cloud_from_grid(&create_grid_with_gaps(
        (-60.0, 0.0, 120),
        (-90.0, 0.0, 120),
        &[(-60.0, -40.0, -30.0, -20.0), (-20.0, -55.0, -5.0, -45.0)],
    ));
    let spec = ColorSpec::new(ColorScale::Viridis, -150.0, 0.0, 20).unwrap();
    group.bench_function("gaps", |b| {
        b.iter(|| render_tile(black_box(&gappy), &coord, &spec, &RenderOptions::default()))
    });

    let options = RenderOptions::default().with_supersample(2);
    group.bench_function("gaps_supersampled", |b| {
        b.iter(|| render_tile(black_box(&gappy), &coord, &spec, &options))
    });

    group.finish();
}

fn bench_encode_png(c: &mut Criterion) {
    let spec = ColorSpec::new(ColorScale::RdBu, -0.75, 0.75, 20).unwrap();
    let cloud = cloud_from_grid(&create_ssh_grid((-60.0, 0.0, 80), (-90.0, 0.0, 80)));
    let image = render_tile(&cloud, &TileCoord::new(3, 2, 4), &spec, &RenderOptions::default())
        .expect("valid tile");

    c.bench_function("encode_png_256", |b| {
        b.iter(|| encode_png(black_box(image.pixels()), 256, 256))
    });
}

criterion_group!(benches, bench_render_tile, bench_encode_png);
criterion_main!(benches);
