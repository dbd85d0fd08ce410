//! Benchmarks for the renderer crate - color scales, region painting and PNG encoding.
//!
//! Run with: cargo bench --package renderer -- scale
//! Or: cargo bench --package renderer --bench render_benchmarks

use atlas_common::VisualizationSetting;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use projection::{project_geometry, ScreenProjection};
use rand::Rng;
use renderer::scale::{collect_values, create_color_scale};
use renderer::{png, Color, FeatureStyle, RankIndex, RankPolicy, Surface};
use test_utils::{grid_collection, unit_frame};

/// Random statistic values with roughly one region in ten missing.
fn generate_values(n: usize) -> Vec<Option<f64>> {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| {
            if rng.gen_bool(0.1) {
                None
            } else {
                Some(rng.gen_range(0.0..1000.0))
            }
        })
        .collect()
}

/// Random RGBA pixel data (many unique colors - RGBA fallback).
fn generate_rgba_data(width: u32, height: u32) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut data = vec![0u8; (width * height * 4) as usize];
    for chunk in data.chunks_mut(4) {
        chunk[0] = rng.gen();
        chunk[1] = rng.gen();
        chunk[2] = rng.gen();
        chunk[3] = 255;
    }
    data
}

// =============================================================================
// COLOR SCALE BENCHMARKS
// =============================================================================

fn bench_color_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale");

    for n in [250usize, 2_500, 25_000] {
        let values = collect_values(generate_values(n));
        let setting = VisualizationSetting::default().with_level(10);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("create_and_apply", n), &values, |b, values| {
            b.iter(|| {
                let scale = create_color_scale(black_box(values), &setting).unwrap();
                values.iter().map(|v| scale.color(*v)).fold(0u32, |acc, c| acc ^ c.r as u32)
            });
        });
    }

    group.finish();
}

fn bench_rank_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for n in [250usize, 2_500, 25_000] {
        let fc = grid_collection(n, 1, 1.0, |_| None);
        let values = generate_values(n);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(BenchmarkId::new("build", n), |b| {
            b.iter(|| {
                let index = RankIndex::build(fc.iter().map(|f| &f.id).zip(values.iter().copied()));
                black_box(index.valid_count())
            });
        });
    }

    let policy = RankPolicy::default();
    group.bench_function("palette_index", |b| {
        b.iter(|| {
            (0..1000).filter_map(|r| renderer::rank::rank_palette_index(r, 1000, 5, &policy)).sum::<usize>()
        });
    });

    group.finish();
}

// =============================================================================
// PAINTING BENCHMARKS
// =============================================================================

fn bench_paint_regions(c: &mut Criterion) {
    let mut group = c.benchmark_group("paint");

    for cols in [10usize, 40] {
        let cell = 512.0 / cols as f64;
        let fc = grid_collection(cols, cols, cell, |i| Some(i as f64));
        let frame = unit_frame(atlas_common::Extent::new(0.0, 0.0, 512.0, 512.0));
        let projection = ScreenProjection::from_frame(&frame).unwrap();
        group.throughput(Throughput::Elements((cols * cols) as u64));

        group.bench_function(BenchmarkId::new("project_and_fill", cols * cols), |b| {
            let mut surface = Surface::new(512, 512).unwrap();
            b.iter(|| {
                surface.clear();
                for (i, feature) in fc.iter().enumerate() {
                    let path = project_geometry(&feature.geometry, &projection);
                    let fill = Color::rgb((i % 255) as u8, 120, 80);
                    surface.draw_path(&path, &FeatureStyle::filled(fill));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// PNG ENCODING BENCHMARKS
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");

    for (width, height) in [(256u32, 256u32), (512, 512), (1024, 1024)] {
        group.throughput(Throughput::Bytes((width * height * 4) as u64));

        let random = generate_rgba_data(width, height);
        group.bench_with_input(
            BenchmarkId::new("rgba_random", format!("{}x{}", width, height)),
            &random,
            |b, data| b.iter(|| png::encode_rgba(black_box(data), width, height)),
        );

        // Choropleth-like output: a few flat bucket colors.
        let mut surface = Surface::new(width, height).unwrap();
        let band = width as f32 / 5.0;
        for i in 0..5 {
            surface.fill_rect(i as f32 * band, 0.0, band, height as f32, Color::rgb(40 * i as u8, 90, 200));
        }
        group.bench_with_input(
            BenchmarkId::new("indexed_buckets", format!("{}x{}", width, height)),
            &surface,
            |b, surface| b.iter(|| png::encode_surface(black_box(surface))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_color_scale,
    bench_rank_index,
    bench_paint_regions,
    bench_png_encoding,
);
criterion_main!(benches);
