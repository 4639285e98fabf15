use chart_tiles::core::{
    Bin, CoveragePolicy, SelectionRequest, Tile, TimeRange, calculate_coverage, merge_bins,
    select_optimal_data,
};
use criterion::{Criterion, criterion_group, criterion_main};
use indexmap::IndexMap;
use std::hint::black_box;

fn tiled_series(bucket_ms: i64, tile_span_ms: i64, tiles: usize) -> Vec<Tile> {
    (0..tiles)
        .map(|i| {
            let from_ms = i as i64 * tile_span_ms;
            let bins = (from_ms..from_ms + tile_span_ms)
                .step_by(bucket_ms as usize)
                .map(|t_ms| Bin::new(t_ms, 0.5, 0.1, 0.9, 12))
                .collect();
            Tile::ready(TimeRange::new(from_ms, from_ms + tile_span_ms), bucket_ms, bins)
        })
        .collect()
}

fn bench_coverage_sweep_100_tiles(c: &mut Criterion) {
    let tiles = tiled_series(1_000, 60_000, 100);
    let target = TimeRange::new(0, 6_000_000);

    c.bench_function("coverage_sweep_100_tiles", |b| {
        b.iter(|| calculate_coverage(black_box(&tiles), black_box(target)))
    });
}

fn bench_merge_bins_10k(c: &mut Criterion) {
    // 100 tiles x 100 bins, adjacent tiles sharing boundary timestamps.
    let tiles = tiled_series(1_000, 100_000, 100);

    c.bench_function("merge_bins_10k", |b| {
        b.iter(|| merge_bins(black_box(&tiles)))
    });
}

fn bench_select_with_fallback_search(c: &mut Criterion) {
    let mut series_level = IndexMap::new();
    series_level.insert(10_000, tiled_series(10_000, 600_000, 9));
    series_level.insert(60_000, tiled_series(60_000, 600_000, 10));
    let ladder = vec![60_000, 30_000, 10_000, 5_000, 1_000];
    let target = TimeRange::new(0, 6_000_000);

    c.bench_function("select_with_fallback_search", |b| {
        b.iter(|| {
            select_optimal_data(
                SelectionRequest {
                    target_bucket_ms: black_box(30_000),
                    target: black_box(target),
                    series_level: &series_level,
                    ladder: &ladder,
                },
                CoveragePolicy::default(),
            )
        })
    });
}

criterion_group!(
    benches,
    bench_coverage_sweep_100_tiles,
    bench_merge_bins_10k,
    bench_select_with_fallback_search
);
criterion_main!(benches);
