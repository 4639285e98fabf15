use chart_tiles::core::{
    Bin, CoveragePolicy, Quality, SelectionRequest, Tile, TimeRange, select_optimal_data,
};
use indexmap::IndexMap;

fn coverage_tile(bucket_ms: i64, from_ms: i64, to_ms: i64) -> Tile {
    let bins = (from_ms..to_ms)
        .step_by(bucket_ms as usize)
        .map(|t_ms| Bin::new(t_ms, 1.0, 0.5, 1.5, 10))
        .collect();
    Tile::ready(TimeRange::new(from_ms, to_ms), bucket_ms, bins)
}

fn select(
    target_bucket_ms: i64,
    target: TimeRange,
    series_level: &IndexMap<i64, Vec<Tile>>,
    ladder: &[i64],
) -> chart_tiles::ResolutionResult {
    select_optimal_data(
        SelectionRequest {
            target_bucket_ms,
            target,
            series_level,
            ladder,
        },
        CoveragePolicy::default(),
    )
}

#[test]
fn fully_covered_exact_bucket_is_preferred() {
    let mut series_level = IndexMap::new();
    series_level.insert(1_000, vec![coverage_tile(1_000, 0, 60_000)]);
    series_level.insert(500, vec![coverage_tile(500, 0, 60_000)]);

    let result = select(1_000, TimeRange::new(0, 60_000), &series_level, &[1_000, 500]);

    assert_eq!(result.quality, Quality::Exact);
    assert_eq!(result.source_bucket_ms, Some(1_000));
    assert!(!result.is_stale);
    assert_eq!(result.coverage_pct, 100.0);
    assert_eq!(result.data.len(), 60);
}

#[test]
fn finer_fallback_is_labeled_upsampled() {
    // No tiles at the 30s target, 90% coverage at 10s.
    let mut series_level = IndexMap::new();
    series_level.insert(10_000, vec![coverage_tile(10_000, 0, 540_000)]);

    let result = select(
        30_000,
        TimeRange::new(0, 600_000),
        &series_level,
        &[30_000, 10_000, 1_000],
    );

    assert_eq!(result.quality, Quality::Upsampled);
    assert_eq!(result.source_bucket_ms, Some(10_000));
    assert!(result.is_stale);
    assert!((result.coverage_pct - 90.0).abs() <= 1e-9);
    assert!(!result.data.is_empty());
}

#[test]
fn coarser_fallback_is_labeled_downsampled() {
    let mut series_level = IndexMap::new();
    series_level.insert(60_000, vec![coverage_tile(60_000, 0, 600_000)]);

    let result = select(
        10_000,
        TimeRange::new(0, 600_000),
        &series_level,
        &[60_000, 10_000],
    );

    assert_eq!(result.quality, Quality::Downsampled);
    assert_eq!(result.source_bucket_ms, Some(60_000));
    assert!(result.is_stale);
}

#[test]
fn closest_bucket_width_is_tried_first() {
    // Both 20s and 60s fully cover the target; 20s is closer to 30s.
    let mut series_level = IndexMap::new();
    series_level.insert(20_000, vec![coverage_tile(20_000, 0, 600_000)]);
    series_level.insert(60_000, vec![coverage_tile(60_000, 0, 600_000)]);

    let result = select(
        30_000,
        TimeRange::new(0, 600_000),
        &series_level,
        &[60_000, 20_000, 30_000],
    );

    assert_eq!(result.source_bucket_ms, Some(20_000));
    assert_eq!(result.quality, Quality::Upsampled);
}

#[test]
fn distance_ties_keep_ladder_order() {
    // 20s and 40s are both 10s away from the 30s target; the ladder lists
    // 40s first, so it wins the tie.
    let mut series_level = IndexMap::new();
    series_level.insert(20_000, vec![coverage_tile(20_000, 0, 600_000)]);
    series_level.insert(40_000, vec![coverage_tile(40_000, 0, 600_000)]);

    let result = select(
        30_000,
        TimeRange::new(0, 600_000),
        &series_level,
        &[40_000, 20_000],
    );

    assert_eq!(result.source_bucket_ms, Some(40_000));
}

#[test]
fn selection_flips_to_exact_when_coverage_crosses_threshold() {
    let target = TimeRange::new(0, 100_000);
    let ladder = [30_000, 10_000];

    // 94% exact coverage: below acceptance, the 10s fallback is substituted.
    let mut series_level = IndexMap::new();
    series_level.insert(30_000, vec![coverage_tile(30_000, 0, 94_000)]);
    series_level.insert(10_000, vec![coverage_tile(10_000, 0, 100_000)]);

    let fallback = select(30_000, target, &series_level, &ladder);
    assert_eq!(fallback.quality, Quality::Upsampled);
    assert!(fallback.is_stale);

    // 96% exact coverage: acceptance reached, exact wins.
    series_level.insert(30_000, vec![coverage_tile(30_000, 0, 96_000)]);
    let exact = select(30_000, target, &series_level, &ladder);
    assert_eq!(exact.quality, Quality::Exact);
    assert_eq!(exact.source_bucket_ms, Some(30_000));
    assert!(!exact.is_stale);
}

#[test]
fn no_candidate_reaching_fallback_threshold_yields_none() {
    let mut series_level = IndexMap::new();
    series_level.insert(10_000, vec![coverage_tile(10_000, 0, 100_000)]);

    let target = TimeRange::new(0, 600_000);
    let result = select(30_000, target, &series_level, &[30_000, 10_000]);

    assert_eq!(result.quality, Quality::None);
    assert!(result.data.is_empty());
    assert_eq!(result.coverage_pct, 0.0);
    assert_eq!(result.source_bucket_ms, None);
    assert!(!result.is_stale);
}

#[test]
fn target_bucket_absent_from_ladder_falls_through() {
    let mut series_level = IndexMap::new();
    series_level.insert(10_000, vec![coverage_tile(10_000, 0, 600_000)]);

    // 7s was never part of the ladder; the ranked search still resolves.
    let result = select(7_000, TimeRange::new(0, 600_000), &series_level, &[10_000]);

    assert_eq!(result.quality, Quality::Downsampled);
    assert_eq!(result.source_bucket_ms, Some(10_000));
}

#[test]
fn result_data_is_filtered_to_target_window() {
    let mut series_level = IndexMap::new();
    series_level.insert(1_000, vec![coverage_tile(1_000, 0, 120_000)]);

    let result = select(1_000, TimeRange::new(30_000, 60_000), &series_level, &[1_000]);

    assert_eq!(result.quality, Quality::Exact);
    assert!(result.data.iter().all(|bin| (30_000..=60_000).contains(&bin.t_ms)));
}

#[test]
fn thresholds_are_overridable_policy() {
    let mut series_level = IndexMap::new();
    series_level.insert(10_000, vec![coverage_tile(10_000, 0, 70_000)]);

    let target = TimeRange::new(0, 100_000);
    let request = SelectionRequest {
        target_bucket_ms: 30_000,
        target,
        series_level: &series_level,
        ladder: &[30_000, 10_000],
    };

    let strict = select_optimal_data(request, CoveragePolicy::default());
    assert_eq!(strict.quality, Quality::None);

    let lenient = CoveragePolicy {
        fallback_acceptance_pct: 60.0,
        ..CoveragePolicy::default()
    };
    let accepted = select_optimal_data(request, lenient);
    assert_eq!(accepted.quality, Quality::Upsampled);
}
