use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::core::coverage::calculate_coverage;
use crate::core::merge::{filter_bins_by_range, merge_bins};
use crate::core::policy::CoveragePolicy;
use crate::core::types::{Quality, ResolutionResult, Tile, TimeRange};

/// Inputs for one resolution-selection pass over a field's tile ladder.
///
/// `series_level` maps bucket width to that width's cached tiles;
/// `ladder` is the field's bucket ladder, coarsest first. Both are borrowed
/// snapshots: selection never mutates the cache.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub target_bucket_ms: i64,
    pub target: TimeRange,
    pub series_level: &'a IndexMap<i64, Vec<Tile>>,
    pub ladder: &'a [i64],
}

/// Picks the best available resolution for a target bucket width and
/// interval.
///
/// Exact-resolution tiles win when their coverage reaches the exact
/// acceptance threshold. Otherwise every other ladder width is ranked by
/// absolute distance from the target (ties keep ladder order) and the first
/// candidate reaching the fallback threshold is substituted, labeled
/// `Upsampled` when finer than the target and `Downsampled` when coarser.
/// A target width absent from the ladder is not an error; it simply falls
/// through to the ranked search. Worst case is `Quality::None`.
#[must_use]
pub fn select_optimal_data(request: SelectionRequest<'_>, policy: CoveragePolicy) -> ResolutionResult {
    let SelectionRequest {
        target_bucket_ms,
        target,
        series_level,
        ladder,
    } = request;

    if let Some(tiles) = series_level.get(&target_bucket_ms) {
        let report = calculate_coverage(tiles, target);
        if report.coverage_pct >= policy.exact_acceptance_pct {
            return ResolutionResult {
                data: filter_bins_by_range(&merge_bins(tiles), target),
                quality: Quality::Exact,
                coverage_pct: report.coverage_pct,
                source_bucket_ms: Some(target_bucket_ms),
                is_stale: false,
                gaps: report.gaps,
            };
        }
    }

    for candidate in rank_fallback_widths(target_bucket_ms, ladder) {
        let Some(tiles) = series_level.get(&candidate) else {
            continue;
        };
        let report = calculate_coverage(tiles, target);
        if report.coverage_pct < policy.fallback_acceptance_pct {
            continue;
        }

        let quality = if candidate < target_bucket_ms {
            Quality::Upsampled
        } else {
            Quality::Downsampled
        };
        return ResolutionResult {
            data: filter_bins_by_range(&merge_bins(tiles), target),
            quality,
            coverage_pct: report.coverage_pct,
            source_bucket_ms: Some(candidate),
            is_stale: true,
            gaps: report.gaps,
        };
    }

    ResolutionResult::none(target)
}

/// Every ladder width except the target, closest absolute distance first.
/// Equal distances keep the ladder's original order (stable sort).
fn rank_fallback_widths(target_bucket_ms: i64, ladder: &[i64]) -> SmallVec<[i64; 8]> {
    let mut candidates: SmallVec<[i64; 8]> = ladder
        .iter()
        .copied()
        .filter(|&width| width != target_bucket_ms)
        .collect();
    candidates.sort_by_key(|&width| (width - target_bucket_ms).abs());
    candidates
}
