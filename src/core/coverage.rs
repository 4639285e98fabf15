use smallvec::SmallVec;

use crate::core::policy::CoveragePolicy;
use crate::core::types::{CoverageReport, Gap, Tile, TileStats, TileStatus, TimeRange};

/// Computes how much of `target` is backed by ready tiles and which
/// sub-intervals remain uncovered.
///
/// Pure function: identical inputs yield identical output. The sweep sorts
/// ready tiles by interval start, clips each to the target, records a gap
/// whenever a clipped tile starts past the covered cursor, and advances the
/// cursor to the furthest covered point. Tiles entirely outside the target
/// or with a degenerate clipped span are skipped.
#[must_use]
pub fn calculate_coverage(tiles: &[Tile], target: TimeRange) -> CoverageReport {
    let total_ms = target.len_ms();
    if total_ms <= 0 {
        return CoverageReport::uncovered(target);
    }

    let mut ready: Vec<&Tile> = tiles.iter().filter(|tile| tile.is_ready()).collect();
    if ready.is_empty() {
        return CoverageReport::uncovered(target);
    }
    ready.sort_by_key(|tile| tile.coverage.from_ms);

    let mut gaps: SmallVec<[Gap; 4]> = SmallVec::new();
    let mut covered: SmallVec<[TimeRange; 4]> = SmallVec::new();
    let mut covered_ms: i64 = 0;
    let mut cursor = target.from_ms;

    for tile in ready {
        let Some(clipped) = tile.coverage.clip(target) else {
            continue;
        };

        if clipped.from_ms > cursor {
            gaps.push(Gap::new(cursor, clipped.from_ms));
        }

        // Overlapping tiles only contribute the span past the cursor.
        let advance_from = clipped.from_ms.max(cursor);
        if clipped.to_ms > advance_from {
            covered.push(TimeRange::new(advance_from, clipped.to_ms));
            covered_ms += clipped.to_ms - advance_from;
        }
        cursor = cursor.max(clipped.to_ms);
    }

    if cursor < target.to_ms {
        gaps.push(Gap::new(cursor, target.to_ms));
    }

    let coverage_pct = (100.0 * covered_ms as f64 / total_ms as f64).clamp(0.0, 100.0);
    CoverageReport {
        coverage_pct,
        gaps,
        covered,
    }
}

/// Aggregate tile counts for one (field, bucket width) tile list.
#[must_use]
pub fn tile_stats(tiles: &[Tile]) -> TileStats {
    let mut stats = TileStats {
        total_tiles: tiles.len(),
        ..TileStats::default()
    };
    for tile in tiles {
        match tile.status {
            TileStatus::Ready => stats.ready_tiles += 1,
            TileStatus::Loading => stats.loading_tiles += 1,
            TileStatus::Error => stats.error_tiles += 1,
            TileStatus::Empty => {}
        }
        stats.total_bins += tile.bins.len();
    }
    stats
}

/// Whether the orchestrator should fetch for this target, per policy.
#[must_use]
pub fn needs_load(tiles: &[Tile], target: TimeRange, policy: CoveragePolicy) -> bool {
    calculate_coverage(tiles, target).coverage_pct < policy.needs_load_threshold_pct
}
