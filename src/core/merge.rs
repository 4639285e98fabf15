use std::collections::BTreeMap;

use crate::core::types::{Bin, Tile, TimeRange};

/// Merges the bins of all ready tiles into one series sorted by time
/// ascending with duplicate timestamps removed.
///
/// Duplicate precedence is newest-tile-wins: tiles are visited in ascending
/// `loaded_at` order (tiles without a load timestamp sort oldest) and a
/// later tile's bin replaces an earlier tile's bin at the same timestamp.
/// This keeps the merge deterministic when a fresh tile supersedes a stale
/// one over the same instant. Idempotent.
#[must_use]
pub fn merge_bins(tiles: &[Tile]) -> Vec<Bin> {
    let mut ready: Vec<&Tile> = tiles.iter().filter(|tile| tile.is_ready()).collect();
    ready.sort_by_key(|tile| tile.loaded_at);

    let mut by_time: BTreeMap<i64, Bin> = BTreeMap::new();
    for tile in ready {
        for bin in &tile.bins {
            by_time.insert(bin.t_ms, *bin);
        }
    }
    by_time.into_values().collect()
}

/// Returns the sub-sequence of bins whose timestamp lies in the inclusive
/// `[from_ms, to_ms]` window.
#[must_use]
pub fn filter_bins_by_range(bins: &[Bin], range: TimeRange) -> Vec<Bin> {
    bins.iter()
        .copied()
        .filter(|bin| range.contains(bin.t_ms))
        .collect()
}
