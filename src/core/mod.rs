pub mod coverage;
pub mod ladder;
pub mod merge;
pub mod policy;
pub mod resolution;
pub mod types;

pub use coverage::{calculate_coverage, needs_load, tile_stats};
pub use ladder::{NICE_BUCKET_WIDTHS_MS, build_bucket_levels, extend_with_weekly_multiples, snap_range};
pub use merge::{filter_bins_by_range, merge_bins};
pub use policy::CoveragePolicy;
pub use resolution::{SelectionRequest, select_optimal_data};
pub use types::{
    Bin, CoverageReport, Gap, Quality, ResolutionResult, Tile, TileStats, TileStatus, TimeRange,
};
