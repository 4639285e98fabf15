//! chart-tiles: multi-resolution tile cache for large time-series charts.
//!
//! This crate decides, for a visible time window and pixel width, which
//! pre-aggregated bucket granularity to show, tracks which sub-ranges of
//! each granularity are cached, computes coverage and gaps to drive further
//! fetches, and substitutes a nearby granularity when the ideal one is
//! incomplete. It renders nothing and owns no transport; the chart surface
//! consumes [`ResolutionResult`] and the orchestrator drives the store.

pub mod core;
pub mod error;
pub mod store;
pub mod telemetry;

pub use crate::core::{
    Bin, CoveragePolicy, CoverageReport, Gap, Quality, ResolutionResult, Tile, TileStats,
    TileStatus, TimeRange,
};
pub use error::{TileError, TileResult};
pub use store::{FieldKey, FieldView, LoadPhase, TileStore, WriteMode};
