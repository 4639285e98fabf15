use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Closed time interval in epoch milliseconds.
///
/// Coverage math treats `to_ms` as inclusive. The constructor normalizes
/// reversed bounds instead of rejecting them: a zero-width zoom is an
/// ordinary UI state, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from_ms: i64,
    pub to_ms: i64,
}

impl TimeRange {
    #[must_use]
    pub fn new(from_ms: i64, to_ms: i64) -> Self {
        Self {
            from_ms: from_ms.min(to_ms),
            to_ms: from_ms.max(to_ms),
        }
    }

    #[must_use]
    pub fn len_ms(self) -> i64 {
        self.to_ms - self.from_ms
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.len_ms() <= 0
    }

    /// Intersects with another range. Returns `None` when the ranges are
    /// disjoint or the intersection has zero length.
    #[must_use]
    pub fn clip(self, bounds: Self) -> Option<Self> {
        let from = self.from_ms.max(bounds.from_ms);
        let to = self.to_ms.min(bounds.to_ms);
        (to > from).then_some(Self {
            from_ms: from,
            to_ms: to,
        })
    }

    #[must_use]
    pub fn contains(self, t_ms: i64) -> bool {
        t_ms >= self.from_ms && t_ms <= self.to_ms
    }
}

/// One aggregated data point.
///
/// `count` may be zero, in which case the aggregates are typically absent.
/// Absence is modeled explicitly; consumers must handle `None` rather than
/// probing for field existence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub t_ms: i64,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: u64,
}

impl Bin {
    #[must_use]
    pub fn new(t_ms: i64, avg: f64, min: f64, max: f64, count: u64) -> Self {
        Self {
            t_ms,
            avg: Some(avg),
            min: Some(min),
            max: Some(max),
            count,
        }
    }

    /// A bin holding no samples.
    #[must_use]
    pub fn vacant(t_ms: i64) -> Self {
        Self {
            t_ms,
            avg: None,
            min: None,
            max: None,
            count: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileStatus {
    Ready,
    Loading,
    Error,
    Empty,
}

/// The unit of cached data: an immutable record of aggregated points
/// covering one interval at one bucket width.
///
/// Tiles are never mutated after creation. Superseding data is added as a
/// new tile; overlap between tiles of the same bucket width is resolved by
/// the coverage sweep and by the newest-wins bin merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coverage: TimeRange,
    pub bucket_ms: i64,
    pub bins: Vec<Bin>,
    pub status: TileStatus,
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl Tile {
    /// Creates a `Ready` tile, enforcing the ready-tile invariant: bins are
    /// sorted by time ascending with duplicate timestamps removed (first
    /// occurrence kept).
    #[must_use]
    pub fn ready(coverage: TimeRange, bucket_ms: i64, mut bins: Vec<Bin>) -> Self {
        bins.sort_by_key(|bin| bin.t_ms);
        bins.dedup_by_key(|bin| bin.t_ms);
        Self {
            coverage,
            bucket_ms,
            bins,
            status: TileStatus::Ready,
            error: None,
            loaded_at: Some(Utc::now()),
        }
    }

    #[must_use]
    pub fn loading(coverage: TimeRange, bucket_ms: i64) -> Self {
        Self {
            coverage,
            bucket_ms,
            bins: Vec::new(),
            status: TileStatus::Loading,
            error: None,
            loaded_at: None,
        }
    }

    /// Marks an interval as fetched and known to hold no data.
    #[must_use]
    pub fn empty(coverage: TimeRange, bucket_ms: i64) -> Self {
        Self {
            coverage,
            bucket_ms,
            bins: Vec::new(),
            status: TileStatus::Empty,
            error: None,
            loaded_at: Some(Utc::now()),
        }
    }

    #[must_use]
    pub fn failed(coverage: TimeRange, bucket_ms: i64, message: impl Into<String>) -> Self {
        Self {
            coverage,
            bucket_ms,
            bins: Vec::new(),
            status: TileStatus::Error,
            error: Some(message.into()),
            loaded_at: None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == TileStatus::Ready
    }

    /// Overrides the load timestamp. Used by tests and by hosts replaying a
    /// persisted cache; ordinary fetch completions keep the constructor
    /// timestamp.
    #[must_use]
    pub fn with_loaded_at(mut self, loaded_at: DateTime<Utc>) -> Self {
        self.loaded_at = Some(loaded_at);
        self
    }
}

/// A sub-interval of a requested range not covered by any ready tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub from_ms: i64,
    pub to_ms: i64,
}

impl Gap {
    #[must_use]
    pub fn new(from_ms: i64, to_ms: i64) -> Self {
        Self { from_ms, to_ms }
    }

    #[must_use]
    pub fn len_ms(self) -> i64 {
        self.to_ms - self.from_ms
    }
}

/// Outcome of a coverage sweep over one bucket width's tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Percentage of the target interval backed by ready tiles, 0..=100.
    pub coverage_pct: f64,
    pub gaps: SmallVec<[Gap; 4]>,
    pub covered: SmallVec<[TimeRange; 4]>,
}

impl CoverageReport {
    /// Report for a target with no usable tiles: zero coverage, one gap
    /// spanning the whole interval (none when the interval is degenerate).
    #[must_use]
    pub fn uncovered(target: TimeRange) -> Self {
        let mut gaps = SmallVec::new();
        if !target.is_degenerate() {
            gaps.push(Gap::new(target.from_ms, target.to_ms));
        }
        Self {
            coverage_pct: 0.0,
            gaps,
            covered: SmallVec::new(),
        }
    }
}

/// Aggregate tile counts for one (field, bucket width) tile list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileStats {
    pub total_tiles: usize,
    pub ready_tiles: usize,
    pub loading_tiles: usize,
    pub error_tiles: usize,
    pub total_bins: usize,
}

/// How closely returned data matches the requested resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Data at the requested bucket width.
    Exact,
    /// Finer data assembled into a coarser view.
    Upsampled,
    /// Coarser data standing in for a finer view.
    Downsampled,
    /// No resolution reached acceptable coverage.
    None,
}

/// The sole contract the rendering layer consumes. Renderers never inspect
/// tiles directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub data: Vec<Bin>,
    pub quality: Quality,
    pub coverage_pct: f64,
    pub source_bucket_ms: Option<i64>,
    /// True when the result substitutes a neighboring bucket width while
    /// the requested one is still incomplete.
    pub is_stale: bool,
    pub gaps: SmallVec<[Gap; 4]>,
}

impl ResolutionResult {
    /// The explicit "no data" outcome.
    #[must_use]
    pub fn none(target: TimeRange) -> Self {
        Self {
            data: Vec::new(),
            quality: Quality::None,
            coverage_pct: 0.0,
            source_bucket_ms: None,
            is_stale: false,
            gaps: CoverageReport::uncovered(target).gaps,
        }
    }
}
