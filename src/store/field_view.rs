use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Tile, TimeRange};

/// Identifies one cached field: a rendering context plus a field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    pub context: String,
    pub field: String,
}

impl FieldKey {
    #[must_use]
    pub fn new(context: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            field: field.into(),
        }
    }
}

/// Per-field fetch lifecycle.
///
/// Legal transitions: `Idle -> Loading -> (Success | Error) -> Idle`, plus
/// the `Idle -> Idle` no-op so resetting a field that never started a fetch
/// is harmless. Several fields may be `Loading` concurrently; in-flight
/// de-duplication for one field is the orchestrator's job, and this phase
/// is exposed so it can check before issuing a new fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl LoadPhase {
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Idle | Self::Loading)
                | (Self::Loading, Self::Success | Self::Error)
                | (Self::Success | Self::Error, Self::Idle)
        )
    }
}

/// Per-field cache root.
///
/// Created once by the initialization service when a chart first loads the
/// field, mutated only through [`crate::store::TileStore`]'s write
/// operations, and read-only everywhere else. Tiles inside `series_level`
/// are immutable; a bucket width's list is only appended to or wholesale
/// replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldView {
    px_hint: u32,
    original_range: TimeRange,
    current_range: TimeRange,
    top_bucket_ms: i64,
    current_bucket_ms: i64,
    bucket_levels: Vec<i64>,
    series_level: IndexMap<i64, Vec<Tile>>,
    loading: LoadPhase,
    error: Option<String>,
}

impl FieldView {
    pub(crate) fn new(
        px_hint: u32,
        original_range: TimeRange,
        top_bucket_ms: i64,
        bucket_levels: Vec<i64>,
    ) -> Self {
        Self {
            px_hint,
            original_range,
            current_range: original_range,
            top_bucket_ms,
            current_bucket_ms: top_bucket_ms,
            bucket_levels,
            series_level: IndexMap::new(),
            loading: LoadPhase::Idle,
            error: None,
        }
    }

    #[must_use]
    pub fn px_hint(&self) -> u32 {
        self.px_hint
    }

    #[must_use]
    pub fn original_range(&self) -> TimeRange {
        self.original_range
    }

    #[must_use]
    pub fn current_range(&self) -> TimeRange {
        self.current_range
    }

    #[must_use]
    pub fn top_bucket_ms(&self) -> i64 {
        self.top_bucket_ms
    }

    #[must_use]
    pub fn current_bucket_ms(&self) -> i64 {
        self.current_bucket_ms
    }

    /// The field's bucket ladder, coarsest to finest.
    #[must_use]
    pub fn bucket_levels(&self) -> &[i64] {
        &self.bucket_levels
    }

    #[must_use]
    pub fn series_level(&self) -> &IndexMap<i64, Vec<Tile>> {
        &self.series_level
    }

    #[must_use]
    pub fn tiles_at(&self, bucket_ms: i64) -> &[Tile] {
        self.series_level
            .get(&bucket_ms)
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn loading(&self) -> LoadPhase {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn set_current_range(&mut self, range: TimeRange) {
        self.current_range = range;
    }

    pub(crate) fn set_current_bucket(&mut self, bucket_ms: i64) {
        self.current_bucket_ms = bucket_ms;
    }

    pub(crate) fn set_loading(&mut self, phase: LoadPhase) {
        self.loading = phase;
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub(crate) fn append_tiles(&mut self, bucket_ms: i64, tiles: Vec<Tile>) {
        self.series_level.entry(bucket_ms).or_default().extend(tiles);
    }

    pub(crate) fn replace_tiles(&mut self, bucket_ms: i64, tiles: Vec<Tile>) {
        self.series_level.insert(bucket_ms, tiles);
    }
}
