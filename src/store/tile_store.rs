use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{
    CoveragePolicy, CoverageReport, ResolutionResult, SelectionRequest, Tile, TileStats, TimeRange,
    calculate_coverage, select_optimal_data, tile_stats,
};
use crate::error::{TileError, TileResult};

use super::{FieldKey, FieldView, LoadPhase};

/// How a fetch completion lands its tiles into a bucket width's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// New tiles join the existing list; superseded data stays and loses
    /// duplicate-timestamp merges to the newer tiles.
    Append,
    /// The bucket width's list is wholesale replaced, e.g. when the
    /// requested range changed materially.
    Replace,
}

/// One bucket width's contribution to an atomic multi-bucket write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileWrite {
    pub bucket_ms: i64,
    pub tiles: Vec<Tile>,
    pub mode: WriteMode,
}

/// Single-writer cache of [`FieldView`]s.
///
/// All mutation goes through `&mut self` write operations, so any snapshot a
/// reader takes between writes is internally consistent. Reads are pure and
/// never observe a half-applied write. If the store is shared across OS
/// threads, the host wraps it in a mutex (or an actor per field); the store
/// itself assumes serialized mutation.
///
/// The store itself is not serialized; persistence round-trips the
/// [`FieldView`] and [`Tile`] shapes instead.
#[derive(Debug, Clone, Default)]
pub struct TileStore {
    fields: IndexMap<FieldKey, FieldView>,
    policy: CoveragePolicy,
}

impl TileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CoveragePolicy) -> TileResult<Self> {
        Ok(Self {
            fields: IndexMap::new(),
            policy: policy.validate()?,
        })
    }

    #[must_use]
    pub fn policy(&self) -> CoveragePolicy {
        self.policy
    }

    #[must_use]
    pub fn field(&self, key: &FieldKey) -> Option<&FieldView> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn field_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    /// Registers a freshly initialized field, replacing any previous view
    /// under the same key. The view arrives fully formed (first tile
    /// included), so both become visible in one update.
    pub(crate) fn insert_field(&mut self, key: FieldKey, view: FieldView) {
        if self.fields.insert(key.clone(), view).is_some() {
            debug!(context = %key.context, field = %key.field, "reinitialized field view");
        } else {
            debug!(context = %key.context, field = %key.field, "created field view");
        }
    }

    /// Removes a field when its owning chart/context is torn down.
    pub fn remove_field(&mut self, key: &FieldKey) -> bool {
        let removed = self.fields.shift_remove(key).is_some();
        if removed {
            debug!(context = %key.context, field = %key.field, "removed field view");
        }
        removed
    }

    fn view_mut(&mut self, key: &FieldKey) -> TileResult<&mut FieldView> {
        self.fields.get_mut(key).ok_or_else(|| TileError::UnknownField {
            context: key.context.clone(),
            field: key.field.clone(),
        })
    }

    fn view(&self, key: &FieldKey) -> TileResult<&FieldView> {
        self.fields.get(key).ok_or_else(|| TileError::UnknownField {
            context: key.context.clone(),
            field: key.field.clone(),
        })
    }

    /// Writes tiles for one bucket width as a single atomic update.
    pub fn write_tiles(
        &mut self,
        key: &FieldKey,
        bucket_ms: i64,
        tiles: Vec<Tile>,
        mode: WriteMode,
    ) -> TileResult<()> {
        self.write_tiles_batch(key, vec![TileWrite {
            bucket_ms,
            tiles,
            mode,
        }])
    }

    /// Writes tiles for several bucket widths as one atomic update.
    ///
    /// All tiles produced by one fetch completion must land through a single
    /// call so a reader never observes one bucket width updated ahead of
    /// another from the same fetch.
    pub fn write_tiles_batch(&mut self, key: &FieldKey, writes: Vec<TileWrite>) -> TileResult<()> {
        let view = self.view_mut(key)?;
        for write in writes {
            trace!(
                context = %key.context,
                field = %key.field,
                bucket_ms = write.bucket_ms,
                tiles = write.tiles.len(),
                mode = ?write.mode,
                "write tiles"
            );
            match write.mode {
                WriteMode::Append => view.append_tiles(write.bucket_ms, write.tiles),
                WriteMode::Replace => view.replace_tiles(write.bucket_ms, write.tiles),
            }
        }
        Ok(())
    }

    /// Advances the field's loading-state machine.
    pub fn set_loading_state(&mut self, key: &FieldKey, phase: LoadPhase) -> TileResult<()> {
        let view = self.view_mut(key)?;
        let current = view.loading();
        if !current.can_transition_to(phase) {
            warn!(
                context = %key.context,
                field = %key.field,
                from = ?current,
                to = ?phase,
                "rejected loading-state transition"
            );
            return Err(TileError::InvalidLoadTransition {
                from: current,
                to: phase,
            });
        }
        view.set_loading(phase);
        if phase == LoadPhase::Loading {
            view.set_error(None);
        }
        trace!(context = %key.context, field = %key.field, phase = ?phase, "loading state");
        Ok(())
    }

    /// Records a field-level error message, for failures scoped to the whole
    /// field rather than one interval. Interval-scoped failures are error
    /// tiles instead.
    pub fn set_field_error(&mut self, key: &FieldKey, message: impl Into<String>) -> TileResult<()> {
        let message = message.into();
        let view = self.view_mut(key)?;
        warn!(context = %key.context, field = %key.field, error = %message, "field error");
        view.set_error(Some(message));
        Ok(())
    }

    /// Abandons an in-flight fetch after cancellation: no tiles are written
    /// and the loading state returns to `Idle`, leaving the view exactly as
    /// it was before the fetch started. Cancellation is not an error, so
    /// this bypasses transition validation.
    pub fn abandon_fetch(&mut self, key: &FieldKey) -> TileResult<()> {
        let view = self.view_mut(key)?;
        debug!(context = %key.context, field = %key.field, "abandoned fetch");
        view.set_loading(LoadPhase::Idle);
        Ok(())
    }

    /// Applies a successful fetch in one call: tiles land atomically and the
    /// loading state runs `Loading -> Success -> Idle`.
    ///
    /// The phase is validated before anything is written, so calling this
    /// without a fetch in flight errors with the view untouched.
    pub fn complete_fetch(
        &mut self,
        key: &FieldKey,
        bucket_ms: i64,
        tiles: Vec<Tile>,
        mode: WriteMode,
    ) -> TileResult<()> {
        let current = self.view(key)?.loading();
        if !current.can_transition_to(LoadPhase::Success) {
            warn!(
                context = %key.context,
                field = %key.field,
                from = ?current,
                "rejected fetch completion without a fetch in flight"
            );
            return Err(TileError::InvalidLoadTransition {
                from: current,
                to: LoadPhase::Success,
            });
        }
        self.write_tiles(key, bucket_ms, tiles, mode)?;
        self.set_loading_state(key, LoadPhase::Success)?;
        self.set_loading_state(key, LoadPhase::Idle)
    }

    /// Updates the field's working viewport range.
    pub fn set_current_range(&mut self, key: &FieldKey, range: TimeRange) -> TileResult<()> {
        self.view_mut(key)?.set_current_range(range);
        Ok(())
    }

    /// Updates the field's active bucket width.
    pub fn set_current_bucket(&mut self, key: &FieldKey, bucket_ms: i64) -> TileResult<()> {
        self.view_mut(key)?.set_current_bucket(bucket_ms);
        Ok(())
    }

    /// Coverage of `target` by one bucket width's ready tiles.
    pub fn coverage(
        &self,
        key: &FieldKey,
        bucket_ms: i64,
        target: TimeRange,
    ) -> TileResult<CoverageReport> {
        let view = self.view(key)?;
        Ok(calculate_coverage(view.tiles_at(bucket_ms), target))
    }

    /// Whether coverage at `bucket_ms` is below the needs-load threshold.
    pub fn needs_load(
        &self,
        key: &FieldKey,
        bucket_ms: i64,
        target: TimeRange,
    ) -> TileResult<bool> {
        Ok(self.coverage(key, bucket_ms, target)?.coverage_pct
            < self.policy.needs_load_threshold_pct)
    }

    /// Aggregate tile counts at one bucket width.
    pub fn stats(&self, key: &FieldKey, bucket_ms: i64) -> TileResult<TileStats> {
        let view = self.view(key)?;
        Ok(tile_stats(view.tiles_at(bucket_ms)))
    }

    /// Re-derives the renderable series for the chart surface from the
    /// field's current tile-ladder snapshot.
    pub fn select(
        &self,
        key: &FieldKey,
        target_bucket_ms: i64,
        target: TimeRange,
    ) -> TileResult<ResolutionResult> {
        let view = self.view(key)?;
        Ok(select_optimal_data(
            SelectionRequest {
                target_bucket_ms,
                target,
                series_level: view.series_level(),
                ladder: view.bucket_levels(),
            },
            self.policy,
        ))
    }
}
