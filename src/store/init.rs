use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{Bin, NICE_BUCKET_WIDTHS_MS, Tile, TimeRange, build_bucket_levels, snap_range};
use crate::error::TileResult;

use super::{FieldKey, FieldView, TileStore};

/// Per-field payload from the aggregation service, the inbound transport
/// shape. `bucket_ms` is the server-chosen top (coarsest) bucket width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesResponse {
    pub field: String,
    pub bucket_ms: i64,
    pub from_ms: i64,
    pub to_ms: i64,
    pub bins: Vec<Bin>,
}

/// Bootstrap options for first-load initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitOptions {
    pub context: String,
    /// Pixel width hint for the rendering surface.
    pub px_hint: u32,
    /// Explicit time window pinned by the caller. When absent, the working
    /// range is derived from the observed bin timestamps.
    pub pinned_range: Option<TimeRange>,
    /// Ascending "nice" bucket widths the ladder may use.
    pub available_widths: Vec<i64>,
}

impl InitOptions {
    #[must_use]
    pub fn new(context: impl Into<String>, px_hint: u32) -> Self {
        Self {
            context: context.into(),
            px_hint,
            pinned_range: None,
            available_widths: NICE_BUCKET_WIDTHS_MS.to_vec(),
        }
    }

    #[must_use]
    pub fn with_pinned_range(mut self, range: TimeRange) -> Self {
        self.pinned_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_available_widths(mut self, widths: Vec<i64>) -> Self {
        self.available_widths = widths;
        self
    }
}

/// Derives the initial working range: the caller's pinned window when set,
/// otherwise the min/max timestamp observed across all bins of all
/// responses. With no data at all, falls back to a now/now degenerate range.
#[must_use]
pub fn determine_current_range(
    responses: &[SeriesResponse],
    pinned_range: Option<TimeRange>,
) -> TimeRange {
    if let Some(pinned) = pinned_range {
        return pinned;
    }

    let mut min_ms = i64::MAX;
    let mut max_ms = i64::MIN;
    for response in responses {
        for bin in &response.bins {
            min_ms = min_ms.min(bin.t_ms);
            max_ms = max_ms.max(bin.t_ms);
        }
    }

    if min_ms > max_ms {
        let now_ms = Utc::now().timestamp_millis();
        return TimeRange::new(now_ms, now_ms);
    }
    TimeRange::new(min_ms, max_ms)
}

/// Bootstraps the cache for each field in an initial server response.
///
/// Per field: builds the bucket ladder descending from the server-chosen top
/// width, snaps the working range to top-bucket boundaries, and materializes
/// the first tile. The `FieldView` and its first tile become visible
/// together in one atomic update, so no reader can observe the view without
/// the tile. The first tile claims the snapped interval, never the raw
/// request range.
pub fn initialize_fields(
    store: &mut TileStore,
    responses: &[SeriesResponse],
    options: &InitOptions,
) -> TileResult<Vec<FieldKey>> {
    let current_range = determine_current_range(responses, options.pinned_range);
    let mut keys = Vec::with_capacity(responses.len());

    for response in responses {
        let top_bucket_ms = response.bucket_ms.max(1);
        if response.bucket_ms <= 0 {
            warn!(
                field = %response.field,
                bucket_ms = response.bucket_ms,
                "non-positive top bucket width clamped to 1ms"
            );
        }

        let bucket_levels = build_bucket_levels(top_bucket_ms, &options.available_widths);
        let snapped = snap_range(current_range, top_bucket_ms);

        let first_tile = if response.bins.is_empty() {
            Tile::empty(snapped, top_bucket_ms)
        } else {
            Tile::ready(snapped, top_bucket_ms, response.bins.clone())
        };

        let mut view = FieldView::new(options.px_hint, snapped, top_bucket_ms, bucket_levels);
        view.append_tiles(top_bucket_ms, vec![first_tile]);

        let key = FieldKey::new(options.context.clone(), response.field.clone());
        debug!(
            context = %key.context,
            field = %key.field,
            top_bucket_ms,
            from_ms = snapped.from_ms,
            to_ms = snapped.to_ms,
            bins = response.bins.len(),
            "initialized field"
        );
        store.insert_field(key.clone(), view);
        keys.push(key);
    }

    Ok(keys)
}
