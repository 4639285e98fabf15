use crate::core::types::TimeRange;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
pub const WEEK_MS: i64 = 7 * DAY_MS;
const YEAR_MS: i64 = 365 * DAY_MS;

/// The "nice" bucket widths the application is willing to render, ascending.
///
/// Process-wide policy, not per-field state. Hosts may pass their own list
/// to [`crate::store::InitOptions`]; this is the default ladder source.
pub const NICE_BUCKET_WIDTHS_MS: &[i64] = &[
    SECOND_MS,
    2 * SECOND_MS,
    5 * SECOND_MS,
    10 * SECOND_MS,
    15 * SECOND_MS,
    20 * SECOND_MS,
    30 * SECOND_MS,
    MINUTE_MS,
    2 * MINUTE_MS,
    5 * MINUTE_MS,
    10 * MINUTE_MS,
    15 * MINUTE_MS,
    30 * MINUTE_MS,
    HOUR_MS,
    2 * HOUR_MS,
    3 * HOUR_MS,
    6 * HOUR_MS,
    12 * HOUR_MS,
    DAY_MS,
    2 * DAY_MS,
    WEEK_MS,
    30 * DAY_MS,
    90 * DAY_MS,
    180 * DAY_MS,
    YEAR_MS,
];

/// Extends an ascending width list with weekly multiples up to `cap_ms`.
///
/// Multiples already present are not duplicated; the result stays ascending.
#[must_use]
pub fn extend_with_weekly_multiples(widths: &[i64], cap_ms: i64) -> Vec<i64> {
    let mut extended: Vec<i64> = widths.to_vec();
    let mut week = WEEK_MS;
    while week <= cap_ms {
        if !extended.contains(&week) {
            extended.push(week);
        }
        let Some(next) = week.checked_add(WEEK_MS) else {
            break;
        };
        week = next;
    }
    extended.sort_unstable();
    extended.dedup();
    extended
}

/// Builds a field's bucket ladder from the server-chosen top width.
///
/// Keeps the available widths no coarser than `top_bucket_ms`, deduplicates,
/// appends the top itself when the list lacks it, and reverses so the ladder
/// runs coarsest to finest. Built once per field at initialization.
#[must_use]
pub fn build_bucket_levels(top_bucket_ms: i64, available_widths: &[i64]) -> Vec<i64> {
    let mut levels: Vec<i64> = available_widths
        .iter()
        .copied()
        .filter(|&width| width > 0 && width <= top_bucket_ms)
        .collect();
    levels.sort_unstable();
    levels.dedup();
    if !levels.contains(&top_bucket_ms) {
        levels.push(top_bucket_ms);
    }
    levels.reverse();
    levels
}

/// Aligns a range to bucket boundaries: start floored, end ceiled to
/// multiples of `bucket_ms`.
///
/// The bucket width is clamped to at least 1ms. Euclidean division keeps
/// the alignment correct for negative timestamps. The snapped interval is
/// what a tile may claim as `coverage`; the raw request range is not
/// bucket-aligned truth.
#[must_use]
pub fn snap_range(range: TimeRange, bucket_ms: i64) -> TimeRange {
    let bucket_ms = bucket_ms.max(1);
    let from_ms = range.from_ms.div_euclid(bucket_ms) * bucket_ms;
    let mut to_ms = range.to_ms.div_euclid(bucket_ms) * bucket_ms;
    if range.to_ms.rem_euclid(bucket_ms) != 0 {
        to_ms += bucket_ms;
    }
    TimeRange { from_ms, to_ms }
}
