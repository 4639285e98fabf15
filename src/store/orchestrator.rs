//! Contract surface for the external request orchestrator.
//!
//! The orchestrator owns transport, retries, and fetch scheduling. This core
//! only plans which intervals are worth fetching and supplies a cooperative
//! cancellation token for the fetch boundary. The hard rule at that
//! boundary: a fetch either completes and writes fully-formed tiles through
//! [`crate::store::TileStore::write_tiles`], or it is abandoned via
//! [`crate::store::TileStore::abandon_fetch`] and the field view is left
//! untouched. There is no partial-write path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::{CoverageReport, TimeRange, snap_range};

use super::{FieldKey, FieldView};

/// One fetch the orchestrator should issue against the aggregation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub key: FieldKey,
    pub bucket_ms: i64,
    pub range: TimeRange,
}

/// Turns a coverage report into concrete fetch requests.
///
/// The core never performs I/O; planners only translate gaps into intervals.
/// In-flight de-duplication stays with the orchestrator, which checks the
/// field's [`super::LoadPhase`] before issuing a request.
pub trait FetchPlanner {
    fn plan(
        &self,
        key: &FieldKey,
        view: &FieldView,
        target_bucket_ms: i64,
        report: &CoverageReport,
    ) -> Vec<FetchRequest>;
}

/// Default planner: one request per gap, snapped outward to bucket
/// boundaries so fetched tiles can claim bucket-aligned coverage.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapFetchPlanner;

impl FetchPlanner for GapFetchPlanner {
    fn plan(
        &self,
        key: &FieldKey,
        _view: &FieldView,
        target_bucket_ms: i64,
        report: &CoverageReport,
    ) -> Vec<FetchRequest> {
        report
            .gaps
            .iter()
            .map(|gap| FetchRequest {
                key: key.clone(),
                bucket_ms: target_bucket_ms,
                range: snap_range(TimeRange::new(gap.from_ms, gap.to_ms), target_bucket_ms),
            })
            .collect()
    }
}

/// Cooperative cancellation token handed to the fetch boundary.
///
/// Cancellation is cooperative and not an error: the transport layer polls
/// `is_cancelled` at its suspension points and, when set, abandons the fetch
/// without writing tiles.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
