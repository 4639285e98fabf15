use serde::{Deserialize, Serialize};

use crate::error::{TileError, TileResult};

/// Default acceptance threshold for exact-resolution tile sets, percent.
pub const DEFAULT_EXACT_ACCEPTANCE_PCT: f64 = 95.0;

/// Default acceptance threshold for neighboring-resolution fallback, percent.
pub const DEFAULT_FALLBACK_ACCEPTANCE_PCT: f64 = 80.0;

/// Default coverage below which the orchestrator should fetch, percent.
pub const DEFAULT_NEEDS_LOAD_THRESHOLD_PCT: f64 = 95.0;

/// Coverage thresholds driving resolution selection and fetch decisions.
///
/// These encode a product decision: a slightly incomplete exact-resolution
/// tile set is not shown, but a well-covered neighboring resolution is an
/// acceptable temporary substitute while the exact one finishes loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoveragePolicy {
    pub exact_acceptance_pct: f64,
    pub fallback_acceptance_pct: f64,
    pub needs_load_threshold_pct: f64,
}

impl Default for CoveragePolicy {
    fn default() -> Self {
        Self {
            exact_acceptance_pct: DEFAULT_EXACT_ACCEPTANCE_PCT,
            fallback_acceptance_pct: DEFAULT_FALLBACK_ACCEPTANCE_PCT,
            needs_load_threshold_pct: DEFAULT_NEEDS_LOAD_THRESHOLD_PCT,
        }
    }
}

impl CoveragePolicy {
    pub fn validate(self) -> TileResult<Self> {
        for (name, value) in [
            ("exact_acceptance_pct", self.exact_acceptance_pct),
            ("fallback_acceptance_pct", self.fallback_acceptance_pct),
            ("needs_load_threshold_pct", self.needs_load_threshold_pct),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(TileError::InvalidConfig(format!(
                    "{name} must be finite and within 0..=100"
                )));
            }
        }
        Ok(self)
    }
}
