//! Floats as memo keys.
//!
//! Viewport edges and zoom levels key memoized results, so they need `Eq`,
//! `Ord` and `Hash` that ignore the sign of zero and NaN payloads.

use core::cmp::Ordering;

use crate::bounds::GeoBounds;

/// `-0.0` folds into `0.0`, every NaN into one NaN.
pub fn canonical_f64(v: f64) -> f64 {
    match v {
        z if z == 0.0 => 0.0,
        n if n.is_nan() => f64::NAN,
        other => other,
    }
}

/// Float with a total order (`f64::total_cmp` after canonicalization).
#[derive(Debug, Copy, Clone, Default)]
pub struct StableF64(pub f64);

impl StableF64 {
    /// Key for a viewport rectangle, edges in W, S, E, N order.
    pub fn bounds_key(bounds: &GeoBounds) -> [StableF64; 4] {
        [bounds.west, bounds.south, bounds.east, bounds.north].map(StableF64)
    }
}

impl From<f64> for StableF64 {
    fn from(v: f64) -> Self {
        StableF64(v)
    }
}

impl Ord for StableF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_f64(self.0).total_cmp(&canonical_f64(other.0))
    }
}

impl PartialOrd for StableF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for StableF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StableF64 {}

impl std::hash::Hash for StableF64 {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        canonical_f64(self.0).to_bits().hash(state);
    }
}
