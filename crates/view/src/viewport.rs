use foundation::math::wrap_lon_deg;
use foundation::{GeoBounds, ViewportBounds};

use crate::map_view::MapView;

/// Current viewport rectangle of `view`.
///
/// Returns `Unavailable` while the view has no camera, when the query fails,
/// or when the reported rectangle cannot be trusted (non-finite edges,
/// `south > north`). Nothing is cached; call again after every camera change.
pub fn derive_bounds(view: &impl MapView) -> ViewportBounds {
    if view.camera().is_none() {
        return ViewportBounds::Unavailable;
    }
    match view.viewport_bounds() {
        Ok(raw) => normalize_bounds(raw),
        Err(_) => ViewportBounds::Unavailable,
    }
}

/// Brings a renderer-reported rectangle into `GeoBounds` conventions.
///
/// - `west > east` means the view crosses the antimeridian; `east` is
///   unwrapped by +360 so `west <= east` holds.
/// - Spans of 360 degrees or more become the full longitude range.
/// - Otherwise the rectangle is shifted by whole turns so `west` lies in
///   `[-180, 180)`; a viewport inside a neighbouring world copy maps back
///   onto the primary one.
/// - Latitudes are clamped to `[-90, 90]`.
pub fn normalize_bounds(raw: GeoBounds) -> ViewportBounds {
    if !raw.is_finite() || raw.south > raw.north {
        return ViewportBounds::Unavailable;
    }

    let (mut west, mut east) = (raw.west, raw.east);
    if west > east {
        east += 360.0;
    }
    if east - west >= 360.0 {
        west = -180.0;
        east = 180.0;
    } else if !(-180.0..180.0).contains(&west) {
        let shift = wrap_lon_deg(west) - west;
        west += shift;
        east += shift;
    }

    ViewportBounds::Available(GeoBounds::new(
        west,
        raw.south.clamp(-90.0, 90.0),
        east,
        raw.north.clamp(-90.0, 90.0),
    ))
}
