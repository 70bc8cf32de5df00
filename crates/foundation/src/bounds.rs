use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        LonLat { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// True when the position lies in `[-180, 180] x [-90, 90]`.
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

/// Axis-aligned geographic rectangle in degrees.
///
/// Convention:
/// - `west <= east` and `south <= north`.
/// - `east` may exceed 180 (or `west` fall below -180) when the rectangle
///   crosses the antimeridian; see [`GeoBounds::lon_ranges`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        GeoBounds {
            west,
            south,
            east,
            north,
        }
    }

    pub fn world() -> Self {
        GeoBounds::new(-180.0, -90.0, 180.0, 90.0)
    }

    pub fn is_finite(&self) -> bool {
        self.west.is_finite()
            && self.south.is_finite()
            && self.east.is_finite()
            && self.north.is_finite()
    }

    pub fn is_ordered(&self) -> bool {
        self.west <= self.east && self.south <= self.north
    }

    pub fn spans_world(&self) -> bool {
        self.east - self.west >= 360.0
    }

    /// Longitude intervals covered by this rectangle, each within `[-180, 180]`.
    ///
    /// A rectangle that crosses the antimeridian yields two intervals.
    pub fn lon_ranges(&self) -> Vec<(f64, f64)> {
        if self.spans_world() {
            return vec![(-180.0, 180.0)];
        }
        if self.east > 180.0 {
            return vec![(self.west, 180.0), (-180.0, self.east - 360.0)];
        }
        if self.west < -180.0 {
            return vec![(self.west + 360.0, 180.0), (-180.0, self.east)];
        }
        vec![(self.west, self.east)]
    }

    pub fn contains(&self, p: LonLat) -> bool {
        if p.lat < self.south || p.lat > self.north {
            return false;
        }
        self.lon_ranges()
            .iter()
            .any(|&(w, e)| p.lon >= w && p.lon <= e)
    }
}

/// Viewport rectangle as reported by the rendering side, or `Unavailable`
/// while no camera exists yet.
///
/// Consumers treat `Unavailable` as "no viewport constraint".
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewportBounds {
    Available(GeoBounds),
    #[default]
    Unavailable,
}

impl ViewportBounds {
    pub fn as_option(&self) -> Option<GeoBounds> {
        match self {
            ViewportBounds::Available(b) => Some(*b),
            ViewportBounds::Unavailable => None,
        }
    }

    /// The rectangle to constrain a query with; the whole world when unavailable.
    pub fn or_world(&self) -> GeoBounds {
        self.as_option().unwrap_or_else(GeoBounds::world)
    }
}
