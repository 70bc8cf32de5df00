//! Unit Web-Mercator projection.
//!
//! Coordinates are normalized to `[0, 1]` on both axes: `x` grows eastward
//! from the antimeridian, `y` grows southward from the northern clamp
//! latitude. Tile-pixel math at zoom `z` is then `unit * extent * 2^z`.

pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_78;

pub fn wrap_lon_deg(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

pub fn lon_to_unit_x(lon_deg: f64) -> f64 {
    lon_deg / 360.0 + 0.5
}

pub fn lat_to_unit_y(lat_deg: f64) -> f64 {
    let lat = lat_deg
        .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
        .to_radians();
    let sin = lat.sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / std::f64::consts::PI;
    y.clamp(0.0, 1.0)
}

pub fn unit_x_to_lon(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

pub fn unit_y_to_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0).to_radians();
    (y2.exp().atan() * 2.0).to_degrees() - 90.0
}

#[cfg(test)]
mod tests {
    use super::{
        MERCATOR_MAX_LAT_DEG, lat_to_unit_y, lon_to_unit_x, unit_x_to_lon, unit_y_to_lat,
        wrap_lon_deg,
    };

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn origin_maps_to_center() {
        assert_close(lon_to_unit_x(0.0), 0.5, 1e-12);
        assert_close(lat_to_unit_y(0.0), 0.5, 1e-12);
        assert_close(lon_to_unit_x(-180.0), 0.0, 1e-12);
        assert_close(lon_to_unit_x(180.0), 1.0, 1e-12);
    }

    #[test]
    fn latitude_is_clamped_at_the_poles() {
        assert_close(lat_to_unit_y(90.0), 0.0, 1e-9);
        assert_close(lat_to_unit_y(-90.0), 1.0, 1e-9);
        assert_close(unit_y_to_lat(0.0), MERCATOR_MAX_LAT_DEG, 1e-6);
    }

    #[test]
    fn inverse_recovers_degrees() {
        for (lon, lat) in [(-73.98, 40.75), (2.35, 48.85), (151.2, -33.87)] {
            assert_close(unit_x_to_lon(lon_to_unit_x(lon)), lon, 1e-9);
            assert_close(unit_y_to_lat(lat_to_unit_y(lat)), lat, 1e-9);
        }
    }

    #[test]
    fn wrap_lon_keeps_range() {
        assert_close(wrap_lon_deg(190.0), -170.0, 1e-12);
        assert_close(wrap_lon_deg(-190.0), 170.0, 1e-12);
        assert_close(wrap_lon_deg(45.0), 45.0, 1e-12);
    }
}
