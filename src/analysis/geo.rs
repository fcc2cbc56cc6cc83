//! Great-circle distance between coordinates.

use crate::Coordinate;

/// Mean Earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between `a` and `b` in km.
///
/// Out-of-range latitudes or longitudes are not validated; they simply
/// propagate through the trigonometry.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    // ---
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
