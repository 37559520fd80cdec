//! Spherical helpers used when synthesizing virtual fixes.

use crate::models::Coordinates;

const EARTH_RADIUS_M: f64 = 6_371_000.0;
pub const METERS_PER_NM: f64 = 1852.0;

/// Calculate distance between two points in meters using Haversine formula.
pub fn haversine_distance(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Point reached from `origin` after `distance_m` along the great circle
/// with initial true bearing `bearing_deg`.
pub fn offset_by_bearing(origin: Coordinates, distance_m: f64, bearing_deg: f64) -> Coordinates {
    if distance_m.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos())
        .clamp(-1.0, 1.0)
        .asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    Coordinates::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}

fn normalize_longitude(lon_deg: f64) -> f64 {
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Opposite direction of a course, normalized to [0, 360).
pub fn reciprocal(course_deg: f64) -> f64 {
    (course_deg + 180.0).rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_round_trips_distance() {
        let origin = Coordinates::new(37.6, -122.4);
        let moved = offset_by_bearing(origin, 5.0 * METERS_PER_NM, 100.0);
        let dist = haversine_distance(origin, moved);
        assert!((dist - 5.0 * METERS_PER_NM).abs() < 1.0);
    }

    #[test]
    fn test_offset_across_antimeridian() {
        let moved = offset_by_bearing(Coordinates::new(0.0, 179.9), 50_000.0, 90.0);
        assert!(moved.lon < -179.0);
    }

    #[test]
    fn test_reciprocal_wraps() {
        assert_eq!(reciprocal(280.0), 100.0);
        assert_eq!(reciprocal(90.0), 270.0);
        assert_eq!(reciprocal(180.0), 0.0);
    }
}
