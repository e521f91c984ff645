use crate::models::LatLng;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for near-antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Haversine distance between two coordinates in kilometers
#[inline]
pub fn distance_between(from: LatLng, to: LatLng) -> f64 {
    haversine_distance(from.lat, from.lng, to.lat, to.lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = haversine_distance(london_lat, london_lon, paris_lat, paris_lon);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let distance = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((distance - 111.19).abs() < 0.5, "got {}", distance);
    }

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_distance(-33.8688, 151.2093, -33.8688, 151.2093), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let sydney = LatLng::new(-33.8688, 151.2093);
        let parramatta = LatLng::new(-33.8150, 151.0011);

        let there = distance_between(sydney, parramatta);
        let back = distance_between(parramatta, sydney);
        assert!((there - back).abs() < 1e-9);
        assert!(there > 15.0 && there < 25.0);
    }

    #[test]
    fn test_antipodal_points_do_not_nan() {
        let distance = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!(distance.is_finite());
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);
    }
}
