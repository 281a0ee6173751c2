use geo::{point, HaversineDistance};

use crate::models::GeoPoint;

/// Great-circle distance between two coordinates in kilometers
#[inline]
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let p1 = point!(x: a.lon, y: a.lat);
    let p2 = point!(x: b.lon, y: b.lat);
    p1.haversine_distance(&p2) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero() {
        let p = GeoPoint {
            lat: 46.0207,
            lon: 7.7491,
        };
        assert!(haversine_km(&p, &p) < 0.001);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Zermatt to Zurich is roughly 160 km as the crow flies
        let zermatt = GeoPoint {
            lat: 46.0207,
            lon: 7.7491,
        };
        let zurich = GeoPoint {
            lat: 47.3769,
            lon: 8.5417,
        };
        let distance = haversine_km(&zermatt, &zurich);
        assert!(
            (distance - 160.0).abs() < 15.0,
            "expected ~160km, got {}",
            distance
        );
    }

    #[test]
    fn test_haversine_small_offset() {
        // ~100m apart, well under any dedup tolerance
        let a = GeoPoint {
            lat: 46.02,
            lon: 7.75,
        };
        let b = GeoPoint {
            lat: 46.0201,
            lon: 7.7501,
        };
        assert!(haversine_km(&a, &b) < 0.1);
    }
}
