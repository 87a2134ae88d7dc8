//! Geodesy helpers for geofence checks.
//!
//! Distances use the haversine great-circle formula on a spherical
//! Earth. At the few-hundred-metre scale geofencing cares about the
//! spherical approximation is accurate to well under a metre.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateError::LatitudeOutOfRange(lat) => {
                write!(f, "Latitude {lat} is out of range (-90 to 90)")
            }
            CoordinateError::LongitudeOutOfRange(lon) => {
                write!(f, "Longitude {lon} is out of range (-180 to 180)")
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Range-checked constructor. NaN never satisfies a range check,
    /// so it is rejected along with out-of-range values.
    pub fn validated(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }
}

/// Great-circle distance between two points, in meters.
pub fn distance_meters(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_between_identical_points_is_zero() {
        let point = Coordinates::new(15.4989, 73.8278);
        assert_eq!(distance_meters(point, point), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinates::new(15.4989, 73.8278);
        let b = Coordinates::new(15.5020, 73.8300);
        let forward = distance_meters(a, b);
        let backward = distance_meters(b, a);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude_at_the_equator() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(1.0, 0.0);
        let distance = distance_meters(a, b);
        // 1 degree of arc on a 6,371 km sphere is ~111.19 km.
        assert!(distance > 111_000.0 && distance < 111_400.0, "got {distance}");
    }

    #[test]
    fn test_small_latitude_offset_matches_expected_meters() {
        // 0.0018 degrees of latitude is ~200 m, right at the default
        // geofence radius.
        let post = Coordinates::new(15.4989, 73.8278);
        let nearby = Coordinates::new(15.4989 + 0.0018, 73.8278);
        let distance = distance_meters(post, nearby);
        assert!((distance - 200.0).abs() < 1.0, "got {distance}");
    }

    #[test]
    fn test_validated_accepts_boundary_values() {
        assert!(Coordinates::validated(90.0, 180.0).is_ok());
        assert!(Coordinates::validated(-90.0, -180.0).is_ok());
        assert!(Coordinates::validated(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_validated_rejects_out_of_range_values() {
        assert_eq!(
            Coordinates::validated(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Coordinates::validated(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(-180.5))
        );
        assert!(Coordinates::validated(f64::NAN, 0.0).is_err());
        assert!(Coordinates::validated(0.0, f64::NAN).is_err());
    }
}
