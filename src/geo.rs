//! Geographic coordinates and great-circle distance.

use std::fmt;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 coordinate in degrees, ordered `(longitude, latitude)` as the directions service
/// and GeoJSON geometries deliver it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Haversine great-circle distance to `other` in metres.
    pub fn distance_m(self, other: Coordinate) -> f64 {
        haversine_m(self, other)
    }

    /// `true` when both components are finite and inside the valid degree ranges.
    pub fn is_valid(self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self::new(longitude, latitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.longitude, self.latitude)
    }
}

/// Haversine great-circle distance between `a` and `b` in metres.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}
