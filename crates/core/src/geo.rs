//! Spherical geometry used by radius search.
//!
//! Containment follows the "centre sphere" model: a point is inside the region
//! when the great-circle angle between it and the centre does not exceed the
//! radius, both expressed in radians.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Mean Earth radius in miles, used to turn a travel distance into radians.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// A WGS84 coordinate pair.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> DomainResult<Self> {
        if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::validation(format!(
                "coordinates out of range: [{longitude}, {latitude}]"
            )));
        }
        Ok(Self { longitude, latitude })
    }

    /// Great-circle angle to `other`, in radians (haversine form).
    pub fn angular_distance(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlng = (other.longitude - self.longitude).to_radians();

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * h.sqrt().min(1.0).asin()
    }
}

/// Convert a distance in miles into an angular radius in radians.
pub fn radius_from_miles(distance: f64) -> DomainResult<f64> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(DomainError::validation(
            "Distance must be a non-negative number of miles",
        ));
    }
    Ok(distance / EARTH_RADIUS_MILES)
}

/// Circular region on the sphere.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CenterSphere {
    pub center: GeoPoint,
    pub radius_radians: f64,
}

impl CenterSphere {
    pub fn new(center: GeoPoint, radius_radians: f64) -> Self {
        Self { center, radius_radians }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.angular_distance(point) <= self.radius_radians
    }
}
