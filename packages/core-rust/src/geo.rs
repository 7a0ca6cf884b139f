//! Coordinates and the rough bounding-box lookup used by map views.

use serde::{Deserialize, Serialize};

use crate::filter::sort_by_name;
use crate::school::School;

/// Approximate kilometres per degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Axis-aligned latitude/longitude box (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Box of roughly `radius_km` around `center`.
    ///
    /// Longitude span widens with latitude by `1 / cos(latitude)`. At the poles
    /// the box covers every longitude.
    #[must_use]
    pub fn around(center: Coordinates, radius_km: f64) -> Self {
        let radius_km = radius_km.max(0.0);
        let lat_delta = radius_km / KM_PER_DEGREE;
        let cos_lat = center.latitude.to_radians().cos();
        let (min_longitude, max_longitude) = if cos_lat <= f64::EPSILON {
            (-180.0, 180.0)
        } else {
            let lng_delta = radius_km / (KM_PER_DEGREE * cos_lat);
            (center.longitude - lng_delta, center.longitude + lng_delta)
        };

        Self {
            min_latitude: center.latitude - lat_delta,
            max_latitude: center.latitude + lat_delta,
            min_longitude,
            max_longitude,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

/// Schools with coordinates inside `bbox`, sorted by name.
#[must_use]
pub fn schools_within<'a>(schools: &'a [School], bbox: &BoundingBox) -> Vec<&'a School> {
    let mut result: Vec<&School> = schools
        .iter()
        .filter(|s| s.coordinates().is_some_and(|c| bbox.contains(c)))
        .collect();
    sort_by_name(&mut result);
    result
}
