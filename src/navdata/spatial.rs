//! Radius queries over flat record collections.
//!
//! Two stages: a bounding box (`R/60` degrees of latitude, `R/60/cos(lat)` of
//! longitude) rejects most candidates cheaply, then the haversine distance
//! decides. Longitude is not wrapped at ±180° and the box degenerates near the
//! poles; both are known limitations.

use serde::Serialize;

use super::types::{Airspace, Coordinates, GeoPoint};
use crate::error::QueryError;
use crate::utils::navigation::haversine_nm;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn around(lat: f64, lon: f64, radius_nm: f64) -> Self {
        let lat_delta = radius_nm / 60.0;
        let lon_delta = lat_delta / lat.to_radians().cos();
        Self {
            min_lat: lat - lat_delta,
            max_lat: lat + lat_delta,
            min_lon: lon - lon_delta,
            max_lon: lon + lon_delta,
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// A validated "within R nm of (lat, lon)" query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    center: Coordinates,
    radius_nm: f64,
    bbox: BoundingBox,
}

impl RadiusQuery {
    pub fn new(lat: f64, lon: f64, radius_nm: f64) -> Result<Self, QueryError> {
        if !lat.is_finite() {
            return Err(QueryError::NonFiniteInput("latitude"));
        }
        if !lon.is_finite() {
            return Err(QueryError::NonFiniteInput("longitude"));
        }
        if !radius_nm.is_finite() {
            return Err(QueryError::NonFiniteInput("radius"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(QueryError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(QueryError::LongitudeOutOfRange(lon));
        }
        if radius_nm < 0.0 {
            return Err(QueryError::NegativeRadius(radius_nm));
        }

        Ok(Self {
            center: Coordinates::new(lat, lon),
            radius_nm,
            bbox: BoundingBox::around(lat, lon, radius_nm),
        })
    }

    pub fn center(&self) -> Coordinates {
        self.center
    }

    pub fn radius_nm(&self) -> f64 {
        self.radius_nm
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Cheap pre-filter only
    pub fn in_box(&self, lat: f64, lon: f64) -> bool {
        self.bbox.contains(lat, lon)
    }

    pub fn distance_nm(&self, lat: f64, lon: f64) -> f64 {
        haversine_nm(self.center.lat, self.center.lon, lat, lon)
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.in_box(lat, lon) && self.distance_nm(lat, lon) <= self.radius_nm
    }

    pub fn contains_point<P: GeoPoint + ?Sized>(&self, point: &P) -> bool {
        self.contains(point.latitude(), point.longitude())
    }

    /// All records within the radius, unordered
    pub fn filter<T: GeoPoint + Clone>(&self, records: &[T]) -> Vec<T> {
        self.filter_by(records, |_| true)
    }

    /// Like [`RadiusQuery::filter`] with an extra attribute predicate checked
    /// before any geometry
    pub fn filter_by<T, F>(&self, records: &[T], mut keep: F) -> Vec<T>
    where
        T: GeoPoint + Clone,
        F: FnMut(&T) -> bool,
    {
        records
            .iter()
            .filter(|r| keep(r) && self.contains_point(*r))
            .cloned()
            .collect()
    }

    /// Airspaces are matched by their vertices, or by enclosing the center
    pub fn touches_airspace(&self, airspace: &Airspace) -> bool {
        airspace
            .coordinates
            .iter()
            .any(|c| self.contains(c.lat, c.lon))
            || airspace.contains(self.center.lat, self.center.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::navigation::position_bearing_distance;

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(RadiusQuery::new(0.0, 0.0, -1.0), Err(QueryError::NegativeRadius(-1.0)));
        assert_eq!(
            RadiusQuery::new(f64::NAN, 0.0, 1.0),
            Err(QueryError::NonFiniteInput("latitude"))
        );
        assert_eq!(RadiusQuery::new(91.0, 0.0, 1.0), Err(QueryError::LatitudeOutOfRange(91.0)));
        assert_eq!(
            RadiusQuery::new(0.0, 181.0, 1.0),
            Err(QueryError::LongitudeOutOfRange(181.0))
        );
    }

    #[test]
    fn test_zero_radius_is_valid() {
        let query = RadiusQuery::new(45.0, 7.0, 0.0).unwrap();
        assert!(query.contains(45.0, 7.0));
        assert!(!query.contains(45.001, 7.0));
    }

    #[test]
    fn test_box_widens_with_latitude() {
        let equator = BoundingBox::around(0.0, 0.0, 60.0);
        let north = BoundingBox::around(60.0, 0.0, 60.0);
        assert!((equator.max_lon - 1.0).abs() < 1e-9);
        assert!((north.max_lon - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_just_inside_and_outside() {
        let query = RadiusQuery::new(40.0, -75.0, 25.0).unwrap();
        let (lat, lon) = position_bearing_distance(40.0, -75.0, 45.0, 24.9);
        assert!(query.contains(lat, lon));
        let (lat, lon) = position_bearing_distance(40.0, -75.0, 45.0, 25.1);
        assert!(!query.contains(lat, lon));
    }
}
