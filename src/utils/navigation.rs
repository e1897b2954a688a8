//! Great-circle calculations on a spherical Earth (WGS-84 coordinates, no datum transforms)

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
pub const METERS_PER_NM: f64 = 1852.0;

/// Haversine distance in meters
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards asin against rounding just above 1.0 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine(lat1, lon1, lat2, lon2) / METERS_PER_NM
}

pub fn position_bearing_distance(
    lat: f64,
    lon: f64,
    bearing: f64,
    distance_nm: f64,
) -> (f64, f64) {
    let lat_rad = lat.to_radians();
    let lon_rad = lon.to_radians();
    let bearing_rad = bearing.to_radians();

    let angular_distance = distance_nm * METERS_PER_NM / EARTH_RADIUS_M;

    let dest_lat_rad = (lat_rad.sin() * angular_distance.cos()
        + lat_rad.cos() * angular_distance.sin() * bearing_rad.cos())
    .asin();

    let dest_lon_rad = lon_rad
        + (bearing_rad.sin() * angular_distance.sin() * lat_rad.cos())
            .atan2(angular_distance.cos() - lat_rad.sin() * dest_lat_rad.sin());

    (dest_lat_rad.to_degrees(), dest_lon_rad.to_degrees())
}

/// Turn direction coded on a procedure leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}
