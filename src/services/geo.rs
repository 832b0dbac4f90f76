//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

const KM_PER_MILE: f64 = 1.609_34;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Haversine distance in statute miles
pub fn haversine_miles(from: &Coordinates, to: &Coordinates) -> f64 {
    haversine_distance(from, to) / KM_PER_MILE
}

/// Straight-line length of a polyline in miles
pub fn path_miles(points: &[Coordinates]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_miles(&pair[0], &pair[1]))
        .sum()
}
