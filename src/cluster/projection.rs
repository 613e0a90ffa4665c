//! Web Mercator projection into the unit square and pixel scale helpers

use std::f64::consts::PI;

use super::point::{LngLat, Point};

/// Coefficient to translate from degrees to radians
pub const DEGREE_RAD: f64 = PI / 180.0;

/// Size of a map tile in pixels; the world is `TILE_SIZE * 2^zoom` pixels wide
pub const TILE_SIZE: f64 = 512.0;

/// Northern (and, negated, southern) limit of the Web Mercator projection
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Converts longitude to spherical mercator in the [0..1] range
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Converts latitude to spherical mercator in the [0..1] range
///
/// Latitudes beyond the Mercator limit are pinned to the square's edges.
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat * DEGREE_RAD).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

/// Converts spherical mercator x back to longitude
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Converts spherical mercator y back to latitude
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * DEGREE_RAD;
    360.0 * y2.exp().atan() / PI - 90.0
}

/// Projects a coordinate into the unit mercator square
pub fn project(p: LngLat) -> Point {
    Point([lng_x(p.lon), lat_y(p.lat)])
}

/// Inverse of [`project`]
pub fn unproject(p: &Point) -> LngLat {
    LngLat::new(x_lng(p.0[0]), y_lat(p.0[1]))
}

/// Width of the whole world in pixels at the given (possibly fractional) zoom
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Converts a pixel distance at the given zoom into unit mercator distance
pub fn pixels_to_world(pixels: f64, zoom: f64) -> f64 {
    pixels / world_size(zoom)
}
