//! Great-circle math over radian coordinates
//!
//! All functions are pure. Distances are in meters on a sphere of radius
//! [`EARTH_RADIUS_M`]; angles are radians measured clockwise from true north.

use crate::core::{Coordinate, EARTH_RADIUS_M};
use nalgebra::Vector2;
use std::f64::consts::{PI, TAU};

/// Great-circle distance between two points (haversine formula)
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = b.lat - a.lat;
    let d_lon = b.lon - a.lon;

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.cos() * b.lat.cos() * (d_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial bearing from `origin` towards `other`, in `[0, 2π)`
pub fn bearing(origin: &Coordinate, other: &Coordinate) -> f64 {
    let d_lon = other.lon - origin.lon;

    let y = d_lon.sin() * other.lat.cos();
    let x = origin.lat.cos() * other.lat.sin() - origin.lat.sin() * other.lat.cos() * d_lon.cos();

    normalize_angle(y.atan2(x))
}

/// Fold an angle into `[0, 2π)`
pub fn normalize_angle(angle: f64) -> f64 {
    let folded = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if folded >= TAU {
        0.0
    } else {
        folded
    }
}

/// Log-compressed display radius for a distance on a radar of edge `size`.
///
/// Half the Earth's circumference maps onto the outer ring.
pub fn radius(distance: f64, size: f64) -> f64 {
    let scale = 1.0 / (PI * EARTH_RADIUS_M + 1.0).ln();
    (distance + 1.0).ln() * scale * size / 2.0
}

/// Screen offset of `target` from the radar centre.
///
/// `heading` rotates the view so that the device's facing direction points
/// up. x grows to the right and y grows downwards.
pub fn project(origin: &Coordinate, heading: f64, target: &Coordinate, size: f64) -> Vector2<f64> {
    let r = radius(distance(origin, target), size);
    let angle = bearing(origin, target) - heading;

    Vector2::new(r * angle.sin(), -r * angle.cos())
}
