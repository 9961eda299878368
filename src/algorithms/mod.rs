//! Geodesic algorithms for the radar view

pub mod geodesic;

pub use geodesic::{bearing, distance, normalize_angle, project, radius};
