//! Validation of position samples before they enter the history

use crate::core::{Coordinate, PositionSample};
use crate::validation::error::{RadarError, RadarResult};
use std::f64::consts::{FRAC_PI_2, PI};

/// Check that a coordinate is finite and inside the radian ranges
pub fn validate_coordinate(coord: &Coordinate) -> RadarResult<()> {
    if !coord.lat.is_finite() || !coord.lon.is_finite() {
        return Err(RadarError::invalid_sample(format!(
            "non-finite coordinate ({}, {})",
            coord.lat, coord.lon
        )));
    }

    if !(-FRAC_PI_2..=FRAC_PI_2).contains(&coord.lat) {
        return Err(RadarError::invalid_sample(format!(
            "latitude {} outside [-pi/2, pi/2]",
            coord.lat
        )));
    }

    // Sensors report -180 degrees as well as 180, so the closed range is accepted
    if !(-PI..=PI).contains(&coord.lon) {
        return Err(RadarError::invalid_sample(format!(
            "longitude {} outside [-pi, pi]",
            coord.lon
        )));
    }

    Ok(())
}

/// Check that a sample can be folded into the location history
pub fn validate_sample(sample: &PositionSample) -> RadarResult<()> {
    validate_coordinate(&sample.coord)?;

    if !sample.accuracy.is_finite() || sample.accuracy < 0.0 {
        return Err(RadarError::invalid_sample(format!(
            "accuracy {} must be a non-negative number of meters",
            sample.accuracy
        )));
    }

    if !sample.timestamp.is_finite() {
        return Err(RadarError::invalid_sample("timestamp is not finite"));
    }

    Ok(())
}
