//! Device orientation readings

use crate::algorithms::geodesic::normalize_angle;
use serde::{Deserialize, Serialize};

/// One orientation event as delivered by the device
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationEvent {
    /// Rotation around the vertical axis in degrees, counter-clockwise
    pub alpha: Option<f64>,
    /// Whether `alpha` is referenced to magnetic north rather than an arbitrary frame
    pub absolute: bool,
}

impl OrientationEvent {
    pub fn absolute(alpha: f64) -> Self {
        Self {
            alpha: Some(alpha),
            absolute: true,
        }
    }

    pub fn relative(alpha: f64) -> Self {
        Self {
            alpha: Some(alpha),
            absolute: false,
        }
    }
}

/// Compass heading in radians, clockwise from north.
///
/// Relative readings carry no north reference and yield `None`.
pub fn compass_heading(event: &OrientationEvent) -> Option<f64> {
    if !event.absolute {
        return None;
    }
    let alpha = event.alpha.filter(|a| a.is_finite())?;
    Some(normalize_angle((360.0 - alpha).rem_euclid(360.0).to_radians()))
}
