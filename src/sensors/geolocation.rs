//! Geolocation readings and the failures a position watch can report

use crate::core::{Coordinate, PositionSample, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A position fix as reported by the device, in degrees and meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius (meters)
    pub accuracy: f64,
    pub timestamp: Timestamp,
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, timestamp: Timestamp) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            timestamp,
        }
    }

    /// Convert into a radian based sample
    pub fn to_sample(&self) -> PositionSample {
        PositionSample::new(
            Coordinate::from_degrees(self.latitude, self.longitude),
            self.accuracy,
            self.timestamp,
        )
    }
}

/// Why a position watch could not deliver a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
}

/// Terminal condition reported by a sensor, delivered as data
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct SourceError {
    pub kind: SourceErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_denied() -> Self {
        Self::new(
            SourceErrorKind::PermissionDenied,
            "Location permission was denied",
        )
    }

    pub fn unavailable() -> Self {
        Self::new(
            SourceErrorKind::PositionUnavailable,
            "Position is currently unavailable",
        )
    }
}

/// What a position watch pushes: a fix in degrees, or an error
pub type GeoUpdate = Result<GeoFix, SourceError>;

/// A fix converted for the core, or the error the watch reported
pub type LocationReading = Result<PositionSample, SourceError>;

/// Convert a raw watch update into a reading
pub fn to_reading(update: &GeoUpdate) -> LocationReading {
    match update {
        Ok(fix) => Ok(fix.to_sample()),
        Err(e) => Err(e.clone()),
    }
}
