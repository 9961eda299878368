//! Core data types for the compass radar

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Milliseconds since the Unix epoch
pub type Timestamp = f64;

/// Geographic position in radians.
///
/// Serialized as a two element array `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Convert sensor degrees into a radian coordinate
    pub fn from_degrees(lat_deg: f64, lon_deg: f64) -> Self {
        Self {
            lat: lat_deg / 180.0 * PI,
            lon: lon_deg / 180.0 * PI,
        }
    }

    /// Latitude and longitude back in degrees
    pub fn to_degrees(&self) -> (f64, f64) {
        (self.lat / PI * 180.0, self.lon / PI * 180.0)
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.lat, self.lon)
    }

    pub fn from_vector(v: &Vector2<f64>) -> Self {
        Self { lat: v.x, lon: v.y }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(pair: [f64; 2]) -> Self {
        Coordinate::new(pair[0], pair[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coord: Coordinate) -> Self {
        [coord.lat, coord.lon]
    }
}

/// A single geolocation fix, converted to radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub coord: Coordinate,
    /// Horizontal accuracy radius (meters)
    pub accuracy: f64,
    pub timestamp: Timestamp,
}

impl PositionSample {
    pub fn new(coord: Coordinate, accuracy: f64, timestamp: Timestamp) -> Self {
        Self {
            coord,
            accuracy,
            timestamp,
        }
    }
}

/// One point of the compacted location history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub coord: Coordinate,
    pub accuracy: f64,
    pub timestamp: Timestamp,
}

impl From<PositionSample> for HistoryEntry {
    fn from(sample: PositionSample) -> Self {
        Self {
            coord: sample.coord,
            accuracy: sample.accuracy,
            timestamp: sample.timestamp,
        }
    }
}

impl From<&HistoryEntry> for PositionSample {
    fn from(entry: &HistoryEntry) -> Self {
        PositionSample::new(entry.coord, entry.accuracy, entry.timestamp)
    }
}

/// A user marked location shown as a blob on the radar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub coord: Coordinate,
    /// Presentation hue in degrees, `[0, 360)`
    pub hue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Bookmark {
    pub fn new(coord: Coordinate, hue: f64) -> Self {
        Self {
            coord,
            hue,
            label: None,
            created_at: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }
}
