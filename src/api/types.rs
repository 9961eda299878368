//! Snapshot types handed to the rendering layer

use crate::sensors::SourceError;
use nalgebra::Vector2;

/// What the location sensor currently says
#[derive(Debug, Clone, PartialEq)]
pub enum RadarStatus {
    /// No fix has arrived yet
    Waiting,
    /// A fix is available
    Located { accuracy: f64 },
    /// The sensor reported an error
    Failed(SourceError),
}

impl RadarStatus {
    /// Message to show instead of the radar, if any
    pub fn message(&self) -> Option<String> {
        match self {
            RadarStatus::Waiting => Some("Waiting for location".to_string()),
            RadarStatus::Located { .. } => None,
            RadarStatus::Failed(e) => Some(e.message.clone()),
        }
    }

    pub fn is_located(&self) -> bool {
        matches!(self, RadarStatus::Located { .. })
    }
}

/// A bookmark placed on the radar
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    /// Offset from the radar centre, x right and y down
    pub offset: Vector2<f64>,
    pub hue: f64,
    pub label: Option<String>,
    /// Great-circle distance from the current fix (meters)
    pub distance: f64,
    /// Initial bearing from the current fix (radians, clockwise from north)
    pub bearing: f64,
}

/// Everything needed to draw one radar frame
#[derive(Debug, Clone, PartialEq)]
pub struct RadarFrame {
    /// Edge length of the square display
    pub size: f64,
    /// Compass heading in radians, `None` without an absolute orientation
    pub heading: Option<f64>,
    pub status: RadarStatus,
    /// Display radius of the current fix's accuracy circle
    pub accuracy_radius: Option<f64>,
    /// Bookmarks in insertion order, empty without a fix
    pub blobs: Vec<Blob>,
    /// History entries oldest first, empty without a fix
    pub trail: Vec<Vector2<f64>>,
}

impl RadarFrame {
    pub fn message(&self) -> Option<String> {
        self.status.message()
    }
}
