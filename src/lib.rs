//! Compass Radar
//!
//! A live compass/radar view model driven by device orientation and
//! geolocation sensors. Bookmarked places are shown as blobs positioned by
//! bearing and log-scaled distance, and recent fixes form a compacted trail.
//!
//! Sensors are push based while the rendering layer pulls; the [`reactive`]
//! module bridges the two and keeps a sensor subscribed only while its value
//! is being read.

pub mod core;
pub mod algorithms;
pub mod reactive;
pub mod sensors;
pub mod storage;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{Bookmark, Coordinate, HistoryEntry, PositionSample, Timestamp, EARTH_RADIUS_M};
pub use algorithms::{bearing, distance, project, radius};
pub use reactive::{AsyncComputed, Derived, ListeningSignal, LocalPoolScheduler, Scheduler, Source, TokioScheduler};
pub use sensors::{EventSource, GeoFix, GeoUpdate, LocationReading, ManualSource, OrientationEvent, SourceError};
pub use storage::{BookmarkStore, FileStore, KeyValueStore, MemoryStore};
pub use processing::{HistoryChange, HistoryCompactor};
pub use validation::{RadarError, RadarResult};
pub use utils::{init_tracing, ConfigurationManager, RadarConfig};
pub use api::{Blob, RadarFrame, RadarModel, RadarStatus};
