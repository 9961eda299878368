//! Physical constants and system parameters

/// Mean Earth radius used by the haversine formula (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Maximum number of entries retained in the location history
pub const MAX_HISTORY_LENGTH: usize = 100;

/// Samples closer together in time than this may be merged (milliseconds)
pub const MERGE_WINDOW_MS: f64 = 30_000.0;

/// Default edge length of the radar display (pixels)
pub const DEFAULT_DISPLAY_SIZE: f64 = 400.0;
