//! Outbound interface for the rendering layer
//!
//! [`RadarModel`] wires the sensors, the bookmark store and the location
//! history together and exposes read-only reactive values plus the few
//! mutating operations a user can trigger.

pub mod radar;
pub mod types;

pub use radar::RadarModel;
pub use types::{Blob, RadarFrame, RadarStatus};
