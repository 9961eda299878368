//! Sample validation and error types

pub mod data;
pub mod error;

pub use data::{validate_coordinate, validate_sample};
pub use error::{RadarError, RadarResult};
