//! Configuration and logging utilities

pub mod config;
pub mod telemetry;

pub use config::{ConfigurationManager, RadarConfig, ValidationResult};
pub use telemetry::{env_filter, init_tracing};
