//! Error classification for the compass radar

use thiserror::Error;

/// Errors raised by the radar core.
///
/// Sensor failures are not represented here: they travel as data
/// (see [`crate::sensors::SourceError`]) so the rendering layer can show them.
#[derive(Error, Debug)]
pub enum RadarError {
    /// A value that is not a usable position fix reached the compactor
    #[error("Invalid position sample: {reason}")]
    InvalidSample { reason: String },

    /// Persisted record could not be read or written
    #[error("Storage error for '{key}': {message}")]
    Storage { key: String, message: String },

    /// Persisted record could not be encoded or decoded
    #[error("Serialization error for '{key}': {message}")]
    Serialization { key: String, message: String },

    /// Invalid configuration value
    #[error("Configuration error: invalid {parameter} = {value} ({reason})")]
    Config {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RadarError {
    pub fn invalid_sample(reason: impl Into<String>) -> Self {
        Self::InvalidSample {
            reason: reason.into(),
        }
    }

    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn serialization(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn config(
        parameter: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Programming errors must be fixed at the call site, not retried
    pub fn is_programming_error(&self) -> bool {
        matches!(self, RadarError::InvalidSample { .. })
    }
}

/// Result type for radar operations
pub type RadarResult<T> = Result<T, RadarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RadarError::invalid_sample("accuracy is negative");
        assert_eq!(err.to_string(), "Invalid position sample: accuracy is negative");
        assert!(err.is_programming_error());

        let err = RadarError::config("merge_window_ms", -1.0, "must be positive");
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid merge_window_ms = -1 (must be positive)"
        );
        assert!(!err.is_programming_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RadarError = io.into();
        assert!(matches!(err, RadarError::Io(_)));
    }
}
