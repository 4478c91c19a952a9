use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while acquiring a stream or enumerating devices.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StreamError {
    #[error("capture API is not supported in this environment")]
    Unsupported,

    #[error("permission denied")]
    PermissionDenied,

    #[error("device not found")]
    DeviceNotFound,

    #[error("device not readable")]
    DeviceNotReadable,

    #[error("constraints unsatisfiable: {constraint}")]
    ConstraintsUnsatisfiable { constraint: String },

    #[error("acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("invalid constraints: {0}")]
    InvalidConstraints(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification used to decide how a failure propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    UnsupportedEnvironment,
    Acquisition,
    Enumeration,
    Configuration,
}

impl StreamError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unsupported => ErrorCategory::UnsupportedEnvironment,
            Self::PermissionDenied
            | Self::DeviceNotFound
            | Self::DeviceNotReadable
            | Self::ConstraintsUnsatisfiable { .. }
            | Self::AcquisitionFailed(_) => ErrorCategory::Acquisition,
            Self::EnumerationFailed(_) => ErrorCategory::Enumeration,
            Self::InvalidConstraints(_) | Self::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Human-readable explanation for the well-known host failure categories.
    ///
    /// Returns `None` for failures the host did not classify.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Unsupported => {
                Some("Media capture is not available in this environment.")
            }
            Self::PermissionDenied => Some(
                "Access to the camera or microphone was denied. Allow access and try again.",
            ),
            Self::DeviceNotFound => {
                Some("No camera or microphone matching the request could be found.")
            }
            Self::DeviceNotReadable => Some(
                "The camera or microphone could not be read. It may be in use by another application.",
            ),
            Self::ConstraintsUnsatisfiable { .. } => {
                Some("No available device satisfies the requested settings.")
            }
            _ => None,
        }
    }
}

/// The most recent failure, kept in controller state (last write wins).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub error: StreamError,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(error: StreamError) -> Self {
        let message = error
            .user_message()
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string());
        Self {
            error,
            message,
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_acquisition_failures_have_messages() {
        for err in [
            StreamError::PermissionDenied,
            StreamError::DeviceNotFound,
            StreamError::DeviceNotReadable,
            StreamError::ConstraintsUnsatisfiable {
                constraint: "frameRate".into(),
            },
        ] {
            assert_eq!(err.category(), ErrorCategory::Acquisition);
            assert!(err.user_message().is_some(), "{err} should map to a message");
        }
    }

    #[test]
    fn record_falls_back_to_display_text() {
        let record = ErrorRecord::new(StreamError::EnumerationFailed("host exploded".into()));
        assert_eq!(record.message, "enumeration failed: host exploded");
        assert_eq!(record.error.category(), ErrorCategory::Enumeration);
    }

    #[test]
    fn record_prefers_user_message() {
        let record = ErrorRecord::new(StreamError::PermissionDenied);
        assert!(record.message.starts_with("Access to the camera"));
    }
}
