//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`StatusCacheError`] which covers every failure mode of the
//! status cache, the path resolver and the backend clients. It uses `thiserror` for
//! ergonomic error definitions and includes constructors for the common cases.
//!
//! # Public API
//! - [`StatusCacheError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, StatusCacheError>`
//!
//! # Error Categories
//! - **Backend**: Configuration and connection failures raised by a backend client
//! - **Usage**: Invalid state transitions such as a second concurrent initialization
//! - **Path resolution**: Indirection lookups (always degraded inside the resolver)
//! - **Settings**: Configuration directory, I/O and JSON failures

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for the status cache
#[derive(Error, Debug)]
pub enum StatusCacheError {
    // Backend errors
    #[error("Backend configuration error: {message}")]
    Configuration { message: String },

    #[error("Backend connection error: {message}")]
    Connection { message: String },

    #[error("Git backend error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not in a version-controlled workspace")]
    NotInWorkspace,

    // Usage errors
    #[error("A refresh is already in progress; initialize cannot run concurrently")]
    RefreshInProgress,

    #[error("Status refresh failed: {message}")]
    RefreshFailed { message: String },

    #[error("Refresh worker panicked: {message}")]
    WorkerPanicked { message: String },

    // Path resolution errors
    #[error("Could not resolve path indirection for '{path}': {message}")]
    Indirection { path: String, message: String },

    // Settings errors
    #[error("Invalid drive mapping '{value}'. Use format like: X:=C:\\work\\project")]
    InvalidDriveMapping { value: String },

    #[error("Could not find configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to read settings file '{path}': {source}")]
    SettingsReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using StatusCacheError
pub type Result<T> = std::result::Result<T, StatusCacheError>;

impl StatusCacheError {
    /// Create a backend configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a backend connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an indirection lookup error
    pub fn indirection(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Indirection {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a refresh failure error
    pub fn refresh_failed(message: impl Into<String>) -> Self {
        Self::RefreshFailed {
            message: message.into(),
        }
    }

    /// Create an invalid drive mapping error
    pub fn invalid_drive_mapping(value: impl Into<String>) -> Self {
        Self::InvalidDriveMapping {
            value: value.into(),
        }
    }

    /// Create a worker panic error from a panic payload
    pub fn worker_panicked(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::WorkerPanicked { message }
    }

    /// Create a settings read error
    pub fn settings_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SettingsReadFailed {
            path: path.into(),
            source,
        }
    }

    /// True for failures reported by a backend (configuration or transport)
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::Connection { .. } | Self::Git(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StatusCacheError::RefreshInProgress;
        assert_eq!(
            err.to_string(),
            "A refresh is already in progress; initialize cannot run concurrently"
        );
    }

    #[test]
    fn test_not_in_workspace_display() {
        let err = StatusCacheError::NotInWorkspace;
        assert_eq!(err.to_string(), "Not in a version-controlled workspace");
        assert!(!err.is_backend_failure());
    }

    #[test]
    fn test_connection_error() {
        let err = StatusCacheError::connection("server unreachable");
        assert_eq!(
            err.to_string(),
            "Backend connection error: server unreachable"
        );
        assert!(err.is_backend_failure());
    }

    #[test]
    fn test_configuration_error() {
        let err = StatusCacheError::configuration("bad workspace");
        assert!(err.to_string().contains("bad workspace"));
        assert!(err.is_backend_failure());
    }

    #[test]
    fn test_indirection_error() {
        let err = StatusCacheError::indirection("X:\\src", "no such drive");
        assert!(err.to_string().contains("X:\\src"));
        assert!(err.to_string().contains("no such drive"));
        assert!(!err.is_backend_failure());
    }

    #[test]
    fn test_worker_panicked_from_payload() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let err = StatusCacheError::worker_panicked(payload.as_ref());
        assert_eq!(err.to_string(), "Refresh worker panicked: boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        let err = StatusCacheError::worker_panicked(payload.as_ref());
        assert!(err.to_string().contains("bang"));
    }

    #[test]
    fn test_invalid_drive_mapping() {
        let err = StatusCacheError::invalid_drive_mapping("X");
        assert!(err.to_string().contains("'X'"));
        assert!(err.to_string().contains(r"X:=C:\work\project"));
    }

    #[test]
    fn test_settings_read_failed() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = StatusCacheError::settings_read_failed("/test/settings.json", io_err);
        assert!(err.to_string().contains("/test/settings.json"));
        assert!(err.to_string().contains("access denied"));
    }
}
