//! Gateway error handling
//!
//! Typed errors for talking to the backend, with descriptive messages and
//! recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching, saving or uploading
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The backend has no document yet
    #[error("No content found at '{location}'")]
    NotFound { location: String },

    /// The backend rejected the credentials
    #[error("Not authorized to write to '{url}'. Check the configured auth token.")]
    Unauthorized { url: String },

    /// An upload endpoint does not exist on this backend
    #[error("Upload endpoint unavailable: '{url}'")]
    EndpointUnavailable { url: String },

    /// Any other non-success HTTP status
    #[error("Backend returned HTTP {status} for '{url}'")]
    Status { status: u16, url: String },

    /// Network level failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend could not be reached (non-HTTP gateways)
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stored or returned document is not valid JSON
    #[error("Invalid document format: {details}")]
    InvalidFormat { details: String },

    /// A pending local asset could not be read for upload
    #[error("Cannot read asset '{reference}': {reason}")]
    UnreadableAsset { reference: String, reason: String },

    /// JSON encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => GatewayError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => GatewayError::NotFound {
                location: path.display().to_string(),
            },
            _ if is_disk_full_error(&error) => GatewayError::DiskFull {
                path,
                source: error,
            },
            _ => GatewayError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Classify an HTTP status for `url`
    pub fn from_status(status: u16, url: &str) -> Self {
        match status {
            401 | 403 => GatewayError::Unauthorized {
                url: url.to_string(),
            },
            404 => GatewayError::NotFound {
                location: url.to_string(),
            },
            _ => GatewayError::Status {
                status,
                url: url.to_string(),
            },
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            GatewayError::Unauthorized { .. } => {
                Some("Log in again and update auth_token (vellum config set auth_token <token>).")
            }
            GatewayError::Transport(_) | GatewayError::Unreachable(_) => {
                Some("Check your network connection and backend_url, then try again.")
            }
            GatewayError::DiskFull { .. } => Some("Free up disk space and try again."),
            GatewayError::PermissionDenied { .. } => {
                Some("Check file and directory permissions of local_dir.")
            }
            GatewayError::NotFound { .. } | GatewayError::EndpointUnavailable { .. } => {
                Some("Check that backend_url points at the dashboard backend.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = GatewayError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, GatewayError::PermissionDenied { .. }));
        assert!(err.recovery_suggestion().unwrap().contains("local_dir"));
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = GatewayError::from_io(io_err, PathBuf::from("/missing/file"));

        assert!(matches!(err, GatewayError::NotFound { .. }));
        assert!(err.recovery_suggestion().unwrap().contains("backend_url"));
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = GatewayError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, GatewayError::DiskFull { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_status_classification() {
        let url = "https://example.com/api/dashboard-content";
        assert!(matches!(
            GatewayError::from_status(401, url),
            GatewayError::Unauthorized { .. }
        ));
        assert!(matches!(
            GatewayError::from_status(403, url),
            GatewayError::Unauthorized { .. }
        ));
        assert!(matches!(
            GatewayError::from_status(404, url),
            GatewayError::NotFound { .. }
        ));

        let err = GatewayError::from_status(502, url);
        assert!(err.to_string().contains("502"));
        assert!(err.recovery_suggestion().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = GatewayError::Unauthorized {
            url: "https://example.com/api".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("Not authorized"));
        assert!(msg.contains("auth token"));
        assert!(err.recovery_suggestion().unwrap().contains("auth_token"));
    }
}
