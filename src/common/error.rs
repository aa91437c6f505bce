//! Error types for the genesis CLI
//!
//! Every stage of the submission pipeline has its own variant so the message
//! printed on exit says which step failed.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the genesis CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Definition Errors ===
    #[error("Invalid test definition: {0}")]
    Definition(String),

    #[error("Failed to convert docker compose file: {0}")]
    Conversion(String),

    #[error("Invalid DNS name '{0}': use 1-63 characters of a-z, 0-9 and '-', not starting or ending with '-'")]
    InvalidDnsName(String),

    // === Remote API Errors ===
    #[error("Failed to upload '{file}': {message}")]
    Upload { file: String, message: String },

    #[error("Failed to submit test run: {0}")]
    Submission(String),

    #[error("{test}: {message}")]
    Tracking { test: String, message: String },

    #[error("{0} test run(s) did not complete successfully")]
    TrackingFailed(usize),

    #[error("Interrupted. Submitted runs keep executing remotely")]
    Interrupted,

    // === Configuration Errors ===
    #[error("No organization specified. Pass it once with 'genesis run <file> <org>' and it will be remembered")]
    NoOrg,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an upload error for the given file
    pub fn upload(file: &str, message: impl std::fmt::Display) -> Self {
        Self::Upload {
            file: file.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a tracking error scoped to one test
    pub fn tracking(test: &str, message: impl std::fmt::Display) -> Self {
        Self::Tracking {
            test: test.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether this error belongs to a single tracked run rather than the
    /// whole command
    pub fn is_tracking(&self) -> bool {
        matches!(self, Error::Tracking { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_error_names_the_test() {
        let err = Error::tracking("load-test", "status endpoint returned 502");
        assert!(err.is_tracking());
        assert_eq!(err.to_string(), "load-test: status endpoint returned 502");
    }

    #[test]
    fn test_upload_error_names_the_file() {
        let err = Error::upload("genesis.yaml", "401 Unauthorized");
        assert!(!err.is_tracking());
        assert!(err.to_string().contains("genesis.yaml"));
        assert!(err.to_string().contains("401"));
    }
}
