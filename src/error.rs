//! Error types for the donation guard.

use thiserror::Error;

use crate::donation::SubmissionDenied;
use crate::store::StoreError;

/// Main error type for donation guard operations.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller broke a precondition (empty identifier, zero limit, bad phone number...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// One of the submission rate limits denied the request
    #[error(transparent)]
    RateLimited(#[from] SubmissionDenied),

    /// Donation persistence failed
    #[error("Repository error: {0}")]
    Repository(#[from] StoreError),

    /// gRPC server errors
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::transport::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuardError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GuardError::InvalidInput(msg.into())
    }
}

/// Result type alias for donation guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;
