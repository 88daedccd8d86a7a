//! Common error types for EduPath

use thiserror::Error;

/// Common result type for EduPath operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the store, the accumulator and the gateway
#[derive(Error, Debug)]
pub enum Error {
    /// Requested user, topic, rating or reference row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad, expired or malformed identity or session token
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Required precomputed data is missing (e.g. absent weight vector)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid user input, or the prediction endpoint rejected the request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External endpoint failed or was unreachable
    #[error("Service error: {0}")]
    Service(String),

    /// External call exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short machine-oriented code for HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "NOT_FOUND",
            Error::InvalidCredential(_) => "INVALID_CREDENTIAL",
            Error::InvalidState(_) => "INVALID_STATE",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Service(_) => "SERVICE_ERROR",
            Error::Timeout(_) => "TIMEOUT",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
