//! Error types for the Eator client

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Eator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

impl Error {
    /// Classify the error for the UI, if it came from the pin/auth layer.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Process exit status: one per [`ErrorKind`], 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            Some(ErrorKind::Auth) => 3,
            Some(ErrorKind::Validation) => 4,
            Some(ErrorKind::NotFound) => 5,
            Some(ErrorKind::Network) => 6,
            None => 1,
        }
    }
}

/// The four failure categories surfaced to forms and actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, invalid or expired credential; insufficient permission
    Auth,
    /// Field shape, length or expiry ceiling violation
    Validation,
    /// Mutation target absent
    NotFound,
    /// Transport failure or server-side error
    Network,
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Session token is invalid or expired. Run `eator login` again.")]
    InvalidToken,
}

impl ApiError {
    /// Map this error onto the user-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized(_)
            | ApiError::Forbidden(_)
            | ApiError::Conflict(_)
            | ApiError::InvalidToken => ErrorKind::Auth,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::RateLimit(_)
            | ApiError::ServerError(_)
            | ApiError::Network(_)
            | ApiError::InvalidResponse(_) => ErrorKind::Network,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `eator login` to create one.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
