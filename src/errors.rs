/*!
 * Error types for the ocrbatch application.
 *
 * Per-image failures (`ExtractionError`, `TranslationError`) are recorded on
 * the image's outcome and never abort a batch. `AppError` carries the fatal
 * run-level failures.
 */

use thiserror::Error;

/// Errors that can occur when talking to an external collaborator
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error reported by the service for one request inside a successful response
    #[error("{0}")]
    ServiceError(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether a later attempt of the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Map a reqwest transport failure onto the provider taxonomy
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }

    /// Map a non-success HTTP status and its body onto the provider taxonomy
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Per-image text extraction failure
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The image could not be read from storage
    #[error("Failed to read image {path}: {message}")]
    Read {
        /// Path of the unreadable image
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// The OCR service rejected or failed the request
    #[error("OCR service error: {0}")]
    Provider(#[from] ProviderError),
}

impl ExtractionError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_transient())
    }
}

/// Per-image translation failure
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl TranslationError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_transient(),
        }
    }
}

/// Fatal run-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// The input directory could not be enumerated
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Missing or unusable access to an external collaborator
    #[error("Credential error: {0}")]
    Credential(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The rendered report could not be persisted
    #[error("Report write error: {0}")]
    ReportWrite(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Exit status the binary reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Credential(_) => 2,
            _ => 1,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
