/*!
 * Error types for the gemsub application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// HTTP statuses the retry controller treats as transient
pub const RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
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
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from the API
        message: String,
        /// Value of the Retry-After header, when the server sent one
        retry_after_secs: Option<u64>,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// HTTP-equivalent status for this failure, if it has one.
    ///
    /// Timeouts are reported as 504 and rate limiting as 429 so that the
    /// retry controller can classify every failure by status alone.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } => Some(*status_code),
            Self::RateLimitExceeded { .. } => Some(429),
            Self::Timeout(_) => Some(504),
            Self::AuthenticationError(_) => Some(401),
            Self::RequestFailed(_) | Self::ParseError(_) | Self::ConnectionError(_) => None,
        }
    }

    /// Whether the retry controller may try the request again
    pub fn is_retryable(&self) -> bool {
        self.status_code()
            .is_some_and(|status| RETRYABLE_STATUS_CODES.contains(&status))
    }

    /// Whether the failure came back as an HTTP response (as opposed to a transport or decode error)
    pub fn is_http_response(&self) -> bool {
        matches!(
            self,
            Self::ApiError { .. } | Self::RateLimitExceeded { .. } | Self::AuthenticationError(_)
        )
    }

    /// Build the matching variant for a non-success HTTP status
    pub fn from_status(status_code: u16, message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        let message = message.into();
        match status_code {
            429 => Self::RateLimitExceeded { message, retry_after_secs },
            401 | 403 => Self::AuthenticationError(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The input had zero bytes
    #[error("Cannot parse an empty file: {name}")]
    EmptyInput {
        /// Display name of the input
        name: String,
    },

    /// The input could not be read or the output could not be written
    #[error("I/O failure on {path}: {message}")]
    IoFailure {
        /// Path that failed
        path: String,
        /// Underlying error message
        message: String,
    },

    /// The input was a directory and was not parsed
    #[error("Skipping directory: {path}")]
    Skipped {
        /// Path of the directory
        path: String,
    },

    /// An entry failed SRT validation before emission
    #[error("Invalid subtitle entry at sequence: {sequence}")]
    InvalidEntry {
        /// Sequence number of the offending entry
        sequence: u32,
    },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// No entries were supplied
    #[error("No subtitle entries to translate")]
    InputMissing,

    /// The cancellation token fired
    #[error("Translation cancelled")]
    Cancelled,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
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
