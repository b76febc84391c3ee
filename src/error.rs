use http::StatusCode;
use thiserror::Error;

use crate::models::response::ApiMessage;

/// The client's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// An HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An authentication error.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An authorization error.
    #[error("Authorization failed")]
    Unauthorized,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A token decoding error.
    #[error("Token error: {0}")]
    Token(String),

    /// A durable storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An error reported by the backend API.
    #[error("API error ({status}): {message}")]
    Api {
        /// The HTTP status code returned by the backend.
        status: u16,
        /// The message carried in the backend's status envelope.
        message: String,
    },

    /// An internal client error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Converts a non-success response into the matching error variant.
    ///
    /// Reads the backend's status envelope body when one is present; falls back
    /// to classifying by status code alone.
    ///
    /// # Arguments
    ///
    /// * `response` - The non-success response to convert.
    ///
    /// # Returns
    ///
    /// The `AppError` describing the failure.
    pub(crate) async fn from_response(response: reqwest::Response) -> AppError {
        let status = response.status();
        let message = match response.json::<ApiMessage>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::warn!("Authentication failed: {}", message);
                AppError::Authentication(message)
            }
            StatusCode::FORBIDDEN => {
                tracing::warn!("Authorization failed");
                AppError::Unauthorized
            }
            StatusCode::NOT_FOUND => {
                tracing::debug!("Resource not found");
                AppError::NotFound
            }
            StatusCode::BAD_REQUEST => {
                tracing::debug!("Validation error: {}", message);
                AppError::Validation(message)
            }
            _ => {
                tracing::error!("API error ({}): {}", status.as_u16(), message);
                AppError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}
