pub mod admin;
pub mod auth;


pub use admin::AdminError;
pub use auth::AuthError;

use poem_openapi::Object;

use crate::errors::{ErrorKind, InternalError};

/// Standardized error body for every endpoint
#[derive(Object, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status_code,
        }
    }
}

/// Log an internal error and build the client-facing body
///
/// Infrastructure details are logged but replaced with a generic message.
pub(crate) fn describe(err: &InternalError, status_code: u16) -> ErrorResponse {
    let kind = err.kind();
    let message = match kind {
        ErrorKind::Internal => {
            tracing::error!("Internal error: {}", err);
            "An internal error occurred".to_string()
        }
        ErrorKind::PartialFailure => {
            tracing::error!("Partial failure: {:?}", err);
            "Registration could not be completed. Please try again.".to_string()
        }
        ErrorKind::Upstream => {
            tracing::error!("Upstream failure: {}", err);
            "Failed to send email. Please try again later.".to_string()
        }
        _ => {
            tracing::debug!("Request rejected ({:?}): {}", kind, err);
            err.to_string()
        }
    };

    ErrorResponse::new(err.code(), message, status_code)
}
