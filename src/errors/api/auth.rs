use poem_openapi::{ApiResponse, payload::Json};

use super::{ErrorResponse, describe};
use crate::errors::{ErrorKind, InternalError};

/// Errors for registration, login, session and OTP endpoints
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Input failed validation, wrong OTP, or weak password
    #[oai(status = 400)]
    ValidationFailed(Json<ErrorResponse>),

    /// Missing, invalid or expired credentials
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Authenticated but not allowed
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Institution, account or pending verification not found
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Email or institution code already taken
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    /// OTP past its expiry
    #[oai(status = 410)]
    OtpExpired(Json<ErrorResponse>),

    /// OTP requested again too soon
    #[oai(status = 429)]
    RateLimited(Json<ErrorResponse>),

    /// Email provider failure
    #[oai(status = 502)]
    UpstreamFailure(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AuthError {
    /// Convert InternalError to AuthError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    pub fn from_internal_error(err: InternalError) -> Self {
        let kind = err.kind();
        let body = Json(describe(&err, kind.status_code()));
        match kind {
            ErrorKind::Validation | ErrorKind::Mismatch | ErrorKind::RemarksRequired => {
                AuthError::ValidationFailed(body)
            }
            ErrorKind::Unauthorized => AuthError::Unauthorized(body),
            ErrorKind::Forbidden => AuthError::Forbidden(body),
            ErrorKind::NotFound => AuthError::NotFound(body),
            ErrorKind::Conflict => AuthError::Conflict(body),
            ErrorKind::Expired => AuthError::OtpExpired(body),
            ErrorKind::RateLimited => AuthError::RateLimited(body),
            ErrorKind::Upstream => AuthError::UpstreamFailure(body),
            ErrorKind::PartialFailure | ErrorKind::Internal => AuthError::InternalError(body),
        }
    }

    pub fn body(&self) -> &ErrorResponse {
        match self {
            AuthError::ValidationFailed(Json(body))
            | AuthError::Unauthorized(Json(body))
            | AuthError::Forbidden(Json(body))
            | AuthError::NotFound(Json(body))
            | AuthError::Conflict(Json(body))
            | AuthError::OtpExpired(Json(body))
            | AuthError::RateLimited(Json(body))
            | AuthError::UpstreamFailure(Json(body))
            | AuthError::InternalError(Json(body)) => body,
        }
    }
}

impl From<InternalError> for AuthError {
    fn from(err: InternalError) -> Self {
        AuthError::from_internal_error(err)
    }
}
